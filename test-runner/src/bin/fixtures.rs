//! Each case traces its data block's life cycle through the log channel.

use utest::{assert_equal, utest, utest_log, Fixture};

#[derive(Default)]
struct Traced {
    value: i32,
}

impl Fixture for Traced {
    fn setup(&mut self) {
        self.value = 7;
        utest_log!("setup");
    }

    fn teardown(&mut self) {
        utest_log!("teardown {}", self.value);
    }
}

#[derive(Default)]
struct BrokenSetup;

impl Fixture for BrokenSetup {
    fn setup(&mut self) {
        utest_log!("setup");
        panic!("setup failed");
    }

    fn teardown(&mut self) {
        utest_log!("teardown");
    }
}

#[utest]
mod lifecycle {
    use super::*;

    #[utest]
    fn passes(data: &mut Traced) {
        utest_log!("body {}", data.value);
        data.value += 1;
    }

    #[utest]
    fn assertion_fails(data: &mut Traced) {
        assert_equal(0, data.value);
        utest_log!("unreachable");
    }

    #[utest]
    fn panics(data: &mut Traced) {
        data.value = -1;
        panic!("not an assertion");
    }

    #[utest]
    fn setup_panics(_data: &mut BrokenSetup) {
        utest_log!("body");
    }

    #[utest]
    fn fresh_block(data: &mut Traced) {
        assert_equal(7, data.value);
    }

    #[utest(skip)]
    fn skipped(_data: &mut Traced) {
        utest_log!("never");
    }
}

#[utest::main]
fn main() {}
