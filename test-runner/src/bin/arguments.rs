use utest::{assert_str, assert_true, utest, utest_log};

#[utest]
mod suitey {
    use super::*;

    #[utest]
    fn test1() {
        assert_true(true);
    }

    #[utest]
    fn test2() {
        assert_str("suitey", "suitey");
    }

    #[utest]
    fn test3() {
        utest_log!("third of {}", 3);
    }
}

#[utest(another)]
fn foo() {
    assert_true(!false);
}

#[utest::main]
fn main() {}
