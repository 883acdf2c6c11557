//! One case per assertion kind: 11 pass, 22 fail, 2 are skipped.

use utest::{utest, utest_err, utest_log, Fixture};

#[utest]
mod suite1 {
    use utest::{assert_equal, utest_log};

    #[utest]
    fn test1() {
        utest_log!("only logs");
    }

    #[utest]
    fn test2() {
        assert_equal(1, 1);
    }
}

#[utest(suite2)]
fn test1() {
    utest::assert_str("foo", "foo");
}

#[utest]
mod suite3 {
    use utest::{assert_fail, assert_true};

    #[utest(skip)]
    fn skipped_failure() {
        assert_fail();
    }

    #[utest(skip)]
    fn skipped_success() {
        assert_true(true);
    }
}

#[derive(Default)]
struct Memtest {
    buffer: Vec<u8>,
}

impl Fixture for Memtest {
    fn setup(&mut self) {
        self.buffer = vec![0; 1024];
        utest_log!("setup: {} bytes", self.buffer.len());
    }

    fn teardown(&mut self) {
        self.buffer.clear();
        utest_log!("teardown");
    }
}

#[utest]
mod memtest {
    use super::Memtest;
    use utest::{assert_data, assert_equal_u, assert_not_null};

    #[utest]
    fn test1(data: &mut Memtest) {
        assert_not_null(data.buffer.first());
    }

    #[utest]
    fn test2(data: &mut Memtest) {
        data.buffer[..4].copy_from_slice(b"abcd");
        assert_data(b"abcd", &data.buffer[..4]);
    }

    #[utest]
    fn test3(data: &mut Memtest) {
        assert_equal_u(512usize, data.buffer.len());
    }
}

#[utest]
mod pass {
    use utest::{
        assert_dbl_near, assert_interval, assert_le_u, assert_null, assert_strstr, assert_true,
    };

    #[utest]
    fn substring() {
        assert_strstr("hello world", "o w");
    }

    #[utest]
    fn interval() {
        assert_interval(-10, 10, 0);
    }

    #[utest]
    fn near() {
        assert_dbl_near(1.0, 1.0 + 1e-14);
    }

    #[utest]
    fn null() {
        assert_null(None::<&i32>);
    }

    #[utest]
    fn truth() {
        assert_true(2 > 1);
    }

    #[utest]
    fn unsigned() {
        assert_le_u(3u8, 3u64);
    }
}

#[utest]
mod fail {
    use super::*;
    use utest::*;

    #[utest]
    fn str_equal() {
        assert_str("foo", "bar");
    }

    #[utest]
    fn str_not_equal() {
        assert_not_str("foo", "foo");
    }

    #[utest]
    fn substring() {
        assert_strstr("foo", "bar");
    }

    #[utest]
    fn no_substring() {
        assert_not_strstr("foobar", "bar");
    }

    #[utest]
    fn data() {
        assert_data(b"abc", b"abd");
    }

    #[utest]
    fn equal() {
        assert_equal(1, 2);
    }

    #[utest]
    fn not_equal() {
        assert_not_equal(3, 3);
    }

    #[utest]
    fn less() {
        assert_lt(5, 4);
    }

    #[utest]
    fn less_equal() {
        assert_le(5, 4);
    }

    #[utest]
    fn greater() {
        assert_gt(4, 5);
    }

    #[utest]
    fn greater_equal() {
        assert_ge(4, 5);
    }

    #[utest]
    fn unsigned_equal() {
        assert_equal_u(1u32, 2u32);
    }

    #[utest]
    fn interval() {
        assert_interval(10, 20, 30);
    }

    #[utest]
    fn null() {
        assert_null(Some(&1));
    }

    #[utest]
    fn not_null() {
        assert_not_null(None::<&i32>);
    }

    #[utest]
    fn truth() {
        assert_true(false);
    }

    #[utest]
    fn falsity() {
        assert_false(true);
    }

    #[utest]
    fn unconditional() {
        utest_log!("about to fail");
        assert_fail();
    }

    #[utest]
    fn near() {
        assert_dbl_near(1.0, 1.1);
    }

    #[utest]
    fn far() {
        assert_dbl_far(1.0, 1.0);
    }

    #[utest]
    fn error_message() {
        utest_err!("custom failure {}", 42);
    }
}

#[utest::main]
fn main() {}
