use utest::{assert_equal, utest};

#[utest(simple)]
fn single_assert() {
    assert_equal(1, 1);
}

#[utest::main]
fn main() {}
