use utest::utest;

#[utest(early_exit)]
fn exception() {
    panic!("I am a bad error!");
}

#[utest::main]
fn main() {}
