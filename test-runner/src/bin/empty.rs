#[utest::main]
fn main() {}
