use utest::utest;

#[utest(crash)]
fn segv() {
    #[cfg(unix)]
    unsafe {
        libc::raise(libc::SIGSEGV);
    }
}

#[utest::main]
fn main() {}
