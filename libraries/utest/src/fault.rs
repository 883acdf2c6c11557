//! Fatal fault diagnostics.
//!
//! A memory fault inside a test cannot be recovered from. The hook only makes sure the
//! last line of the report says what happened before the process dies the usual way.

/// Installed by the runner before the first test runs.
pub trait FaultHook {
    fn install(&self, colored: bool);
}

pub(crate) fn default_hook() -> Option<Box<dyn FaultHook>> {
    #[cfg(all(unix, feature = "crash-guard"))]
    {
        Some(Box::new(SegfaultGuard))
    }

    #[cfg(not(all(unix, feature = "crash-guard")))]
    {
        None
    }
}

#[cfg(unix)]
pub use unix::SegfaultGuard;

#[cfg(unix)]
mod unix {
    use core::sync::atomic::{AtomicBool, Ordering};

    use super::FaultHook;
    use crate::report::ansi;

    static COLORED: AtomicBool = AtomicBool::new(false);

    /// Reports SIGSEGV and SIGBUS on stdout, then re-raises them with the default
    /// disposition.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SegfaultGuard;

    impl FaultHook for SegfaultGuard {
        fn install(&self, colored: bool) {
            COLORED.store(colored, Ordering::Relaxed);

            let handler = on_fault as extern "C" fn(libc::c_int) as libc::sighandler_t;

            unsafe {
                libc::signal(libc::SIGSEGV, handler);
                libc::signal(libc::SIGBUS, handler);
            }

            log::debug!("fault guard installed for SIGSEGV and SIGBUS");
        }
    }

    fn diagnostic(signum: libc::c_int) -> &'static str {
        match signum {
            libc::SIGBUS => "[SIGBUS: Bus error]",
            _ => "[SIGSEGV: Segmentation fault]",
        }
    }

    fn write_stdout(bytes: &[u8]) {
        // Only async-signal-safe calls from here on.
        unsafe {
            libc::write(libc::STDOUT_FILENO, bytes.as_ptr().cast(), bytes.len());
        }
    }

    extern "C" fn on_fault(signum: libc::c_int) {
        if COLORED.load(Ordering::Relaxed) {
            write_stdout(ansi::BRED.as_bytes());
            write_stdout(diagnostic(signum).as_bytes());
            write_stdout(ansi::NORMAL.as_bytes());
        } else {
            write_stdout(diagnostic(signum).as_bytes());
        }
        write_stdout(b"\n");

        unsafe {
            libc::signal(signum, libc::SIG_DFL);
            libc::raise(signum);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_diagnostic_lines() {
            assert_eq!(diagnostic(libc::SIGSEGV), "[SIGSEGV: Segmentation fault]");
            assert_eq!(diagnostic(libc::SIGBUS), "[SIGBUS: Bus error]");
        }
    }
}
