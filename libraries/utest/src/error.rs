use core::fmt;
use std::io;

/// Failures of the runner itself. Test failures are outcomes, not errors.
#[derive(Debug)]
pub enum RunError {
    /// Writing the report failed.
    Io(io::Error),
    /// A runner is already active on this thread.
    AlreadyRunning,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Io(err) => write!(f, "failed to write the test report: {}", err),
            RunError::AlreadyRunning => f.write_str("a test runner is already active on this thread"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Io(err) => Some(err),
            RunError::AlreadyRunning => None,
        }
    }
}

impl From<io::Error> for RunError {
    fn from(err: io::Error) -> Self {
        RunError::Io(err)
    }
}
