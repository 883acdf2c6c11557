use core::fmt;
use std::io;

#[derive(Debug)]
pub enum HarnessError {
    /// The binary could not be started.
    Spawn { binary: String, source: io::Error },
    /// The binary was terminated by a signal instead of exiting.
    Signal(i32),
    /// The report has no `RESULTS:` line.
    MissingSummary,
    MalformedSummary(String),
    MalformedLine(String),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::Spawn { binary, source } => {
                write!(f, "failed to spawn {}: {}", binary, source)
            }
            HarnessError::Signal(signal) => write!(f, "terminated by signal {}", signal),
            HarnessError::MissingSummary => f.write_str("report has no RESULTS line"),
            HarnessError::MalformedSummary(line) => write!(f, "malformed summary line: {}", line),
            HarnessError::MalformedLine(line) => write!(f, "malformed test line: {}", line),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
