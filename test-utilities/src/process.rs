use std::{path::Path, process::Command};

use crate::error::HarnessError;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub signal: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn exit_code(&self) -> Result<i32, HarnessError> {
        match (self.code, self.signal) {
            (Some(code), _) => Ok(code),
            (None, Some(signal)) => Err(HarnessError::Signal(signal)),
            (None, None) => Err(HarnessError::Signal(0)),
        }
    }
}

/// Runs `binary` with `args` to completion, capturing both output streams.
pub fn execute(binary: impl AsRef<Path>, args: &[&str]) -> Result<CommandOutput, HarnessError> {
    let binary = binary.as_ref();

    log::debug!("spawning {} {:?}", binary.display(), args);

    let output = Command::new(binary)
        .args(args)
        .output()
        .map_err(|source| HarnessError::Spawn {
            binary: binary.display().to_string(),
            source,
        })?;

    #[cfg(unix)]
    let signal = {
        use std::os::unix::process::ExitStatusExt;
        output.status.signal()
    };

    #[cfg(not(unix))]
    let signal = None;

    log::debug!(
        "{} exited with {:?} (signal {:?})",
        binary.display(),
        output.status.code(),
        signal
    );

    Ok(CommandOutput {
        code: output.status.code(),
        signal,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_is_captured() {
        let output = execute("sh", &["-c", "echo hello; exit 3"]).unwrap();

        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.exit_code().unwrap(), 3);
        assert!(!output.success());
    }

    #[test]
    fn test_success() {
        let output = execute("sh", &["-c", "echo oops >&2"]).unwrap();

        assert!(output.success());
        assert_eq!(output.stderr, "oops\n");
    }

    #[test]
    fn test_signal_is_captured() {
        let output = execute("sh", &["-c", "kill -SEGV $$"]).unwrap();

        assert_eq!(output.code, None);
        assert_eq!(output.signal, Some(libc::SIGSEGV));
        assert!(!output.success());
        assert!(matches!(output.exit_code(), Err(HarnessError::Signal(libc::SIGSEGV))));
    }

    #[test]
    fn test_missing_binary() {
        let result = execute("/nonexistent/binary", &[]);

        assert!(matches!(result, Err(HarnessError::Spawn { .. })));
    }
}
