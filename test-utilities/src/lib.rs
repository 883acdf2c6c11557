//! Harness for the end-to-end tests: spawns test binaries and reads their reports back.

mod error;
mod process;
mod report;

pub use error::HarnessError;
pub use process::{execute, CommandOutput};
pub use report::{parse_report, strip_ansi, CaseResult, TestResults, TestStatus, Totals};

#[cfg(feature = "test_log")]
#[ctor::ctor]
unsafe fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
