//! A small unit-test framework for native binaries.
//!
//! Tests are declared with [`macro@utest`], discovered before `main` runs and executed by
//! [`run_main`], which prints a line oriented report on stdout and exits with the number
//! of failed tests.
//!
//! ```ignore
//! use utest::{assert_equal, utest};
//!
//! #[utest(arith)]
//! fn addition() {
//!     assert_equal(4, 2 + 2);
//! }
//!
//! #[utest::main]
//! fn main() {}
//! ```

extern crate self as utest;

pub mod assertions;
pub mod case;
pub mod channel;
pub mod config;
pub mod error;
pub mod fault;
pub mod filter;
pub mod registry;
pub mod report;
pub mod runner;

pub use assertions::*;
pub use case::{DeclarationSite, Fixture, TestCase};
pub use config::{ColorMode, RunnerConfig};
pub use error::RunError;
pub use filter::FilterSpec;
pub use report::{Outcome, RunSummary};
pub use runner::{run_main, Runner};
pub use utest_macros::{main, utest};

#[doc(hidden)]
pub mod __private {
    pub use ctor;
}

/// Records a message for the running test without interrupting it.
///
/// Printed as `  LOG: <message>` after the test's result.
#[macro_export]
macro_rules! utest_log {
    ($($arg:tt)*) => {
        $crate::channel::log(::core::format_args!($($arg)*))
    };
}

/// Records a message and fails the running test.
#[macro_export]
macro_rules! utest_err {
    ($($arg:tt)*) => {
        $crate::channel::fail(::core::format_args!($($arg)*))
    };
}
