//! The line oriented report written to stdout.
//!
//! ```text
//! TEST <i>/<total> <suite>:<test> [OK|FAILED|SKIPPED]
//!   <detail lines>
//! RESULTS: <total> tests (<ok> ok, <failed> failed, <errored> errored, <skipped> skipped) ran in <T.1> ms
//! ```
//!
//! External tooling parses this text. Colors only ever wrap tokens.

use core::{fmt, time::Duration};
use std::io::{self, Write};

use crate::{
    case::TestCase,
    channel::{Level, Message},
};

pub(crate) mod ansi {
    pub const BLUE: &str = "\x1b[0;34m";
    pub const YELLOW: &str = "\x1b[0;33m";
    pub const GREEN: &str = "\x1b[0;32m";
    pub const WHITE: &str = "\x1b[01;37m";
    pub const BRED: &str = "\x1b[01;31m";
    pub const BGREEN: &str = "\x1b[01;32m";
    pub const BYELLOW: &str = "\x1b[01;33m";
    pub const NORMAL: &str = "\x1b[0m";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failed,
    Errored,
    Skipped,
}

/// A panic that escaped a test body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicPayload {
    pub message: String,
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected panic: {} at {}:{}:{}",
            self.message, self.file, self.line, self.col
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    pub suite: &'static str,
    pub name: &'static str,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of selected cases, skipped ones included.
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub elapsed: Duration,
    pub cases: Vec<CaseReport>,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, case: &TestCase, outcome: Outcome) {
        match outcome {
            Outcome::Ok => self.ok += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Errored => self.errored += 1,
            Outcome::Skipped => self.skipped += 1,
        }

        self.cases.push(CaseReport {
            suite: case.suite,
            name: case.name,
            outcome,
        });
    }

    /// Only failed cases count. Errored and skipped cases never affect the exit code.
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.failed).unwrap_or(u8::MAX)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RESULTS: {} tests ({} ok, {} failed, {} errored, {} skipped) ran in {:.1} ms",
            self.total,
            self.ok,
            self.failed,
            self.errored,
            self.skipped,
            self.elapsed.as_secs_f64() * 1000.0
        )
    }
}

pub struct Reporter<W: Write> {
    out: W,
    colored: bool,
    color_ok: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, colored: bool, color_ok: bool) -> Self {
        Self {
            out,
            colored,
            color_ok,
        }
    }

    fn paint(&mut self, color: &str, enabled: bool, text: &str) -> io::Result<()> {
        if self.colored && enabled {
            write!(self.out, "{}{}{}", color, text, ansi::NORMAL)
        } else {
            self.out.write_all(text.as_bytes())
        }
    }

    /// Writes `TEST <i>/<total> <suite>:<test> ` and flushes, so a fatal fault inside the
    /// test still leaves its name on screen.
    pub fn case_started(&mut self, index: usize, total: usize, case: &TestCase) -> io::Result<()> {
        write!(self.out, "TEST {}/{} ", index, total)?;
        self.paint(ansi::WHITE, self.color_ok, &case.to_string())?;
        self.out.write_all(b" ")?;
        self.out.flush()
    }

    pub fn case_finished(
        &mut self,
        outcome: Outcome,
        panic: Option<&PanicPayload>,
    ) -> io::Result<()> {
        match outcome {
            Outcome::Ok => self.paint(ansi::BGREEN, self.color_ok, "[OK]")?,
            Outcome::Skipped => self.paint(ansi::BYELLOW, true, "[SKIPPED]")?,
            Outcome::Failed | Outcome::Errored => self.paint(ansi::BRED, self.color_ok, "[FAILED]")?,
        }
        self.out.write_all(b"\n")?;

        if let (Outcome::Errored, Some(panic)) = (outcome, panic) {
            let line = format!("  ERRORED: {}", panic).replace('\n', "\n  ");
            self.paint(ansi::BRED, self.color_ok, &line)?;
            self.out.write_all(b"\n")?;
        }

        Ok(())
    }

    pub fn messages(&mut self, messages: &[Message]) -> io::Result<()> {
        for message in messages {
            let color = match message.level {
                Level::Log => ansi::BLUE,
                Level::Err => ansi::YELLOW,
            };

            let line = format!("  {}: {}", message.level.title(), message.text);
            self.paint(color, true, &line)?;
            self.out.write_all(b"\n")?;
        }

        Ok(())
    }

    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        let color = if summary.failed > 0 {
            ansi::BRED
        } else {
            ansi::GREEN
        };

        self.paint(color, self.color_ok, &summary.to_string())?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
