//! Reads back the report a test binary prints on stdout.

use crate::error::HarnessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Ok,
    Failed,
    /// Printed as `[FAILED]` followed by an `ERRORED:` diagnostic line.
    Errored,
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseResult {
    pub index: usize,
    pub total: usize,
    pub suite: String,
    pub name: String,
    pub status: TestStatus,
    /// Indented lines following the case line, without the indentation.
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestResults {
    pub cases: Vec<CaseResult>,
    pub totals: Totals,
}

impl TestResults {
    pub fn count(&self, status: TestStatus) -> usize {
        self.cases.iter().filter(|case| case.status == status).count()
    }

    pub fn case(&self, suite: &str, name: &str) -> Option<&CaseResult> {
        self.cases
            .iter()
            .find(|case| case.suite == suite && case.name == name)
    }

    pub fn status_of(&self, suite: &str, name: &str) -> Option<TestStatus> {
        self.case(suite, name).map(|case| case.status)
    }
}

/// Removes `ESC [ ... m` color sequences.
pub fn strip_ansi(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }

    plain
}

fn parse_case(line: &str) -> Result<CaseResult, HarnessError> {
    let malformed = || HarnessError::MalformedLine(line.to_string());

    let mut fields = line.split_whitespace();

    let (index, total) = fields
        .next()
        .and_then(|position| position.split_once('/'))
        .ok_or_else(malformed)?;
    let (suite, name) = fields
        .next()
        .and_then(|case| case.split_once(':'))
        .ok_or_else(malformed)?;

    let status = match fields.next() {
        Some("[OK]") => TestStatus::Ok,
        Some("[FAILED]") => TestStatus::Failed,
        Some("[SKIPPED]") => TestStatus::Skipped,
        _ => return Err(malformed()),
    };

    Ok(CaseResult {
        index: index.parse().map_err(|_| malformed())?,
        total: total.parse().map_err(|_| malformed())?,
        suite: suite.to_string(),
        name: name.to_string(),
        status,
        details: Vec::new(),
    })
}

fn parse_totals(line: &str) -> Result<Totals, HarnessError> {
    let malformed = || HarnessError::MalformedSummary(line.to_string());

    let cleaned = line.replace(['(', ')', ','], " ");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    let labelled = |at: usize, label: &str| -> Result<usize, HarnessError> {
        match (tokens.get(at), tokens.get(at + 1)) {
            (Some(value), Some(found)) if *found == label => {
                value.parse().map_err(|_| malformed())
            }
            _ => Err(malformed()),
        }
    };

    let elapsed_ms = match tokens.get(10..) {
        Some(["ran", "in", elapsed, "ms"]) => elapsed.parse().map_err(|_| malformed())?,
        _ => return Err(malformed()),
    };

    Ok(Totals {
        total: labelled(0, "tests")?,
        ok: labelled(2, "ok")?,
        failed: labelled(4, "failed")?,
        errored: labelled(6, "errored")?,
        skipped: labelled(8, "skipped")?,
        elapsed_ms,
    })
}

/// Parses a complete report. Color sequences are ignored.
pub fn parse_report(stdout: &str) -> Result<TestResults, HarnessError> {
    let mut cases: Vec<CaseResult> = Vec::new();
    let mut totals = None;

    for raw in stdout.lines() {
        let line = strip_ansi(raw);

        if let Some(rest) = line.strip_prefix("TEST ") {
            cases.push(parse_case(rest)?);
        } else if let Some(rest) = line.strip_prefix("RESULTS: ") {
            totals = Some(parse_totals(rest)?);
        } else if let Some(detail) = line.strip_prefix("  ") {
            let Some(case) = cases.last_mut() else {
                return Err(HarnessError::MalformedLine(line.clone()));
            };

            if detail.starts_with("ERRORED: ") {
                case.status = TestStatus::Errored;
            }
            case.details.push(detail.to_string());
        } else if !line.is_empty() {
            log::debug!("ignoring unexpected report line: {}", line);
        }
    }

    let totals = totals.ok_or(HarnessError::MissingSummary)?;

    Ok(TestResults { cases, totals })
}
