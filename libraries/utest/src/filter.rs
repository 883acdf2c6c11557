//! Glob based case selection.

use core::fmt;

use crate::case::TestCase;

/// Matches `candidate` against `pattern`, anchored at both ends.
///
/// `*` matches any run of characters (including none), `?` matches exactly one character
/// and anything else matches itself.
pub fn glob_match(pattern: &str, candidate: &str) -> bool {
    let mut pattern_chars = pattern.chars();

    match pattern_chars.next() {
        None => candidate.is_empty(),
        Some('*') => {
            let rest = pattern_chars.as_str();

            candidate
                .char_indices()
                .map(|(idx, _)| &candidate[idx..])
                .chain(core::iter::once(""))
                .any(|tail| glob_match(rest, tail))
        }
        Some(expected) => {
            let mut candidate_chars = candidate.chars();

            match candidate_chars.next() {
                Some(actual) if expected == '?' || expected == actual => {
                    glob_match(pattern_chars.as_str(), candidate_chars.as_str())
                }
                _ => false,
            }
        }
    }
}

/// A normalized glob pattern: always ends with `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(text: &str) -> Self {
        let mut pattern = String::from(text);

        if !pattern.ends_with('*') {
            pattern.push('*');
        }

        Self(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, candidate: &str) -> bool {
        glob_match(&self.0, candidate)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    suite: Option<Pattern>,
    test: Option<Pattern>,
}

impl FilterSpec {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn suite(suite: &str) -> Self {
        Self {
            suite: Some(Pattern::new(suite)),
            test: None,
        }
    }

    pub fn suite_and_test(suite: &str, test: &str) -> Self {
        Self {
            suite: Some(Pattern::new(suite)),
            test: Some(Pattern::new(test)),
        }
    }

    /// Builds a filter from the positional arguments of the test binary.
    ///
    /// `[suite-glob] [test-glob]`. A single argument only filters suites, even when it
    /// contains a `:`. Extra arguments are ignored.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();

        if args.len() > 2 {
            log::warn!(
                "ignoring {} argument(s) after the suite and test filters",
                args.len() - 2
            );
        }

        let spec = match args.as_slice() {
            [] => Self::all(),
            [single] => Self::suite(single.as_ref()),
            [suite, test, ..] => Self::suite_and_test(suite.as_ref(), test.as_ref()),
        };

        log::debug!("filter: {}", spec);

        spec
    }

    pub fn suite_pattern(&self) -> Option<&Pattern> {
        self.suite.as_ref()
    }

    pub fn test_pattern(&self) -> Option<&Pattern> {
        self.test.as_ref()
    }

    pub fn select(&self, case: &TestCase) -> bool {
        let suite_ok = self.suite.as_ref().is_none_or(|p| p.matches(case.suite));
        let test_ok = self.test.as_ref().is_none_or(|p| p.matches(case.name));

        suite_ok && test_ok
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.suite, &self.test) {
            (None, _) => f.write_str("<all>"),
            (Some(suite), None) => write!(f, "{}", suite),
            (Some(suite), Some(test)) => write!(f, "{}:{}", suite, test),
        }
    }
}
