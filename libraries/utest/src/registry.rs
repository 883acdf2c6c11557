//! Test discovery.
//!
//! Every `#[utest]` declaration appends its [`TestCase`] to the process registry from a
//! static initializer, so by the time `main` runs the registry already knows every test
//! linked into the binary. No list has to be maintained by hand.

use hermit_sync::SpinMutex;

use crate::case::{TestCase, ANCHOR};

static PROCESS_REGISTRY: SpinMutex<Vec<&'static TestCase>> = SpinMutex::new(Vec::new());

/// Appends `case` to the process registry.
///
/// Returns `false` if the case does not carry the integrity marker, in which case it is
/// never run.
pub fn register(case: &'static TestCase) -> bool {
    if !case.has_valid_marker() {
        log::warn!("rejecting test case {} with a corrupt marker", case);
        return false;
    }

    PROCESS_REGISTRY.lock().push(case);
    true
}

/// Copies the process registry.
pub fn snapshot() -> Registry {
    let mut registry = Registry::new();

    for case in PROCESS_REGISTRY.lock().iter() {
        registry.register(case);
    }

    log::debug!("discovered {} test cases", registry.declared().count());

    registry
}

/// An ordered, append-only collection of test cases.
///
/// The first entry is always the anchor record.
#[derive(Debug, Clone)]
pub struct Registry {
    cases: Vec<&'static TestCase>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            cases: vec![&ANCHOR],
        }
    }

    pub fn register(&mut self, case: &'static TestCase) -> bool {
        if !case.has_valid_marker() {
            log::warn!("rejecting test case {} with a corrupt marker", case);
            return false;
        }

        if case.is_anchor() {
            return false;
        }

        // Static initializers do not run in source order across object files, keep the
        // collection sorted by declaration site instead. Equal sites keep insertion order.
        let at = self.cases[1..].partition_point(|existing| existing.site <= case.site) + 1;
        self.cases.insert(at, case);

        log::debug!("registered {} from {}", case, case.site);
        true
    }

    /// Anchor first, then every declared case in declaration order.
    pub fn cases(&self) -> impl Iterator<Item = &'static TestCase> + '_ {
        self.cases.iter().copied()
    }

    pub fn declared(&self) -> impl Iterator<Item = &'static TestCase> + '_ {
        self.cases().filter(|case| !case.is_anchor())
    }

    pub fn is_empty(&self) -> bool {
        self.cases.len() == 1
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{DeclarationSite, CASE_MAGIC};

    fn noop() {}

    static FIRST: TestCase =
        TestCase::nullary("alpha", "first", noop, DeclarationSite::new("a.rs", 10, 1));
    static SECOND: TestCase =
        TestCase::nullary("alpha", "second", noop, DeclarationSite::new("a.rs", 20, 1));
    static THIRD: TestCase =
        TestCase::nullary("beta", "third", noop, DeclarationSite::new("b.rs", 5, 1));

    static CORRUPT: TestCase = TestCase {
        magic: !CASE_MAGIC,
        ..TestCase::nullary("gamma", "corrupt", noop, DeclarationSite::new("c.rs", 1, 1))
    };

    fn names(registry: &Registry) -> Vec<&'static str> {
        registry.declared().map(|case| case.name).collect()
    }

    #[test]
    fn test_empty_registry_holds_anchor_only() {
        let registry = Registry::new();

        assert!(registry.is_empty());
        assert_eq!(registry.cases().count(), 1);
        assert!(registry.cases().all(|case| case.is_anchor() && case.skip));
        assert_eq!(registry.declared().count(), 0);
    }

    #[test]
    fn test_declaration_order_independent_of_insertion() {
        let mut registry = Registry::new();

        assert!(registry.register(&THIRD));
        assert!(registry.register(&SECOND));
        assert!(registry.register(&FIRST));

        assert_eq!(names(&registry), ["first", "second", "third"]);
        assert!(registry.cases().next().is_some_and(|case| case.is_anchor()));
    }

    #[test]
    fn test_corrupt_marker_rejected() {
        let mut registry = Registry::new();

        assert!(!registry.register(&CORRUPT));
        assert!(registry.register(&FIRST));

        assert_eq!(names(&registry), ["first"]);
    }

    #[test]
    fn test_anchor_cannot_be_registered_twice() {
        let mut registry = Registry::new();

        assert!(!registry.register(&ANCHOR));
        assert_eq!(registry.cases().count(), 1);
    }
}
