use core::fmt;

/// Marker every registered test case must carry.
pub const CASE_MAGIC: u32 = 0xdead_beef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeclarationSite {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl DeclarationSite {
    pub const fn new(file: &'static str, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }
}

impl fmt::Display for DeclarationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Private data block of a unary test.
///
/// `setup` runs before the body and `teardown` after it. Both default to no-ops.
pub trait Fixture: Default + 'static {
    fn setup(&mut self) {}

    fn teardown(&mut self) {}
}

/// Type-erased data block handed to the runner.
pub trait DataBlock {
    fn setup(&mut self);
    fn run(&mut self);
    fn teardown(&mut self);
}

struct FixtureBlock<T: Fixture> {
    data: T,
    body: fn(&mut T),
}

impl<T: Fixture> DataBlock for FixtureBlock<T> {
    fn setup(&mut self) {
        self.data.setup();
    }

    fn run(&mut self) {
        (self.body)(&mut self.data);
    }

    fn teardown(&mut self) {
        self.data.teardown();
    }
}

/// Creates a fresh data block for `body`.
pub fn data_block<T: Fixture>(body: fn(&mut T)) -> Box<dyn DataBlock> {
    Box::new(FixtureBlock {
        data: T::default(),
        body,
    })
}

#[derive(Clone, Copy)]
pub enum RunEntry {
    Nullary(fn()),
    /// Creates the private data block; the body lives inside it.
    Unary(fn() -> Box<dyn DataBlock>),
}

impl fmt::Debug for RunEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunEntry::Nullary(_) => f.write_str("Nullary"),
            RunEntry::Unary(_) => f.write_str("Unary"),
        }
    }
}

#[derive(Debug)]
pub struct TestCase {
    pub suite: &'static str,
    pub name: &'static str,
    pub run: RunEntry,
    pub skip: bool,
    pub site: DeclarationSite,
    pub(crate) magic: u32,
}

impl TestCase {
    pub const fn new(
        suite: &'static str,
        name: &'static str,
        run: RunEntry,
        skip: bool,
        site: DeclarationSite,
    ) -> Self {
        Self {
            suite,
            name,
            run,
            skip,
            site,
            magic: CASE_MAGIC,
        }
    }

    pub const fn nullary(
        suite: &'static str,
        name: &'static str,
        body: fn(),
        site: DeclarationSite,
    ) -> Self {
        Self::new(suite, name, RunEntry::Nullary(body), false, site)
    }

    pub const fn skipped(self) -> Self {
        Self { skip: true, ..self }
    }

    pub fn has_valid_marker(&self) -> bool {
        self.magic == CASE_MAGIC
    }

    pub fn is_anchor(&self) -> bool {
        core::ptr::eq(self, &ANCHOR)
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.suite, self.name)
    }
}

fn anchor_body() {}

/// Always present, always skipped. Never counted, printed or executed.
pub(crate) static ANCHOR: TestCase = TestCase::nullary(
    "suite",
    "test",
    anchor_body,
    DeclarationSite::new("", 0, 0),
)
.skipped();

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static TRACE: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    }

    #[derive(Default)]
    struct Counter {
        value: u32,
    }

    impl Fixture for Counter {
        fn setup(&mut self) {
            self.value = 10;
            TRACE.with(|t| t.borrow_mut().push("setup"));
        }

        fn teardown(&mut self) {
            TRACE.with(|t| t.borrow_mut().push("teardown"));
        }
    }

    fn bump(counter: &mut Counter) {
        counter.value += 1;
        assert_eq!(counter.value, 11);
        TRACE.with(|t| t.borrow_mut().push("body"));
    }

    #[test]
    fn test_data_block_order() {
        let mut block = data_block::<Counter>(bump);
        block.setup();
        block.run();
        block.teardown();

        TRACE.with(|t| assert_eq!(*t.borrow(), ["setup", "body", "teardown"]));
    }

    #[test]
    fn test_anchor_identity() {
        assert!(ANCHOR.is_anchor());
        assert!(ANCHOR.skip);

        static OTHER: TestCase =
            TestCase::nullary("suite", "test", anchor_body, DeclarationSite::new("", 0, 0));
        assert!(!OTHER.is_anchor());
        assert!(OTHER.has_valid_marker());
    }

    #[test]
    fn test_site_ordering() {
        let a = DeclarationSite::new("a.rs", 10, 1);
        let b = DeclarationSite::new("a.rs", 12, 1);
        let c = DeclarationSite::new("b.rs", 1, 1);

        assert!(a < b);
        assert!(b < c);
        assert_eq!(a.to_string(), "a.rs:10:1");
    }
}
