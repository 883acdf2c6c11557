use utest::{
    assert_equal, registry, utest, FilterSpec, Fixture, Outcome, Runner, RunnerConfig,
};

#[utest(macro_suite)]
fn plain() {
    assert_equal(2, 1 + 1);
}

#[utest(macro_suite, skip)]
fn skipped() {
    utest::assert_fail();
}

#[derive(Default)]
struct Counter {
    value: u32,
}

impl Fixture for Counter {
    fn setup(&mut self) {
        self.value = 1;
    }
}

#[utest]
mod macro_module {
    use super::*;

    #[utest]
    fn with_data(counter: &mut Counter) {
        assert_equal(1, counter.value);
    }

    #[utest]
    fn fails() {
        assert_equal(1, 2);
    }

    #[utest(skip)]
    fn skipped_in_module() {}
}

#[test]
fn declarations_are_registered_in_order() {
    let registry = registry::snapshot();

    let names: Vec<String> = registry.declared().map(|case| case.to_string()).collect();
    assert_eq!(
        names,
        [
            "macro_suite:plain",
            "macro_suite:skipped",
            "macro_module:with_data",
            "macro_module:fails",
            "macro_module:skipped_in_module",
        ]
    );

    let skips: Vec<bool> = registry.declared().map(|case| case.skip).collect();
    assert_eq!(skips, [false, true, false, false, true]);

    assert!(registry
        .declared()
        .all(|case| case.site.file.ends_with("declarations.rs")));
}

#[test]
fn declarations_run() {
    let registry = registry::snapshot();
    let runner = Runner::new(RunnerConfig::plain());

    let mut out = Vec::new();
    let summary = runner
        .run(&registry, &FilterSpec::all(), &mut out)
        .unwrap();

    let outcomes: Vec<Outcome> = summary.cases.iter().map(|case| case.outcome).collect();
    assert_eq!(
        outcomes,
        [
            Outcome::Ok,
            Outcome::Skipped,
            Outcome::Ok,
            Outcome::Failed,
            Outcome::Skipped,
        ]
    );
    assert_eq!(summary.exit_code(), 1);

    let report = String::from_utf8(out).unwrap();
    assert!(report.contains("TEST 4/5 macro_module:fails [FAILED]\n  ERR: "));
    assert!(report.contains("  assertion failed, 1 == 2\n"));
}

#[test]
fn module_filter() {
    let registry = registry::snapshot();
    let runner = Runner::new(RunnerConfig::plain());

    let summary = runner
        .run(&registry, &FilterSpec::suite_and_test("macro_module", "with"), Vec::new())
        .unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.ok, 1);
}
