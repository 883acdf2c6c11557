//! Executes the selected cases one after another and reports them.
//!
//! A test moves through `Selected -> Started -> {Ok | Failed | Errored | Skipped}`:
//!
//! - An assertion failure unwinds to the outer boundary: teardown is skipped, the test is
//!   `Failed`.
//! - Any other panic in the body is caught by the inner boundary: teardown still runs,
//!   the test is `Errored`.
//! - A panic in setup is `Errored` and teardown never runs. An assertion failure in
//!   setup is `Failed`, again without body or teardown.
//! - A panic escaping teardown is `Errored`.

use core::cell::{Cell, RefCell};
use std::{
    any::Any,
    io::{self, Write},
    panic::{self, AssertUnwindSafe, PanicHookInfo},
    process::ExitCode,
    sync::Once,
    time::Instant,
};

use crate::{
    case::{RunEntry, TestCase},
    channel::{AssertionSignal, ErrorChannel},
    config::RunnerConfig,
    error::RunError,
    filter::FilterSpec,
    registry::{self, Registry},
    report::{Outcome, PanicPayload, Reporter, RunSummary},
};

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicPayload>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Records panics raised on this thread instead of printing them.
///
/// The hook is installed once per process and forwards panics of threads that are not
/// capturing to the previous hook.
struct PanicCapture;

impl PanicCapture {
    fn install() -> Self {
        HOOK.call_once(|| {
            let previous = panic::take_hook();

            panic::set_hook(Box::new(move |info| {
                if !CAPTURING.try_with(Cell::get).unwrap_or(false) {
                    return previous(info);
                }

                let payload = payload_from_hook(info);
                let _ = LAST_PANIC.try_with(|last| last.replace(Some(payload)));
            }));
        });

        CAPTURING.with(|capturing| capturing.set(true));

        Self
    }
}

impl Drop for PanicCapture {
    fn drop(&mut self) {
        CAPTURING.with(|capturing| capturing.set(false));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

fn payload_from_hook(info: &PanicHookInfo<'_>) -> PanicPayload {
    let (file, line, col) = info
        .location()
        .map(|location| (location.file().to_string(), location.line(), location.column()))
        .unwrap_or_else(|| ("<unknown>".to_string(), 0, 0));

    PanicPayload {
        message: panic_message(info.payload()),
        file,
        line,
        col,
    }
}

fn forget_panic() {
    LAST_PANIC.with(|last| last.borrow_mut().take());
}

/// Prefers what the hook recorded, it knows where the panic happened. A payload raised
/// with `resume_unwind` never reaches the hook, so the record must carry the same message.
fn take_panic(payload: Box<dyn Any + Send>) -> PanicPayload {
    let message = panic_message(payload.as_ref());

    match LAST_PANIC.with(|last| last.borrow_mut().take()) {
        Some(recorded) if recorded.message == message => recorded,
        _ => PanicPayload {
            message,
            file: "<unknown>".to_string(),
            line: 0,
            col: 0,
        },
    }
}

/// Runs `body`, converting a non-assertion panic into its diagnostic. Assertion failures
/// keep unwinding.
fn guard_body(body: impl FnOnce()) -> Option<PanicPayload> {
    forget_panic();

    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(()) => None,
        Err(signal) if signal.is::<AssertionSignal>() => panic::resume_unwind(signal),
        Err(other) => Some(take_panic(other)),
    }
}

fn invoke(case: &TestCase) -> Option<PanicPayload> {
    match case.run {
        RunEntry::Nullary(body) => guard_body(body),
        RunEntry::Unary(make_block) => {
            let mut block = make_block();

            block.setup();
            let escaped = guard_body(|| block.run());
            block.teardown();

            escaped
        }
    }
}

fn execute(case: &TestCase) -> (Outcome, Option<PanicPayload>) {
    forget_panic();

    log::trace!("{}: started", case);

    let result = match panic::catch_unwind(AssertUnwindSafe(|| invoke(case))) {
        Ok(None) => (Outcome::Ok, None),
        Ok(Some(panic)) => (Outcome::Errored, Some(panic)),
        Err(signal) if signal.is::<AssertionSignal>() => (Outcome::Failed, None),
        Err(other) => (Outcome::Errored, Some(take_panic(other))),
    };

    log::trace!("{}: {:?}", case, result.0);

    result
}

pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs every case of `registry` selected by `filter` and writes the report to `out`.
    ///
    /// Colors resolve against stdout when the mode is automatic.
    pub fn run<W: Write>(
        &self,
        registry: &Registry,
        filter: &FilterSpec,
        out: W,
    ) -> Result<RunSummary, RunError> {
        let channel = ErrorChannel::arm()?;
        let colored = self.config.color.resolve_for_stdout();

        if let Some(hook) = &self.config.fault_hook {
            hook.install(colored);
        }

        let selected: Vec<&'static TestCase> =
            registry.declared().filter(|case| filter.select(case)).collect();

        log::debug!(
            "selected {} of {} cases with filter {}",
            selected.len(),
            registry.declared().count(),
            filter
        );

        let _capture = PanicCapture::install();

        let mut reporter = Reporter::new(out, colored, self.config.color_ok);
        let mut summary = RunSummary::new(selected.len());
        let started = Instant::now();

        for (idx, case) in selected.iter().enumerate() {
            channel.rewind();

            reporter.case_started(idx + 1, summary.total, case)?;

            let (outcome, panic) = if case.skip {
                log::trace!("{}: skipped", case);
                (Outcome::Skipped, None)
            } else {
                execute(case)
            };

            reporter.case_finished(outcome, panic.as_ref())?;

            if outcome != Outcome::Skipped {
                reporter.messages(&channel.take())?;
            }

            summary.record(case, outcome);
        }

        summary.elapsed = started.elapsed();
        reporter.summary(&summary)?;

        log::info!(
            "{} tests: {} ok, {} failed, {} errored, {} skipped",
            summary.total,
            summary.ok,
            summary.failed,
            summary.errored,
            summary.skipped
        );

        Ok(summary)
    }
}

/// Entry point of a test binary: every registered case, filtered by the command line,
/// reported on stdout. The exit status is the number of failed cases.
pub fn run_main() -> ExitCode {
    let registry = registry::snapshot();
    let filter = FilterSpec::from_args(std::env::args().skip(1));
    let runner = Runner::new(RunnerConfig::from_features());

    match runner.run(&registry, &filter, io::stdout().lock()) {
        Ok(summary) => ExitCode::from(summary.exit_code()),
        Err(err) => {
            eprintln!("utest: {}", err);
            ExitCode::from(u8::MAX)
        }
    }
}
