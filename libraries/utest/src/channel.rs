//! The error channel: per-test message buffer plus the recovery point assertions unwind to.
//!
//! The runner arms the channel for exactly one test at a time. A failing assertion records
//! its message here and unwinds with an [`AssertionSignal`] payload, which the runner
//! catches at the test boundary. `resume_unwind` is used instead of `panic!` so the panic
//! hook never sees assertion failures.

use core::{cell::RefCell, fmt, marker::PhantomData};
use std::panic;

use crate::error::RunError;

/// Size of the message buffer, terminator included.
pub const MESSAGE_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Log,
    Err,
}

impl Level {
    pub fn title(self) -> &'static str {
        match self {
            Level::Log => "LOG",
            Level::Err => "ERR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    /// Bytes the message occupies once rendered as `  <TITLE>: <text>\n`.
    fn rendered_len(level: Level, text: &str) -> usize {
        framing_len(level) + text.len()
    }
}

fn framing_len(level: Level) -> usize {
    "  ".len() + level.title().len() + ": ".len() + "\n".len()
}

/// Unwind payload of a failed assertion.
#[derive(Debug)]
pub(crate) struct AssertionSignal;

struct Buffer {
    messages: Vec<Message>,
    remaining: usize,
}

impl Buffer {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            remaining: MESSAGE_CAPACITY - 1,
        }
    }

    fn push(&mut self, level: Level, mut text: String) {
        let framing = framing_len(level);

        if self.remaining <= framing {
            self.remaining = 0;
            return;
        }

        let budget = self.remaining - framing;
        if text.len() > budget {
            let mut cut = budget;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }

        self.remaining -= Message::rendered_len(level, &text);
        self.messages.push(Message { level, text });
    }
}

thread_local! {
    static CHANNEL: RefCell<Option<Buffer>> = const { RefCell::new(None) };
}

/// The armed recovery point of the current test window.
///
/// Only one may exist per thread. Dropping it disarms the channel.
pub struct ErrorChannel {
    // The channel lives in a thread local, keep the guard on this thread.
    _thread_bound: PhantomData<*const ()>,
}

impl ErrorChannel {
    pub fn arm() -> Result<Self, RunError> {
        CHANNEL.with(|channel| {
            let mut channel = channel.borrow_mut();

            if channel.is_some() {
                return Err(RunError::AlreadyRunning);
            }

            *channel = Some(Buffer::new());

            Ok(Self {
                _thread_bound: PhantomData,
            })
        })
    }

    /// Empties the buffer before the next test.
    pub fn rewind(&self) {
        CHANNEL.with(|channel| *channel.borrow_mut() = Some(Buffer::new()));
    }

    pub fn take(&self) -> Vec<Message> {
        CHANNEL.with(|channel| {
            channel
                .borrow_mut()
                .as_mut()
                .map(|buffer| core::mem::take(&mut buffer.messages))
                .unwrap_or_default()
        })
    }
}

impl Drop for ErrorChannel {
    fn drop(&mut self) {
        CHANNEL.with(|channel| *channel.borrow_mut() = None);
    }
}

pub fn is_armed() -> bool {
    CHANNEL.with(|channel| channel.borrow().is_some())
}

/// Records `args` in the channel without interrupting the test.
pub fn log(args: fmt::Arguments<'_>) {
    let recorded = CHANNEL.with(|channel| match channel.borrow_mut().as_mut() {
        Some(buffer) => {
            buffer.push(Level::Log, args.to_string());
            true
        }
        None => false,
    });

    if !recorded {
        log::info!("{}", args);
    }
}

/// Records `args` and abandons the running test.
///
/// Outside of a runner this is a plain panic carrying the message.
pub fn fail(args: fmt::Arguments<'_>) -> ! {
    let recorded = CHANNEL.with(|channel| match channel.borrow_mut().as_mut() {
        Some(buffer) => {
            buffer.push(Level::Err, args.to_string());
            true
        }
        None => false,
    });

    if recorded {
        panic::resume_unwind(Box::new(AssertionSignal));
    }

    panic!("{}", args);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_recovery_point() {
        let first = ErrorChannel::arm().unwrap();
        assert!(is_armed());
        assert!(matches!(ErrorChannel::arm(), Err(RunError::AlreadyRunning)));

        drop(first);
        assert!(!is_armed());
        assert!(ErrorChannel::arm().is_ok());
    }

    #[test]
    fn test_rewind_discards_messages() {
        let channel = ErrorChannel::arm().unwrap();

        log(format_args!("first {}", 1));
        channel.rewind();
        log(format_args!("second"));

        assert_eq!(
            channel.take(),
            [Message {
                level: Level::Log,
                text: "second".to_string()
            }]
        );
        assert!(channel.take().is_empty());
    }

    #[test]
    fn test_fail_unwinds_with_signal() {
        let channel = ErrorChannel::arm().unwrap();

        let result = panic::catch_unwind(|| {
            fail(format_args!("boom"));
        });

        let payload = result.unwrap_err();
        assert!(payload.is::<AssertionSignal>());
        assert_eq!(channel.take()[0].level, Level::Err);
    }

    #[test]
    #[should_panic(expected = "plain failure")]
    fn test_fail_without_runner_panics() {
        fail(format_args!("plain failure"));
    }

    #[test]
    fn test_buffer_is_bounded() {
        let channel = ErrorChannel::arm().unwrap();
        let line = "x".repeat(1000);

        for _ in 0..10 {
            log(format_args!("{}", line));
        }

        let messages = channel.take();
        let rendered: usize = messages
            .iter()
            .map(|m| Message::rendered_len(m.level, &m.text))
            .sum();

        assert!(rendered <= MESSAGE_CAPACITY - 1);
        assert_eq!(messages.len(), 5);
        assert!(messages[4].text.len() < 1000);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        let mut buffer = Buffer::new();
        buffer.remaining = framing_len(Level::Log) + 3;

        buffer.push(Level::Log, "ééé".to_string());

        assert_eq!(buffer.messages[0].text, "é");
    }
}
