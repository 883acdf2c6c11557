use std::io::IsTerminal;

use crate::fault::FaultHook;

/// Color output mode for the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colorize when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }

    pub fn resolve_for_stdout(self) -> bool {
        self.should_use_colors(std::io::stdout().is_terminal())
    }
}

pub struct RunnerConfig {
    pub color: ColorMode,
    /// Colorize names, `[OK]`, `[FAILED]` and the summary, not only skips and messages.
    pub color_ok: bool,
    /// Installed once before the first test runs.
    pub fault_hook: Option<Box<dyn FaultHook>>,
}

impl RunnerConfig {
    /// Configuration selected by the crate features:
    /// `color-ok`, `no-color` and `crash-guard`.
    pub fn from_features() -> Self {
        let color = if cfg!(feature = "no-color") {
            ColorMode::Never
        } else {
            ColorMode::Auto
        };

        Self {
            color,
            color_ok: cfg!(feature = "color-ok"),
            fault_hook: crate::fault::default_hook(),
        }
    }

    pub fn plain() -> Self {
        Self {
            color: ColorMode::Never,
            color_ok: false,
            fault_hook: None,
        }
    }

    pub fn with_color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn with_color_ok(mut self, color_ok: bool) -> Self {
        self.color_ok = color_ok;
        self
    }

    pub fn with_fault_hook(mut self, hook: Box<dyn FaultHook>) -> Self {
        self.fault_hook = Some(hook);
        self
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::from_features()
    }
}
