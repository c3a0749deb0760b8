//! Progress indicators
//!
//! `add` and `init` resolve a dependency graph over the network before writing anything;
//! a spinner on stderr shows which item is being fetched. Stdout is never touched, so the
//! JSON and summary output stays clean.
//!
//! Spinners are hidden when progress is disabled (`--no-progress`, `--quiet`) or when
//! stderr is not a terminal.
//!
//! # Examples
//!
//! ```rust
//! use regpm_cli::utils::progress::ProgressBar;
//!
//! let spinner = ProgressBar::new_spinner(false);
//! spinner.set_message("Resolving @acme/button");
//! spinner.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Thin wrapper around an `indicatif` bar with regpm's styling.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// A ticking spinner, or a hidden one when `enabled` is false or stderr is not a TTY.
    #[must_use]
    pub fn new_spinner(enabled: bool) -> Self {
        let bar = if !enabled || !std::io::stderr().is_terminal() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            inner: bar,
        }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

/// Spinner with an initial message.
#[must_use]
pub fn spinner_with_message(enabled: bool, msg: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner(enabled);
    spinner.set_message(msg);
    spinner
}
