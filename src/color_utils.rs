//! Color and styling utilities with support for NO_COLOR and TERM environment variables.
//!
//! Colored output is disabled by:
//! - the `--no-color` CLI flag
//! - the `NO_COLOR` environment variable (https://no-color.org/)
//! - the `AQUATHERM_NO_COLOR` environment variable
//! - `TERM=dumb`
//! - stderr not being a TTY

use colored::ColoredString;
use std::io::{stderr, IsTerminal};
use std::sync::OnceLock;

static COLOR_CONFIG: OnceLock<ColorConfig> = OnceLock::new();

fn should_disable_colors_from_env() -> bool {
    !std::env::var("NO_COLOR").unwrap_or_default().is_empty()
        || !std::env::var("AQUATHERM_NO_COLOR")
            .unwrap_or_default()
            .is_empty()
        || std::env::var("TERM").unwrap_or_default() == "dumb"
        // log messages go to stderr
        || !stderr().is_terminal()
}

#[derive(Debug, Clone)]
struct ColorConfig {
    colors_enabled: bool,
}

impl ColorConfig {
    fn new(no_color_flag: bool) -> Self {
        let colors_enabled = !no_color_flag && !should_disable_colors_from_env();
        Self { colors_enabled }
    }

    fn is_enabled(&self) -> bool {
        self.colors_enabled
    }
}

/// Initialize the color configuration with the CLI flag state.
/// Call once at startup after parsing CLI arguments.
pub fn init_color_config(no_color_flag: bool) {
    let config = ColorConfig::new(no_color_flag);
    if COLOR_CONFIG.set(config).is_err() {
        log::debug!("Color configuration already initialized");
    }
}

fn colors_enabled() -> bool {
    COLOR_CONFIG
        .get()
        .map(|config| config.is_enabled())
        .unwrap_or_else(|| !should_disable_colors_from_env())
}

/// Apply color to a string only if colors are enabled for stderr output
pub fn maybe_color_stderr<F>(text: &str, color_fn: F) -> String
where
    F: FnOnce(&str) -> ColoredString,
{
    if colors_enabled() {
        color_fn(text).to_string()
    } else {
        text.to_string()
    }
}

/// Colors for log level tags
pub mod colors {
    use super::maybe_color_stderr;
    use colored::Colorize;

    pub fn error_level(text: &str) -> String {
        maybe_color_stderr(text, |s| s.red().bold())
    }

    pub fn warning_level(text: &str) -> String {
        maybe_color_stderr(text, |s| s.yellow())
    }

    pub fn info_level(text: &str) -> String {
        maybe_color_stderr(text, |s| s.green())
    }

    pub fn debug_level(text: &str) -> String {
        maybe_color_stderr(text, |s| s.blue())
    }

    pub fn trace_level(text: &str) -> String {
        maybe_color_stderr(text, |s| s.magenta())
    }
}

/// Semantic symbols for log lines. Plain-text fallbacks when colors are off.
pub mod symbols {
    use super::colors_enabled;

    pub fn analysis_start() -> &'static str {
        if colors_enabled() {
            "🌡️  "
        } else {
            ""
        }
    }

    pub fn model_loaded() -> &'static str {
        if colors_enabled() {
            "✅ "
        } else {
            ""
        }
    }

    pub fn satellite() -> &'static str {
        if colors_enabled() {
            "🛰️  "
        } else {
            ""
        }
    }

    pub fn operation_failed() -> &'static str {
        if colors_enabled() {
            "❌ "
        } else {
            "[FAILED] "
        }
    }

    pub fn system_setup() -> &'static str {
        if colors_enabled() {
            "⚙️ "
        } else {
            ""
        }
    }

    pub fn completed_successfully() -> &'static str {
        if colors_enabled() {
            "✅ "
        } else {
            "[SUCCESS] "
        }
    }

    pub fn warning() -> &'static str {
        if colors_enabled() {
            "⚠️  "
        } else {
            ""
        }
    }
}
