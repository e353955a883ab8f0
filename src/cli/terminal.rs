//! Terminal capability detection and output helpers.

use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Extension trait for colorizing summary output.
pub trait Colorize {
    /// Color as success (green).
    fn success(&self) -> String;
    /// Color as warning (amber).
    fn warning(&self) -> String;
    /// Dim the text.
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}
