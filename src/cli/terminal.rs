//! Terminal capability detection and utilities

use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Extension trait for colorizing output
///
/// Styling is only applied when `enabled` is true, so callers decide once
/// whether the output stream supports color.
pub trait Colorize {
    /// Color as a classification code (blue)
    fn code_if(&self, enabled: bool) -> String;
    /// Color as a heading (green)
    fn heading_if(&self, enabled: bool) -> String;
    /// Dim the text
    fn dim_if(&self, enabled: bool) -> String;
}

impl Colorize for str {
    fn code_if(&self, enabled: bool) -> String {
        if enabled {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn heading_if(&self, enabled: bool) -> String {
        if enabled {
            self.fg::<css::Green>().bold().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim_if(&self, enabled: bool) -> String {
        if enabled {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}
