//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

/// Check mark for satisfied requirements
pub const CHECK: &str = "✓";

/// Cross for failed requirements
pub const CROSS: &str = "✗";

/// Semantic colors for CLI output
pub trait Stylize: Display + Sized {
    /// Secondary, low-importance text
    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    /// Headings and key values
    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    /// Names and identifiers
    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    /// Subtle marker (collaborator logins)
    fn slanted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.italic())
            .to_string()
    }

    /// Positive outcome
    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    /// Something needs attention
    fn warn(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string()
    }

    /// Negative outcome
    fn failure(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.red())
            .to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Green check or red cross depending on `ok`
pub fn icon(ok: bool) -> String {
    if ok {
        CHECK.success()
    } else {
        CROSS.failure()
    }
}

/// Spinner style used while waiting on GitHub
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Render `text` as a terminal hyperlink to `url` where supported
pub fn hyperlink(text: &str, url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(text, url).to_string()
    } else {
        format!("{text} ({url})")
    }
}
