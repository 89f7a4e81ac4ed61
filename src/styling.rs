//! Terminal styling
//!
//! Built on the anstyle ecosystem: `anstream` strips escapes when the stream is
//! not a terminal (or color is turned off), `anstyle` composes styles, and
//! `color-print` gives the `cformat!` tag syntax used for messages.
//!
//! Status messages go to stderr; stdout is kept for data such as `config show`.

use std::fmt;

use anstyle::{AnsiColor, Color, Style};
use color_print::{cformat, cstr};

pub use anstream::{ColorChoice, eprint, eprintln, print, println, stderr, stdout};

use crate::config::Settings;

/// Hook output prefixes
pub const DIM: Style = Style::new().dimmed();

/// Values coming from a non-default source in `config show`
pub const EMPHASIS: Style = Style::new().bold();

pub const SOURCE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));

pub const SUCCESS_SYMBOL: &str = cstr!("<green>✓</>");
pub const ERROR_SYMBOL: &str = cstr!("<red>✗</>");
pub const WARNING_SYMBOL: &str = cstr!("<yellow>▲</>");
pub const HINT_SYMBOL: &str = cstr!("<dim>↳</>");

/// A message that already carries its symbol and styling.
///
/// Deliberately not `AsRef<str>`, so it cannot be passed back into a message
/// function and styled twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMessage(String);

impl FormattedMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn error_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{ERROR_SYMBOL} <red>{}</>", content.as_ref()))
}

pub fn warning_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{WARNING_SYMBOL} <yellow>{}</>", content.as_ref()))
}

pub fn hint_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{HINT_SYMBOL} <dim>{}</>", content.as_ref()))
}

pub fn success_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{SUCCESS_SYMBOL} <green>{}</>", content.as_ref()))
}

/// Color choice for the resolved settings: plain output never colors.
pub fn color_choice(settings: &Settings) -> ColorChoice {
    if settings.plain() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

/// Apply [`color_choice`] to every `anstream` stream in the process.
pub fn apply_color_choice(settings: &Settings) {
    color_choice(settings).write_global();
}
