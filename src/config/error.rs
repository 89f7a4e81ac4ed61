//! Configuration error types
//!
//! Like the git errors elsewhere in this codebase, these are plain enums with a
//! hand-written `Display`, so callers can pattern-match on them and convert to
//! `anyhow::Error` at the CLI boundary without losing the type.

use std::fmt;
use std::path::PathBuf;

use crate::path::format_path_for_display;

/// A single problem found while validating resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted field name as it appears in `.grove.toml` (e.g. `preserve.patterns[1]`)
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors surfaced by the declarative config file and settings validation.
///
/// Absence of the file is never an error; a missing file loads as the default config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file exists but is not valid TOML (or has the wrong shape)
    Parse { path: PathBuf, message: String },
    /// Reading, writing or renaming failed
    Io { path: PathBuf, message: String },
    /// Serializing the config failed
    Encode { message: String },
    /// Every validation problem across all setting groups
    Invalid(Vec<Violation>),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        ConfigError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// The violations carried by an `Invalid` error, empty for other variants.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ConfigError::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { path, message } => write!(
                f,
                "Failed to parse {}: {}",
                format_path_for_display(path),
                message.trim_end()
            ),
            ConfigError::Io { path, message } => {
                write!(f, "{}: {}", format_path_for_display(path), message)
            }
            ConfigError::Encode { message } => write!(f, "Failed to serialize config: {message}"),
            ConfigError::Invalid(violations) => {
                let plural = if violations.len() == 1 { "" } else { "s" };
                write!(f, "{} invalid setting{plural}:", violations.len())?;
                for violation in violations {
                    write!(f, "\n  {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
