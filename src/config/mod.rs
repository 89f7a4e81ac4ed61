//! Settings resolution for grove
//!
//! Settings come from three layers:
//!
//! # Project file (`<project>/.grove.toml`)
//!
//! Checked into the repository and shared by everyone working on it. Holds the
//! preserve and autolock patterns, hook commands, and optionally defaults for
//! the personal preferences.
//!
//! # External store (`git config`)
//!
//! Per-operator values under the `grove.` section, e.g. `git config grove.plain true`.
//!
//! # Compiled-in defaults
//!
//! Used for anything neither layer sets.
//!
//! Which layer wins depends on the setting; see [`precedence`]. The result is a
//! [`Settings`] value that callers pass around explicitly. Environment variables
//! (`GROVE_PLAIN`, `GROVE_DEBUG`) and command-line flags are applied on top.

mod error;
pub mod file;
pub mod paths;
pub mod patterns;
pub mod precedence;
mod project;
mod settings;
pub mod store;
mod truthy;
pub mod validation;

pub use error::{ConfigError, Violation};
pub use file::{CONFIG_FILE_NAME, FileConfig};
pub use paths::{CONFIG_PATH_ENV_VAR, find_config_path, search_paths};
pub use patterns::{BranchPatterns, PatternSet, PreserveMatcher};
pub use precedence::{Resolved, Resolver, Setting, SettingClass, SettingValue, Source};
pub use project::Project;
pub use settings::{DEBUG_ENV_VAR, Origin, PLAIN_ENV_VAR, Settings, Snapshot};
pub use store::{ConfigStore, GitConfigStore, MemoryStore, StoreError};
pub use truthy::{parse_env_bool, parse_truthy};
