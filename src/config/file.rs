//! Project-level declarative configuration (`.grove.toml`)
//!
//! This file lives at the project root and is usually checked into git. It holds
//! shareable policy (preserve and autolock patterns, lifecycle hooks) and may also
//! carry personal preferences, which the git config store can override per operator.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::hooks::HookType;

/// Name of the declarative config file at the project root
pub const CONFIG_FILE_NAME: &str = ".grove.toml";

/// Annotated starter config written by `grove config init`.
///
/// Everything is commented out so a fresh file resolves exactly like no file.
const TEMPLATE: &str = r#"# grove project configuration
#
# Shared settings in this file are meant to be committed. Personal preferences
# (plain, debug, nerd_fonts, stale_threshold) can be overridden per machine with
# `git config grove.<key> <value>`, which takes precedence over this file.

# Disable colors and icons
# plain = false

# Log debug output
# debug = false

# Use Nerd Font glyphs for status icons
# nerd_fonts = true

# Worktrees untouched for longer than this are reported as stale
# stale_threshold = "30d"

[preserve]
# Ignored files copied into new worktrees (gitignore-style globs)
# patterns = [".env", ".env.*"]
# Paths never copied, even when matched above
# exclude = ["node_modules"]

[hooks]
# Run in a new worktree after `grove add`, stopping at the first failure
# add = ["npm install"]
# Run after `grove create`
# create = []

[autolock]
# Branches whose worktrees are locked on creation, matched on the full name
# patterns = ["main", "release/*"]
"#;

/// `[preserve]` section
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PreserveSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl PreserveSection {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.exclude.is_empty()
    }
}

/// `[hooks]` section. Order within each list is execution order.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct HooksSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<String>,
}

impl HooksSection {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.create.is_empty()
    }
}

/// `[autolock]` section
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AutolockSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
}

impl AutolockSection {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Parsed `.grove.toml`.
///
/// Boolean preferences are tri-state: `None` means the file does not mention the
/// key, which is different from an explicit `false`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nerd_fonts: Option<bool>,

    /// Empty means unset
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stale_threshold: String,

    #[serde(default, skip_serializing_if = "PreserveSection::is_empty")]
    pub preserve: PreserveSection,

    #[serde(default, skip_serializing_if = "HooksSection::is_empty")]
    pub hooks: HooksSection,

    #[serde(default, skip_serializing_if = "AutolockSection::is_empty")]
    pub autolock: AutolockSection,

    /// Captures unknown top-level keys for warnings
    #[serde(flatten, default, skip_serializing)]
    pub(crate) unknown: HashMap<String, toml::Value>,
}

/// Path of the declarative config file for a project directory.
pub fn config_file_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

impl FileConfig {
    /// Load `.grove.toml` from `dir`.
    ///
    /// A missing file yields the default config. A file that exists but does not
    /// parse is an error, and no part of it is returned.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = config_file_path(dir);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No {} in {}", CONFIG_FILE_NAME, dir.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::io(&path, e)),
        };

        let config = Self::parse(&contents).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let keys = config.unknown_keys();
        if !keys.is_empty() {
            log::warn!(
                "{}: ignoring unknown key(s): {}",
                path.display(),
                keys.join(", ")
            );
        }

        Ok(config)
    }

    /// Parse config contents without touching the filesystem.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Whether `dir` has a `.grove.toml`, regardless of whether it parses.
    pub fn exists(dir: &Path) -> bool {
        config_file_path(dir).exists()
    }

    /// Persist this config to `dir/.grove.toml` atomically.
    ///
    /// The contents go to a temporary sibling file first, which is renamed over the
    /// target. Readers see either the old file or the new one, never a partial write.
    pub fn write(&self, dir: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        write_atomic(&config_file_path(dir), contents.as_bytes())
    }

    /// Write the annotated starter template to `dir/.grove.toml`.
    ///
    /// Not atomic: only used to initialize a fresh file.
    pub fn write_template(dir: &Path) -> Result<(), ConfigError> {
        let path = config_file_path(dir);
        fs::write(&path, TEMPLATE).map_err(|e| ConfigError::io(&path, e))
    }

    /// Serialize to TOML with one array element per line.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let encoded = toml::to_string(self).map_err(|e| ConfigError::Encode {
            message: e.to_string(),
        })?;
        let mut doc: toml_edit::DocumentMut =
            encoded.parse().map_err(|e: toml_edit::TomlError| ConfigError::Encode {
                message: e.to_string(),
            })?;
        format_arrays_multiline(doc.as_table_mut());
        Ok(doc.to_string())
    }

    /// Commands configured for a hook, in execution order.
    pub fn hooks(&self, hook: HookType) -> &[String] {
        match hook {
            HookType::Add => &self.hooks.add,
            HookType::Create => &self.hooks.create,
        }
    }

    /// Top-level keys in the file that grove does not recognize.
    pub fn unknown_keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.unknown.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Find unknown top-level keys in config contents.
///
/// Returns an empty list for content that does not parse; the parse error itself is
/// reported by [`FileConfig::load`].
pub fn find_unknown_keys(contents: &str) -> Vec<String> {
    let Ok(config) = FileConfig::parse(contents) else {
        return vec![];
    };
    let mut keys: Vec<_> = config.unknown.into_keys().collect();
    keys.sort_unstable();
    keys
}

/// Put each array element on its own line, recursing into sub-tables.
fn format_arrays_multiline(table: &mut toml_edit::Table) {
    for (_, item) in table.iter_mut() {
        if let Some(array) = item.as_array_mut() {
            if array.is_empty() {
                continue;
            }
            for value in array.iter_mut() {
                value.decor_mut().set_prefix("\n    ");
            }
            array.set_trailing("\n");
            array.set_trailing_comma(true);
        } else if let Some(sub) = item.as_table_mut() {
            format_arrays_multiline(sub);
        }
    }
}

/// Temporary sibling path, unique per process and instant.
fn temp_path_for(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    path.with_file_name(format!(
        "{file_name}.tmp.{}.{nanos}",
        std::process::id()
    ))
}

/// Write `contents` to `path` through a temporary file and a rename.
///
/// Once the temporary file exists, any failure removes it before returning.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    write_atomic_with(path, |file| file.write_all(contents))
}

/// Create the temp file, let `fill` write it, then rename it over `path`.
///
/// On any failure the temp file is removed and `path` is left as it was.
fn write_atomic_with<F>(path: &Path, fill: F) -> Result<(), ConfigError>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let tmp_path = temp_path_for(path);
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|e| ConfigError::io(&tmp_path, e))?;

    let finish = || -> io::Result<()> {
        let mut file = file;
        fill(&mut file)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, path)
    };

    if let Err(e) = finish() {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            log::debug!(
                "Failed to remove temporary file {}: {cleanup}",
                tmp_path.display()
            );
        }
        return Err(ConfigError::io(path, e));
    }

    log::debug!("Wrote {}", path.display());
    Ok(())
}
