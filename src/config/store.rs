//! External key-value settings store
//!
//! The store is anything that answers single-value and multi-value lookups by
//! string key. In practice it is `git config`, which gives each operator a private
//! override point outside the committed `.grove.toml`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::shell_exec;

/// A lookup against the store failed for a reason other than "key not set".
///
/// Resolution treats these as absent values and logs them; they never abort
/// settings resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub key: String,
    pub message: String,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read {}: {}", self.key, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Read access to an external settings store.
pub trait ConfigStore {
    /// The value for `key`, or `None` if the store does not define it.
    fn get_one(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Every value for a repeated `key`, in store order. Empty if undefined.
    fn get_all(&self, key: &str) -> Result<Vec<String>, StoreError>;
}

/// `git config` as a settings store.
///
/// Reads every scope git merges for the repository (system, global, local).
#[derive(Debug, Clone)]
pub struct GitConfigStore {
    dir: PathBuf,
}

impl GitConfigStore {
    /// Store for the repository containing `dir`.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn query(&self, flag: &str, key: &str) -> Result<Option<String>, StoreError> {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.dir).args(["config", flag, key]);

        let context = self.dir.to_string_lossy();
        let output = shell_exec::run(&mut cmd, Some(&context)).map_err(|e| StoreError {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        if output.status.success() {
            return Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()));
        }
        // `git config` exits 1 when the key is not set
        if output.status.code() == Some(1) {
            return Ok(None);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(StoreError {
            key: key.to_string(),
            message: match output.status.code() {
                Some(code) => format!("git config exited with {code}: {}", stderr.trim()),
                None => format!("git config terminated: {}", stderr.trim()),
            },
        })
    }
}

impl ConfigStore for GitConfigStore {
    fn get_one(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .query("--get", key)?
            .map(|value| value.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn get_all(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .query("--get-all", key)?
            .map(|values| values.lines().map(str::to_string).collect())
            .unwrap_or_default())
    }
}

/// In-memory store, for tests and for callers that assemble overrides in code.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Vec<String>>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every lookup fails, standing in for a broken backend.
    pub fn failing() -> Self {
        Self {
            values: BTreeMap::new(),
            failing: true,
        }
    }

    /// Append a value for `key` (repeat to build a multi-valued key).
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn unset(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError {
                key: key.to_string(),
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl ConfigStore for MemoryStore {
    /// Like `git config --get`, the last value wins for repeated keys.
    fn get_one(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check(key)?;
        Ok(self.values.get(key).and_then(|v| v.last()).cloned())
    }

    fn get_all(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.check(key)?;
        Ok(self.values.get(key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_lookups() {
        let store = MemoryStore::new()
            .with("grove.preserve", ".env")
            .with("grove.preserve", "*.local")
            .with("grove.plain", "true");

        assert_eq!(store.get_one("grove.plain").unwrap().as_deref(), Some("true"));
        assert_eq!(store.get_one("grove.debug").unwrap(), None);
        assert_eq!(
            store.get_all("grove.preserve").unwrap(),
            vec![".env", "*.local"]
        );
        assert_eq!(
            store.get_one("grove.preserve").unwrap().as_deref(),
            Some("*.local")
        );
        assert!(store.get_all("grove.autolock").unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_unset() {
        let mut store = MemoryStore::new().with("grove.debug", "1");
        store.unset("grove.debug");
        assert_eq!(store.get_one("grove.debug").unwrap(), None);
    }

    #[test]
    fn test_failing_store_errors_name_the_key() {
        let store = MemoryStore::failing();
        let err = store.get_one("grove.plain").unwrap_err();
        assert_eq!(err.key, "grove.plain");
        assert_eq!(err.to_string(), "failed to read grove.plain: store unavailable");
        assert!(store.get_all("grove.preserve").is_err());
    }

    #[test]
    fn test_git_store_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = GitConfigStore::at(dir.path().join("missing"));
        assert!(store.get_one("grove.plain").is_err());
        assert!(store.get_all("grove.preserve").is_err());
    }
}
