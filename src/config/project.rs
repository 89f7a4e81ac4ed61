//! A project directory with its declarative file and resolved settings

use std::path::{Path, PathBuf};

use super::store::ConfigStore;
use super::validation::validate;
use super::{ConfigError, FileConfig, Settings};
use crate::hooks::HookType;

/// Everything grove knows about one project directory.
///
/// Loading takes the directory explicitly, so two projects can be open in the
/// same process without interfering.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    file: FileConfig,
    settings: Settings,
}

impl Project {
    /// Load `.grove.toml` from `root`, resolve settings against `store`, validate.
    ///
    /// A missing file is fine; a malformed file or any invalid value is an error
    /// and no partially loaded project is returned.
    pub fn load(root: &Path, store: &dyn ConfigStore) -> Result<Self, ConfigError> {
        let file = FileConfig::load(root)?;
        let settings = Settings::resolve(&file, store);
        validate(&settings, &file)?;
        Ok(Self {
            root: root.to_path_buf(),
            file,
            settings,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file(&self) -> &FileConfig {
        &self.file
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Commands declared for `hook`, in execution order.
    pub fn hook_commands(&self, hook: HookType) -> &[String] {
        self.file.hooks(hook)
    }
}
