//! Effective settings for a running command
//!
//! `Settings` is an explicit value: it is built once per project by the resolver,
//! adjusted by environment variables and command-line flags, and then passed by
//! reference to everything that needs it. Temporary changes are scoped with
//! [`Settings::save_snapshot`] / [`Settings::restore_snapshot`] rather than with
//! shared mutable state.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use strum::IntoEnumIterator;

use super::patterns::{BranchPatterns, PatternSet, PreserveMatcher};
use super::precedence::{DEFAULT_STALE_THRESHOLD, Resolver, Setting, SettingValue, Source};
use super::store::ConfigStore;
use super::truthy::parse_env_bool;
use super::validation::{parse_stale_threshold, validate_settings};
use super::{ConfigError, FileConfig, Project, Violation};

/// Forces plain output when set to `1` or `true`
pub const PLAIN_ENV_VAR: &str = "GROVE_PLAIN";

/// Enables debug logging when set to `1` or `true`
pub const DEBUG_ENV_VAR: &str = "GROVE_DEBUG";

/// Where a value in [`Settings`] came from, including post-resolution overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Resolved from `.grove.toml`, the store or the defaults
    Resolved(Source),
    /// `GROVE_PLAIN` / `GROVE_DEBUG`
    Environment,
    /// Set in code, typically from a command-line flag
    Override,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Resolved(source) => write!(f, "{source}"),
            Origin::Environment => f.write_str("environment"),
            Origin::Override => f.write_str("override"),
        }
    }
}

impl Default for Origin {
    fn default() -> Self {
        Origin::Resolved(Source::Default)
    }
}

/// Effective settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    plain: bool,
    debug: bool,
    nerd_fonts: bool,
    stale_threshold: String,
    preserve_patterns: Vec<String>,
    preserve_exclude_patterns: Vec<String>,
    autolock_patterns: Vec<String>,
    origins: HashMap<Setting, Origin>,
}

impl Default for Settings {
    /// Compiled-in defaults.
    fn default() -> Self {
        Self {
            plain: false,
            debug: false,
            nerd_fonts: true,
            stale_threshold: DEFAULT_STALE_THRESHOLD.to_string(),
            preserve_patterns: Vec::new(),
            preserve_exclude_patterns: Vec::new(),
            autolock_patterns: Vec::new(),
            origins: Setting::iter().map(|s| (s, Origin::default())).collect(),
        }
    }
}

/// An owned copy of [`Settings`] taken at a point in time.
///
/// Nothing is shared with the live settings, so later mutation never shows up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Settings);

impl Snapshot {
    pub fn settings(&self) -> &Settings {
        &self.0
    }
}

impl Settings {
    /// Resolve every setting from a project's file and store.
    ///
    /// Does not validate; see [`Settings::validate`].
    pub fn resolve(file: &FileConfig, store: &dyn ConfigStore) -> Self {
        let resolver = Resolver::new(file, store);
        let mut settings = Self::default();
        for setting in Setting::iter() {
            let resolved = resolver.resolve(setting);
            settings.apply(setting, resolved.value, Origin::Resolved(resolved.source));
        }
        settings
    }

    /// Load, resolve and validate the settings for the project in `dir`.
    pub fn for_project(dir: &Path, store: &dyn ConfigStore) -> Result<Self, ConfigError> {
        Project::load(dir, store).map(Project::into_settings)
    }

    /// Repopulate every store-backed setting from `store` alone.
    ///
    /// Keys the store does not define go back to their compiled default, so an
    /// override that has since been removed does not linger.
    pub fn load_from_store(&mut self, store: &dyn ConfigStore) {
        for setting in Setting::iter() {
            match setting.store_value(store) {
                Ok(Some(value)) => self.apply(setting, value, Origin::Resolved(Source::Store)),
                Ok(None) => self.reset(setting),
                Err(e) => {
                    log::warn!("Ignoring external setting for {setting}: {e}");
                    self.reset(setting);
                }
            }
        }
    }

    /// Apply `GROVE_PLAIN` / `GROVE_DEBUG` read through `lookup`.
    ///
    /// Only `1` or `true` (any case) turn an override on; any other value leaves
    /// the current setting alone.
    pub fn load_from_environment<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, setting) in [(PLAIN_ENV_VAR, Setting::Plain), (DEBUG_ENV_VAR, Setting::Debug)] {
            if lookup(var).is_some_and(|value| parse_env_bool(&value)) {
                log::debug!("{var} enables {setting}");
                self.apply(setting, SettingValue::Flag(true), Origin::Environment);
            }
        }
    }

    /// [`Settings::load_from_environment`] against the process environment.
    pub fn load_from_process_environment(&mut self) {
        self.load_from_environment(|var| std::env::var(var).ok());
    }

    pub fn save_snapshot(&self) -> Snapshot {
        Snapshot(self.clone())
    }

    pub fn restore_snapshot(&mut self, snapshot: Snapshot) {
        *self = snapshot.0;
    }

    /// Run `f` with mutable access, then put every setting back as it was.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let snapshot = self.save_snapshot();
        let result = f(self);
        self.restore_snapshot(snapshot);
        result
    }

    /// All problems with the current values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let violations = validate_settings(self);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(violations))
        }
    }

    // ---- Accessors ----

    pub fn plain(&self) -> bool {
        self.plain
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Nerd Font icons, always off in plain mode.
    pub fn nerd_fonts(&self) -> bool {
        self.nerd_fonts && !self.plain
    }

    pub fn stale_threshold(&self) -> &str {
        &self.stale_threshold
    }

    /// The stale threshold as a duration.
    ///
    /// An unparsable value (which validation reports) falls back to the default.
    pub fn stale_threshold_duration(&self) -> Duration {
        parse_stale_threshold(&self.stale_threshold).unwrap_or_else(|reason| {
            log::warn!("Invalid stale_threshold {reason}; using {DEFAULT_STALE_THRESHOLD}");
            humantime::parse_duration(DEFAULT_STALE_THRESHOLD)
                .unwrap_or(Duration::from_secs(30 * 24 * 60 * 60))
        })
    }

    pub fn preserve_patterns(&self) -> &[String] {
        &self.preserve_patterns
    }

    pub fn preserve_exclude_patterns(&self) -> &[String] {
        &self.preserve_exclude_patterns
    }

    pub fn autolock_patterns(&self) -> &[String] {
        &self.autolock_patterns
    }

    /// Where the current value of `setting` came from.
    pub fn source(&self, setting: Setting) -> Origin {
        self.origins.get(&setting).copied().unwrap_or_default()
    }

    /// The current value of `setting`, for display.
    pub fn value(&self, setting: Setting) -> SettingValue {
        match setting {
            Setting::Preserve => SettingValue::List(self.preserve_patterns.clone()),
            Setting::PreserveExclude => SettingValue::List(self.preserve_exclude_patterns.clone()),
            Setting::Autolock => SettingValue::List(self.autolock_patterns.clone()),
            Setting::Plain => SettingValue::Flag(self.plain),
            Setting::Debug => SettingValue::Flag(self.debug),
            Setting::NerdFonts => SettingValue::Flag(self.nerd_fonts),
            Setting::StaleThreshold => SettingValue::Text(self.stale_threshold.clone()),
        }
    }

    /// Compile preserve and preserve-exclude patterns.
    pub fn preserve_matcher(&self) -> Result<PreserveMatcher, ConfigError> {
        let include = PatternSet::compile(
            Setting::Preserve.file_key(),
            &self.preserve_patterns,
        );
        let exclude = PatternSet::compile(
            Setting::PreserveExclude.file_key(),
            &self.preserve_exclude_patterns,
        );
        match (include, exclude) {
            (Ok(include), Ok(exclude)) => Ok(PreserveMatcher::new(include, exclude)),
            (include, exclude) => {
                let violations: Vec<Violation> = include
                    .err()
                    .into_iter()
                    .chain(exclude.err())
                    .flatten()
                    .collect();
                Err(ConfigError::Invalid(violations))
            }
        }
    }

    /// Whether a new worktree for `branch` should be locked.
    ///
    /// Patterns match the whole branch name.
    pub fn should_autolock(&self, branch: &str) -> bool {
        match BranchPatterns::compile(Setting::Autolock.file_key(), &self.autolock_patterns) {
            Ok(patterns) => patterns.is_match(branch),
            Err(violations) => {
                for violation in violations {
                    log::warn!("Ignoring autolock patterns: {violation}");
                }
                false
            }
        }
    }

    // ---- Overrides ----

    pub fn set_plain(&mut self, plain: bool) {
        self.apply(Setting::Plain, SettingValue::Flag(plain), Origin::Override);
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.apply(Setting::Debug, SettingValue::Flag(debug), Origin::Override);
    }

    pub fn set_nerd_fonts(&mut self, nerd_fonts: bool) {
        self.apply(Setting::NerdFonts, SettingValue::Flag(nerd_fonts), Origin::Override);
    }

    pub fn set_stale_threshold(&mut self, threshold: impl Into<String>) {
        self.apply(
            Setting::StaleThreshold,
            SettingValue::Text(threshold.into()),
            Origin::Override,
        );
    }

    pub fn set_preserve_patterns(&mut self, patterns: Vec<String>) {
        self.apply(Setting::Preserve, SettingValue::List(patterns), Origin::Override);
    }

    pub fn set_preserve_exclude_patterns(&mut self, patterns: Vec<String>) {
        self.apply(Setting::PreserveExclude, SettingValue::List(patterns), Origin::Override);
    }

    pub fn set_autolock_patterns(&mut self, patterns: Vec<String>) {
        self.apply(Setting::Autolock, SettingValue::List(patterns), Origin::Override);
    }

    fn reset(&mut self, setting: Setting) {
        self.apply(setting, setting.default_value(), Origin::default());
    }

    fn apply(&mut self, setting: Setting, value: SettingValue, origin: Origin) {
        match (setting, value) {
            (Setting::Preserve, SettingValue::List(v)) => self.preserve_patterns = v,
            (Setting::PreserveExclude, SettingValue::List(v)) => {
                self.preserve_exclude_patterns = v
            }
            (Setting::Autolock, SettingValue::List(v)) => self.autolock_patterns = v,
            (Setting::Plain, SettingValue::Flag(v)) => self.plain = v,
            (Setting::Debug, SettingValue::Flag(v)) => self.debug = v,
            (Setting::NerdFonts, SettingValue::Flag(v)) => self.nerd_fonts = v,
            (Setting::StaleThreshold, SettingValue::Text(v)) => self.stale_threshold = v,
            (setting, value) => {
                log::warn!("Ignoring {value} for {setting}: expected a {:?}", setting.kind());
                return;
            }
        }
        self.origins.insert(setting, origin);
    }
}
