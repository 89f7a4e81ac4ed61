//! Per-setting precedence between `.grove.toml`, the external store and defaults
//!
//! Precedence is not uniform. Shared project policy is meant to be committed, so
//! the file wins over the store. Personal preferences belong to the operator, so
//! the store wins over the file even when the file is checked in:
//!
//! | Setting                                   | Order                     |
//! |-------------------------------------------|---------------------------|
//! | preserve, preserve exclude, autolock      | file → store → default    |
//! | plain, debug, nerd fonts, stale threshold | store → file → default    |
//!
//! The table lives in [`Setting::precedence`]; [`Resolver::resolve`] is the only
//! place that walks it.

use std::fmt;

use strum::EnumIter;

use super::FileConfig;
use super::store::{ConfigStore, StoreError};
use super::truthy::parse_truthy;

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    /// `.grove.toml`
    File,
    /// The external store (`git config`)
    Store,
    /// Compiled-in default
    Default,
}

/// Whether a setting is team policy or a personal preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingClass {
    SharedPolicy,
    PersonalPreference,
}

const SHARED_POLICY_ORDER: &[Source] = &[Source::File, Source::Store, Source::Default];
const PERSONAL_PREFERENCE_ORDER: &[Source] = &[Source::Store, Source::File, Source::Default];

/// Default stale threshold
pub const DEFAULT_STALE_THRESHOLD: &str = "30d";

/// Every setting resolved from layered sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Setting {
    Preserve,
    PreserveExclude,
    Autolock,
    Plain,
    Debug,
    NerdFonts,
    StaleThreshold,
}

/// The shape of a setting's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Tri-state in sources, plain bool once resolved
    Flag,
    /// Non-blank string
    Text,
    /// Non-empty list; never merged across sources
    List,
}

/// A resolved value of any kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Flag(value) => write!(f, "{value}"),
            SettingValue::Text(value) => write!(f, "{value:?}"),
            SettingValue::List(values) => {
                let quoted: Vec<_> = values.iter().map(|v| format!("{v:?}")).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
        }
    }
}

impl Setting {
    pub const fn class(self) -> SettingClass {
        match self {
            Setting::Preserve | Setting::PreserveExclude | Setting::Autolock => {
                SettingClass::SharedPolicy
            }
            Setting::Plain | Setting::Debug | Setting::NerdFonts | Setting::StaleThreshold => {
                SettingClass::PersonalPreference
            }
        }
    }

    /// Sources to consult, highest precedence first.
    pub const fn precedence(self) -> &'static [Source] {
        match self.class() {
            SettingClass::SharedPolicy => SHARED_POLICY_ORDER,
            SettingClass::PersonalPreference => PERSONAL_PREFERENCE_ORDER,
        }
    }

    pub const fn kind(self) -> ValueKind {
        match self {
            Setting::Preserve | Setting::PreserveExclude | Setting::Autolock => ValueKind::List,
            Setting::Plain | Setting::Debug | Setting::NerdFonts => ValueKind::Flag,
            Setting::StaleThreshold => ValueKind::Text,
        }
    }

    /// Key in the external store
    pub const fn store_key(self) -> &'static str {
        match self {
            Setting::Preserve => "grove.preserve",
            Setting::PreserveExclude => "grove.preserveExclude",
            Setting::Autolock => "grove.autolock",
            Setting::Plain => "grove.plain",
            Setting::Debug => "grove.debug",
            Setting::NerdFonts => "grove.nerdFonts",
            Setting::StaleThreshold => "grove.staleThreshold",
        }
    }

    /// Dotted key in `.grove.toml`
    pub const fn file_key(self) -> &'static str {
        match self {
            Setting::Preserve => "preserve.patterns",
            Setting::PreserveExclude => "preserve.exclude",
            Setting::Autolock => "autolock.patterns",
            Setting::Plain => "plain",
            Setting::Debug => "debug",
            Setting::NerdFonts => "nerd_fonts",
            Setting::StaleThreshold => "stale_threshold",
        }
    }

    pub fn default_value(self) -> SettingValue {
        match self {
            Setting::Preserve | Setting::PreserveExclude | Setting::Autolock => {
                SettingValue::List(Vec::new())
            }
            Setting::Plain | Setting::Debug => SettingValue::Flag(false),
            Setting::NerdFonts => SettingValue::Flag(true),
            Setting::StaleThreshold => SettingValue::Text(DEFAULT_STALE_THRESHOLD.to_string()),
        }
    }

    /// The value `file` sets for this setting, if it sets one.
    ///
    /// Presence rules: a flag is present when the key is written at all (even as
    /// `false`), text when non-blank, a list when non-empty.
    pub fn file_value(self, file: &FileConfig) -> Option<SettingValue> {
        match self {
            Setting::Preserve => non_empty_list(&file.preserve.patterns),
            Setting::PreserveExclude => non_empty_list(&file.preserve.exclude),
            Setting::Autolock => non_empty_list(&file.autolock.patterns),
            Setting::Plain => file.plain.map(SettingValue::Flag),
            Setting::Debug => file.debug.map(SettingValue::Flag),
            Setting::NerdFonts => file.nerd_fonts.map(SettingValue::Flag),
            Setting::StaleThreshold => non_blank_text(&file.stale_threshold),
        }
    }

    /// The value `store` holds for this setting, if it holds one.
    ///
    /// Store flags are strings, read with the general truthy parser.
    pub fn store_value(self, store: &dyn ConfigStore) -> Result<Option<SettingValue>, StoreError> {
        let key = self.store_key();
        Ok(match self.kind() {
            ValueKind::Flag => store
                .get_one(key)?
                .map(|raw| SettingValue::Flag(parse_truthy(&raw))),
            ValueKind::Text => store.get_one(key)?.and_then(|raw| non_blank_text(&raw)),
            ValueKind::List => non_empty_list(&store.get_all(key)?),
        })
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_key())
    }
}

fn non_empty_list(values: &[String]) -> Option<SettingValue> {
    (!values.is_empty()).then(|| SettingValue::List(values.to_vec()))
}

fn non_blank_text(value: &str) -> Option<SettingValue> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| SettingValue::Text(trimmed.to_string()))
}

/// A value plus the source that supplied it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

/// Resolves settings for one project from its file and store.
pub struct Resolver<'a> {
    file: &'a FileConfig,
    store: &'a dyn ConfigStore,
}

impl<'a> Resolver<'a> {
    pub fn new(file: &'a FileConfig, store: &'a dyn ConfigStore) -> Self {
        Self { file, store }
    }

    /// Walk the setting's precedence order and return the first value present.
    ///
    /// A store failure counts as absence: it is logged and the walk continues.
    pub fn resolve(&self, setting: Setting) -> Resolved<SettingValue> {
        for &source in setting.precedence() {
            let found = match source {
                Source::File => setting.file_value(self.file),
                Source::Store => match setting.store_value(self.store) {
                    Ok(value) => value,
                    Err(e) => {
                        log::warn!("Ignoring external setting for {setting}: {e}");
                        None
                    }
                },
                Source::Default => Some(setting.default_value()),
            };
            if let Some(value) = found {
                log::debug!("{setting} = {value} (from {source})");
                return Resolved { value, source };
            }
        }
        Resolved {
            value: setting.default_value(),
            source: Source::Default,
        }
    }
}
