//! Validation of resolved settings
//!
//! Validation never stops at the first problem. Every group is checked and all
//! violations are returned together in one [`ConfigError::Invalid`].

use std::time::Duration;

use super::patterns::{BranchPatterns, PatternSet};
use super::precedence::Setting;
use super::{ConfigError, FileConfig, Settings, Violation};
use crate::hooks::HookType;

/// Parse a stale threshold such as `30d`, `2w` or `12h`.
///
/// The threshold must be a positive duration.
pub fn parse_stale_threshold(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err(format!("{value:?} cannot be negative"));
    }
    let duration = humantime::parse_duration(value)
        .map_err(|e| format!("{value:?} is not a duration ({e}); use e.g. \"30d\" or \"2w\""))?;
    if duration.is_zero() {
        return Err(format!("{value:?} must be greater than zero"));
    }
    Ok(duration)
}

/// Check resolved values. Empty means valid.
pub fn validate_settings(settings: &Settings) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Err(reason) = parse_stale_threshold(settings.stale_threshold()) {
        violations.push(Violation::new(Setting::StaleThreshold.file_key(), reason));
    }

    for (setting, patterns) in [
        (Setting::Preserve, settings.preserve_patterns()),
        (Setting::PreserveExclude, settings.preserve_exclude_patterns()),
    ] {
        if let Err(mut found) = PatternSet::compile(setting.file_key(), patterns) {
            violations.append(&mut found);
        }
    }
    if let Err(mut found) =
        BranchPatterns::compile(Setting::Autolock.file_key(), settings.autolock_patterns())
    {
        violations.append(&mut found);
    }

    violations
}

/// Check hook command lists. Empty means valid.
pub fn validate_hooks(file: &FileConfig) -> Vec<Violation> {
    let mut violations = Vec::new();
    for hook in [HookType::Add, HookType::Create] {
        for (i, command) in file.hooks(hook).iter().enumerate() {
            if command.trim().is_empty() {
                violations.push(Violation::new(
                    format!("hooks.{hook}[{i}]"),
                    "command is empty",
                ));
            }
        }
    }
    violations
}

/// Collect every violation for a project into one result.
pub fn validate(settings: &Settings, file: &FileConfig) -> Result<(), ConfigError> {
    let mut violations = validate_settings(settings);
    violations.extend(validate_hooks(file));
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(violations))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::config::file::HooksSection;

    #[rstest]
    #[case::days("30d", 30 * 24 * 3600)]
    #[case::weeks("2w", 14 * 24 * 3600)]
    #[case::hours("12h", 12 * 3600)]
    #[case::padded(" 1d ", 24 * 3600)]
    fn test_parse_stale_threshold(#[case] input: &str, #[case] seconds: u64) {
        assert_eq!(
            parse_stale_threshold(input).unwrap(),
            Duration::from_secs(seconds)
        );
    }

    #[rstest]
    #[case::negative("-5d", "cannot be negative")]
    #[case::zero("0d", "greater than zero")]
    #[case::garbage("soon", "not a duration")]
    #[case::no_unit("30", "not a duration")]
    fn test_parse_stale_threshold_rejects(#[case] input: &str, #[case] reason: &str) {
        let err = parse_stale_threshold(input).unwrap_err();
        assert!(err.contains(reason), "{input}: {err}");
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_empty());
        assert!(validate(&Settings::default(), &FileConfig::default()).is_ok());
    }

    #[test]
    fn test_all_violations_are_collected() {
        let mut settings = Settings::default();
        settings.set_stale_threshold("-1d");
        settings.set_preserve_patterns(vec!["[z-a]".into()]);
        settings.set_autolock_patterns(vec!["main".into(), "".into()]);
        let file = FileConfig {
            hooks: HooksSection {
                add: vec!["echo ok".into(), " ".into()],
                create: vec![],
            },
            ..Default::default()
        };

        let err = validate(&settings, &file).unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "stale_threshold",
                "preserve.patterns[0]",
                "autolock.patterns[1]",
                "hooks.add[1]",
            ]
        );
    }
}
