//! Boolean parsing for string-valued sources
//!
//! Two parsers on purpose: store values accept the usual spellings of "yes",
//! while the `GROVE_*` environment overrides only accept `1` and `true`.

/// General truthy check for external-store values.
///
/// Trims whitespace and compares case-insensitively against `true`, `1`, `yes`
/// and `on`. Everything else, including an empty string, is false.
pub fn parse_truthy(value: &str) -> bool {
    let value = value.trim();
    ["true", "1", "yes", "on"]
        .iter()
        .any(|truthy| value.eq_ignore_ascii_case(truthy))
}

/// Strict check for environment overrides: `1` or case-insensitive `true`.
///
/// Anything else (including `yes` and `on`) means the variable does not set the
/// override at all.
pub fn parse_env_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
