//! Discovery of a user-level config file

use std::path::{Path, PathBuf};

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};

use super::file::CONFIG_FILE_NAME;
use crate::path::home_dir;

/// Explicit config path; wins over every other location
pub const CONFIG_PATH_ENV_VAR: &str = "GROVE_CONFIG";

/// Candidate config paths, highest precedence first.
///
/// 1. `$GROVE_CONFIG`
/// 2. `<cwd>/.grove.toml`
/// 3. the platform config directory, e.g. `~/.config/grove/config.toml`
/// 4. `~/.grove.toml`
///
/// Locations the platform cannot provide are skipped.
pub fn search_paths<F>(cwd: &Path, lookup: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let mut paths = Vec::new();

    if let Some(explicit) = lookup(CONFIG_PATH_ENV_VAR).filter(|p| !p.trim().is_empty()) {
        paths.push(PathBuf::from(explicit));
    }

    paths.push(cwd.join(CONFIG_FILE_NAME));

    // XDG on Linux and macOS, %APPDATA% on Windows
    match choose_base_strategy() {
        Ok(strategy) => paths.push(strategy.config_dir().join("grove").join("config.toml")),
        Err(e) => log::debug!("No platform config directory: {e}"),
    }

    if let Some(home) = home_dir() {
        paths.push(home.join(CONFIG_FILE_NAME));
    }

    paths
}

/// The first candidate from [`search_paths`] that exists.
pub fn find_config_path<F>(cwd: &Path, lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    search_paths(cwd, lookup).into_iter().find(|path| {
        let found = path.is_file();
        log::debug!("Config candidate {}: {}", path.display(), if found { "found" } else { "missing" });
        found
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_search_order() {
        let cwd = Path::new("/work/project");
        let paths = search_paths(cwd, |var| {
            (var == CONFIG_PATH_ENV_VAR).then(|| "/etc/grove.toml".to_string())
        });
        assert_eq!(paths[0], PathBuf::from("/etc/grove.toml"));
        assert_eq!(paths[1], cwd.join(".grove.toml"));
        // Platform and home locations follow when the environment provides them
        assert!(paths.len() >= 2);
        if let Some(home) = home_dir() {
            assert_eq!(paths.last(), Some(&home.join(".grove.toml")));
        }
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let cwd = Path::new("/work/project");
        let paths = search_paths(cwd, |_| Some("  ".to_string()));
        assert_eq!(paths[0], cwd.join(".grove.toml"));
    }

    #[test]
    fn test_find_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("custom.toml");
        fs::write(&explicit, "").unwrap();
        fs::write(dir.path().join(".grove.toml"), "").unwrap();

        let found = find_config_path(dir.path(), |_| Some(explicit.display().to_string()));
        assert_eq!(found, Some(explicit));
    }

    #[test]
    fn test_find_skips_missing_candidates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".grove.toml"), "").unwrap();

        let found = find_config_path(dir.path(), |_| {
            Some(dir.path().join("missing.toml").display().to_string())
        });
        assert_eq!(found, Some(dir.path().join(".grove.toml")));
    }

    #[test]
    fn test_find_returns_cwd_file_before_user_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".grove.toml"), "").unwrap();
        assert_eq!(
            find_config_path(dir.path(), no_env),
            Some(dir.path().join(".grove.toml"))
        );
    }
}
