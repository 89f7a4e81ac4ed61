//! Resolution against a real `git config` store

use grove::config::{
    ConfigStore, FileConfig, GitConfigStore, Origin, Project, Setting, Settings, Source,
};
use grove::hooks::HookType;
use rstest::rstest;

use crate::common::{TestProject, project};

#[rstest]
fn test_git_config_overrides_personal_preferences(project: TestProject) {
    project.write_config(
        r#"
plain = false
stale_threshold = "2w"
"#,
    );
    project.git_config("grove.plain", "yes");
    project.git_config("grove.staleThreshold", "12h");

    let settings = Settings::for_project(project.root(), &GitConfigStore::at(project.root())).unwrap();
    assert!(settings.plain());
    assert_eq!(settings.stale_threshold(), "12h");
    assert_eq!(settings.source(Setting::StaleThreshold), Origin::Resolved(Source::Store));
}

#[rstest]
fn test_file_overrides_git_config_for_shared_policy(project: TestProject) {
    project.write_config(
        r#"
[preserve]
patterns = [".env"]
"#,
    );
    project.git_config_add("grove.preserve", "*.local");
    project.git_config_add("grove.preserveExclude", "node_modules");

    let settings = Settings::for_project(project.root(), &GitConfigStore::at(project.root())).unwrap();
    assert_eq!(settings.preserve_patterns(), &[".env".to_string()]);
    // Nothing in the file for exclude, so the store supplies it
    assert_eq!(settings.preserve_exclude_patterns(), &["node_modules".to_string()]);
    assert_eq!(
        settings.source(Setting::PreserveExclude),
        Origin::Resolved(Source::Store)
    );
}

#[rstest]
fn test_multi_valued_keys_keep_order(project: TestProject) {
    project.git_config_add("grove.autolock", "main");
    project.git_config_add("grove.autolock", "release/*");

    let store = GitConfigStore::at(project.root());
    assert_eq!(
        store.get_all("grove.autolock").unwrap(),
        vec!["main".to_string(), "release/*".to_string()]
    );
    assert_eq!(store.get_one("grove.autolock").unwrap().as_deref(), Some("release/*"));
    assert_eq!(store.get_one("grove.missing").unwrap(), None);
    assert!(store.get_all("grove.missing").unwrap().is_empty());

    let settings = Settings::for_project(project.root(), &store).unwrap();
    assert!(settings.should_autolock("release/3.1"));
    assert!(!settings.should_autolock("feature"));
    assert!(!settings.should_autolock("feature/main"));
}

#[rstest]
fn test_reload_from_store_drops_removed_keys(project: TestProject) {
    project.git_config("grove.debug", "true");
    let store = GitConfigStore::at(project.root());
    let mut settings = Settings::for_project(project.root(), &store).unwrap();
    assert!(settings.debug());

    project.git(&["config", "--unset", "grove.debug"]);
    settings.load_from_store(&store);
    assert!(!settings.debug());
}

#[rstest]
fn test_written_config_round_trips(project: TestProject) {
    let mut file = FileConfig::default();
    file.nerd_fonts = Some(false);
    file.hooks.add = vec!["echo one".into(), "echo two".into()];
    file.write(project.root()).unwrap();

    let contents = project.read_config();
    assert!(contents.contains("nerd_fonts = false"), "{contents}");
    assert!(!contents.contains("plain"), "{contents}");

    let loaded = Project::load(project.root(), &GitConfigStore::at(project.root())).unwrap();
    assert!(!loaded.settings().nerd_fonts());
    assert_eq!(loaded.hook_commands(HookType::Add).len(), 2);

    let leftovers: Vec<_> = std::fs::read_dir(project.root())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(".tmp."))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}
