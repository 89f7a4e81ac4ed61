use grove::config::{FileConfig, Settings};
use rstest::rstest;

use crate::common::{TestProject, grove_command, project, stderr, stdout};

#[rstest]
fn test_config_init_creates_template(project: TestProject) {
    let output = project.grove(&["config", "init"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Created"), "{}", stderr(&output));

    let contents = project.read_config();
    assert!(contents.starts_with("# grove project configuration"));

    // Everything in the template is commented out
    let file = FileConfig::load(project.root()).unwrap();
    assert_eq!(file, FileConfig::default());
    let settings = Settings::resolve(&file, &grove::config::MemoryStore::new());
    assert_eq!(settings, Settings::default());
}

#[rstest]
fn test_config_init_keeps_existing_file(project: TestProject) {
    project.write_config("plain = true\n");

    let output = project.grove(&["config", "init"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("already exists"), "{}", stderr(&output));
    assert_eq!(project.read_config(), "plain = true\n");

    let output = project.grove(&["config", "init", "--force"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(project.read_config().starts_with("# grove project configuration"));
}

#[rstest]
fn test_config_path_marks_active_file(project: TestProject) {
    let explicit = project.temp_dir().join("explicit.toml");
    std::fs::write(&explicit, "").unwrap();
    project.write_config("");

    let output = grove_command()
        .arg("-C")
        .arg(project.root())
        .args(["config", "path"])
        .env("GROVE_CONFIG", &explicit)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert!(lines[0].ends_with("(active)"), "{lines:?}");
    assert!(lines[0].contains("explicit.toml"), "{lines:?}");
    assert!(lines[1].contains(".grove.toml"), "{lines:?}");
    assert!(lines[1].ends_with("(shadowed)"), "{lines:?}");
}
