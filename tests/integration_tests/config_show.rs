use insta::assert_snapshot;
use rstest::rstest;

use crate::common::{TestProject, grove_command, project, stderr, stdout};

#[rstest]
fn test_config_show_defaults(project: TestProject) {
    let output = project.grove(&["config", "show"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_snapshot!(stdout(&output), @r#"
    preserve.patterns = []  (default)
    preserve.exclude  = []  (default)
    autolock.patterns = []  (default)
    plain             = false  (default)
    debug             = false  (default)
    nerd_fonts        = true  (default)
    stale_threshold   = "30d"  (default)
    "#);
}

#[rstest]
fn test_config_show_sources(project: TestProject) {
    project.write_config(
        r#"
plain = false
[preserve]
patterns = [".env"]
"#,
    );
    project.git_config("grove.plain", "true");

    let output = project.grove(&["config", "show"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_snapshot!(stdout(&output), @r#"
    preserve.patterns = [".env"]  (file)
    preserve.exclude  = []  (default)
    autolock.patterns = []  (default)
    plain             = true  (store)
    debug             = false  (default)
    nerd_fonts        = true  (default)
    stale_threshold   = "30d"  (default)
    "#);
}

#[rstest]
fn test_config_show_environment_and_flag(project: TestProject) {
    let output = grove_command()
        .arg("-C")
        .arg(project.root())
        .args(["--plain", "config", "show"])
        .env("GROVE_DEBUG", "1")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let shown = stdout(&output);
    assert!(shown.contains("plain             = true  (override)"), "{shown}");
    assert!(shown.contains("debug             = true  (environment)"), "{shown}");
}

#[rstest]
fn test_config_show_reports_all_violations(project: TestProject) {
    project.write_config(
        r#"
stale_threshold = "-3d"
[preserve]
patterns = ["ok", "[z-a]"]
[hooks]
add = [""]
"#,
    );

    let output = project.grove(&["config", "show"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("3 invalid settings"), "{err}");
    assert!(err.contains("stale_threshold"), "{err}");
    assert!(err.contains("preserve.patterns[1]"), "{err}");
    assert!(err.contains("hooks.add[0]"), "{err}");
}

#[rstest]
fn test_config_show_rejects_malformed_file(project: TestProject) {
    project.write_config("[preserve\npatterns = 1\n");
    let output = project.grove(&["config", "show"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".grove.toml"), "{}", stderr(&output));
}
