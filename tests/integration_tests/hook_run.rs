use rstest::rstest;

use crate::common::{TestProject, project, stderr, stdout};

#[rstest]
fn test_hook_run_buffered_success(project: TestProject) {
    project.write_config(
        r#"
[hooks]
add = ["echo first > first.txt", "echo second"]
"#,
    );

    let output = project.grove(&["hook", "run", "add"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Ran 2 add hook command(s)"), "{}", stderr(&output));
    // Buffered output is not shown on success
    assert!(!stderr(&output).contains("second\n"), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
    assert!(project.root().join("first.txt").exists());
}

#[rstest]
fn test_hook_run_propagates_exit_code(project: TestProject) {
    project.write_config(
        r#"
[hooks]
create = ["echo before", "echo boom >&2; exit 42", "touch after"]
"#,
    );

    let output = project.grove(&["hook", "run", "create"]);
    assert_eq!(output.status.code(), Some(42));
    let err = stderr(&output);
    assert!(err.contains("boom"), "{err}");
    assert!(err.contains("failed with exit code 42"), "{err}");
    assert!(!project.root().join("after").exists());
}

#[rstest]
fn test_hook_run_streaming_prefixes_lines(project: TestProject) {
    project.write_config(
        r#"
[hooks]
add = ["echo hello", "printf 'no newline'"]
"#,
    );

    let output = project.grove(&["hook", "run", "add", "--stream"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("echo hello │ hello\n"), "{err}");
    assert!(err.contains("printf 'no newline' │ no newline\n"), "{err}");
}

#[rstest]
fn test_hook_run_streaming_failure(project: TestProject) {
    project.write_config(
        r#"
[hooks]
add = ["echo out; exit 7", "echo never"]
"#,
    );

    let output = project.grove(&["hook", "run", "add", "--stream"]);
    assert_eq!(output.status.code(), Some(7));
    let err = stderr(&output);
    assert!(err.contains("│ out\n"), "{err}");
    assert!(!err.contains("never │"), "{err}");
}

#[rstest]
fn test_hook_run_without_hooks(project: TestProject) {
    let output = project.grove(&["hook", "run", "create"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("No create hooks"), "{}", stderr(&output));
}
