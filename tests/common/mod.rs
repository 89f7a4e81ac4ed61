// Not every helper is used by every test module.
#![allow(dead_code)]

//! # Test utilities for grove
//!
//! `TestProject` is a temporary git repository with an isolated environment:
//! global and system git config are disabled, and `GROVE_*` / `RUST_LOG` from the
//! host are cleared, so only what a test writes can influence resolution.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rstest::fixture;
use tempfile::TempDir;

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// Strip the host environment down to what grove and git need.
pub fn isolate(cmd: &mut Command) {
    for (key, _) in std::env::vars_os() {
        let key = key.to_string_lossy().into_owned();
        if key.starts_with("GROVE_") || key.starts_with("GIT_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env_remove("RUST_LOG")
        .env("GIT_CONFIG_GLOBAL", NULL_DEVICE)
        .env("GIT_CONFIG_SYSTEM", NULL_DEVICE)
        .env("NO_COLOR", "1")
        .env("LC_ALL", "C");
}

/// A `grove` command with an isolated environment.
#[must_use]
pub fn grove_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_grove"));
    isolate(&mut cmd);
    cmd
}

pub struct TestProject {
    dir: TempDir,
    root: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let project = Self { dir, root };
        project.git(&["init", "--quiet"]);
        project
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.root.join(".grove.toml"), contents).unwrap();
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.root.join(".grove.toml")).unwrap()
    }

    /// Set a key in the repository's local git config.
    pub fn git_config(&self, key: &str, value: &str) {
        self.git(&["config", key, value]);
    }

    /// Append a value to a multi-valued git config key.
    pub fn git_config_add(&self, key: &str, value: &str) {
        self.git(&["config", "--add", key, value]);
    }

    pub fn git(&self, args: &[&str]) {
        let mut cmd = Command::new("git");
        isolate(&mut cmd);
        let output = cmd.args(args).current_dir(&self.root).output().unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// `grove -C <root> <args>`
    pub fn grove(&self, args: &[&str]) -> Output {
        grove_command()
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .unwrap()
    }

    pub fn temp_dir(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

#[fixture]
pub fn project() -> TestProject {
    TestProject::new()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
