//! Lifecycle hooks
//!
//! Hooks are shell strings from `.grove.toml` run one at a time in a project
//! directory. Both runners stop at the first command that fails and report it as
//! data in [`RunResult`] rather than as an error:
//!
//! - [`HookRunner`] captures output and shows nothing while commands run.
//! - [`StreamingHookRunner`] writes each output line as it arrives, prefixed
//!   with the command that produced it.
//!
//! There is no timeout or cancellation: a command that never exits blocks the
//! run.

mod framer;
mod runner;
mod streaming;

use std::io;
use std::path::Path;
use std::process::ExitStatus;

pub use framer::{LineFramer, SEPARATOR};
pub use runner::HookRunner;
pub use streaming::StreamingHookRunner;

/// Hook points declared in `.grove.toml`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[strum(serialize_all = "kebab-case")]
pub enum HookType {
    /// After a worktree is added
    Add,
    /// After a branch is created for a new worktree
    Create,
}

/// Lifecycle of one command within a run.
///
/// `Succeeded` and `Failed` are terminal; a failure (including a command that
/// could not be started) leaves every later command `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum HookState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl HookState {
    pub fn is_terminal(self) -> bool {
        matches!(self, HookState::Succeeded | HookState::Failed)
    }
}

/// The command that stopped a run, with its captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookResult {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl HookResult {
    /// A command whose process could not be started.
    fn start_failure(command: &str, work_dir: &Path, err: &io::Error) -> Self {
        Self {
            command: command.to_string(),
            exit_code: 1,
            stdout: String::new(),
            stderr: format!(
                "failed to start {command:?} in {}: {err}",
                crate::path::format_path_for_display(work_dir)
            ),
        }
    }
}

/// Outcome of running a hook command list.
///
/// `failed` is set exactly when the run stopped before the end of the list, and
/// `succeeded` never contains the failed command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub succeeded: Vec<String>,
    pub failed: Option<HookResult>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }

    /// Final state of the command at `index` in the list that was run.
    pub fn state(&self, index: usize) -> HookState {
        let done = self.succeeded.len();
        if index < done {
            HookState::Succeeded
        } else if index == done && self.failed.is_some() {
            HookState::Failed
        } else {
            HookState::NotStarted
        }
    }
}

/// Run `commands` in order through `run_one`, stopping at the first failure.
fn run_fail_fast<F>(commands: &[String], mut run_one: F) -> RunResult
where
    F: FnMut(&str) -> Result<(), HookResult>,
{
    let mut result = RunResult::default();
    for (i, command) in commands.iter().enumerate() {
        log::debug!("hook [{i}] {}: {command}", HookState::Running);
        match run_one(command) {
            Ok(()) => {
                log::debug!("hook [{i}] {}", HookState::Succeeded);
                result.succeeded.push(command.clone());
            }
            Err(failure) => {
                log::debug!(
                    "hook [{i}] {} with exit code {}",
                    HookState::Failed,
                    failure.exit_code
                );
                let skipped = commands.len() - i - 1;
                if skipped > 0 {
                    log::debug!("{skipped} later hook command(s) {}", HookState::NotStarted);
                }
                result.failed = Some(failure);
                break;
            }
        }
    }
    result
}

/// Exit code reported for a finished process.
///
/// On Unix a process killed by a signal reports `128 + signal`, as shells do.
/// A status with no code at all reports 1.
fn exit_code(status: &ExitStatus) -> i32 {
    #[cfg(unix)]
    if let Some(sig) = std::os::unix::process::ExitStatusExt::signal(status) {
        return 128 + sig;
    }
    status.code().unwrap_or(1)
}
