use std::path::Path;

use super::{HookResult, RunResult, exit_code, run_fail_fast};
use crate::shell_exec::{self, ShellConfig};

/// Runs hook commands with output captured, stopping at the first failure.
///
/// Nothing is printed while commands run; the caller decides what to show from
/// the [`RunResult`].
#[derive(Debug, Clone, Default)]
pub struct HookRunner {
    context: Option<String>,
}

impl HookRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label attached to subprocess traces, typically the hook name.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn run(&self, work_dir: &Path, commands: &[String]) -> RunResult {
        run_fail_fast(commands, |command| self.run_one(work_dir, command))
    }

    fn run_one(&self, work_dir: &Path, command: &str) -> Result<(), HookResult> {
        let mut cmd = ShellConfig::get().command(command);
        cmd.current_dir(work_dir);

        let output = shell_exec::run(&mut cmd, self.context.as_deref())
            .map_err(|e| HookResult::start_failure(command, work_dir, &e))?;

        if output.status.success() {
            return Ok(());
        }
        Err(HookResult {
            command: command.to_string(),
            exit_code: exit_code(&output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
