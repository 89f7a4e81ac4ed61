//! Shell selection and traced subprocess execution
//!
//! Hook commands are plain shell strings. On Unix they run under `sh -c`; on
//! Windows we use a POSIX `bash` when one is on `PATH` and fall back to
//! PowerShell otherwise, where bash syntax in hooks will not work.

use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;
use std::time::Instant;

static SHELL: OnceLock<ShellConfig> = OnceLock::new();

/// How to hand a command string to a shell
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub executable: PathBuf,
    /// Arguments placed before the command string (`-c` for sh)
    pub args: Vec<String>,
    pub is_posix: bool,
    /// Name for error messages
    pub name: String,
}

impl ShellConfig {
    /// The shell for this platform, detected once per process.
    pub fn get() -> &'static ShellConfig {
        SHELL.get_or_init(detect_shell)
    }

    /// Build a `Command` that runs `shell_command` through this shell.
    pub fn command(&self, shell_command: &str) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args).arg(shell_command);
        cmd
    }
}

#[cfg(unix)]
fn detect_shell() -> ShellConfig {
    ShellConfig {
        executable: PathBuf::from("sh"),
        args: vec!["-c".to_string()],
        is_posix: true,
        name: "sh".to_string(),
    }
}

#[cfg(windows)]
fn detect_shell() -> ShellConfig {
    match which::which("bash") {
        Ok(bash) => ShellConfig {
            executable: bash,
            args: vec!["-c".to_string()],
            is_posix: true,
            name: "bash".to_string(),
        },
        Err(_) => {
            log::warn!("bash not found on PATH; hooks will run under PowerShell");
            ShellConfig {
                executable: PathBuf::from("powershell.exe"),
                args: vec!["-NoProfile".to_string(), "-Command".to_string()],
                is_posix: false,
                name: "PowerShell".to_string(),
            }
        }
    }
}

/// Render a command for logs: program followed by its arguments.
pub fn describe(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
    if args.is_empty() {
        program.into_owned()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Run a command to completion, capturing output, with timing and debug logging.
///
/// Every buffered subprocess in grove goes through here so traces stay uniform:
///
/// ```text
/// $ git config --get grove.plain [/work/project]
/// [grove-trace] context=/work/project cmd="git config --get grove.plain" dur=3.1ms ok=false
/// ```
pub fn run(cmd: &mut Command, context: Option<&str>) -> std::io::Result<Output> {
    let cmd_str = describe(cmd);
    match context {
        Some(ctx) => log::debug!("$ {cmd_str} [{ctx}]"),
        None => log::debug!("$ {cmd_str}"),
    }

    let t0 = Instant::now();
    let result = cmd.output();
    match &result {
        Ok(output) => trace(context, &cmd_str, t0, Ok(output.status.success())),
        Err(e) => trace(context, &cmd_str, t0, Err(e)),
    }

    result
}

/// Emit the `[grove-trace]` line for a finished command started at `t0`.
///
/// Used by [`run`] and by callers that spawn and drain a child themselves.
pub fn trace(
    context: Option<&str>,
    cmd_str: &str,
    t0: Instant,
    outcome: Result<bool, &std::io::Error>,
) {
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;
    let context_field = context.map(|ctx| format!("context={ctx} ")).unwrap_or_default();
    match outcome {
        Ok(ok) => log::debug!(
            "[grove-trace] {context_field}cmd=\"{cmd_str}\" dur={duration_ms:.1}ms ok={ok}"
        ),
        Err(e) => log::debug!(
            "[grove-trace] {context_field}cmd=\"{cmd_str}\" dur={duration_ms:.1}ms err=\"{e}\""
        ),
    }
}
