use std::io::{self, Read, Write};
use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use super::framer::LineFramer;
use super::{HookResult, RunResult, exit_code, run_fail_fast};
use crate::config::Settings;
use crate::shell_exec::{self, ShellConfig};

/// Runs hook commands one at a time, relaying their output live.
///
/// Each line from either stream is written to the sink as
/// `<command> │ <line>`. The raw output is captured as well, so a failing command
/// is reported with the same [`HookResult`] the buffered runner produces.
pub struct StreamingHookRunner<W: Write + Send> {
    sink: W,
    color: bool,
    context: Option<String>,
}

impl<W: Write + Send> StreamingHookRunner<W> {
    /// A runner writing uncolored lines to `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            color: false,
            context: None,
        }
    }

    /// Colored prefixes unless plain output is configured.
    pub fn for_settings(sink: W, settings: &Settings) -> Self {
        Self::new(sink).with_color(!settings.plain())
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Label attached to subprocess traces, typically the hook name.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    pub fn run(&mut self, work_dir: &Path, commands: &[String]) -> RunResult {
        run_fail_fast(commands, |command| self.run_one(work_dir, command))
    }

    fn run_one(&mut self, work_dir: &Path, command: &str) -> Result<(), HookResult> {
        let mut cmd = ShellConfig::get().command(command);
        cmd.current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let context = self.context.as_deref();
        let cmd_str = shell_exec::describe(&cmd);
        log::debug!("$ {cmd_str} [streaming]");
        let t0 = Instant::now();

        let mut child = cmd.spawn().map_err(|e| {
            shell_exec::trace(context, &cmd_str, t0, Err(&e));
            HookResult::start_failure(command, work_dir, &e)
        })?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // One lock per command; both readers frame lines into it
        let sink = Mutex::new(&mut self.sink);
        let color = self.color;
        let (stdout, stderr) = thread::scope(|s| {
            let out = s.spawn(|| relay(stdout, LineFramer::styled(&sink, command, color)));
            let err = s.spawn(|| relay(stderr, LineFramer::styled(&sink, command, color)));
            (join_reader(out), join_reader(err))
        });

        let status = child.wait();
        match &status {
            Ok(status) => shell_exec::trace(context, &cmd_str, t0, Ok(status.success())),
            Err(e) => shell_exec::trace(context, &cmd_str, t0, Err(e)),
        }

        let exit_code = match status {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => exit_code(&status),
            Err(e) => {
                log::warn!("Failed to wait for {command:?}: {e}");
                1
            }
        };
        Err(HookResult {
            command: command.to_string(),
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// Copy a child stream through `framer` until EOF, flush, and return the raw bytes.
fn relay<R: Read, W: Write>(source: Option<R>, mut framer: LineFramer<'_, W>) -> Vec<u8> {
    if let Some(mut source) = source
        && let Err(e) = io::copy(&mut source, &mut framer)
    {
        log::warn!("Failed to read hook output: {e}");
    }
    if let Err(e) = framer.flush() {
        log::warn!("Failed to write hook output: {e}");
    }
    framer.into_captured()
}

fn join_reader(handle: thread::ScopedJoinHandle<'_, Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_else(|_| {
        log::warn!("Hook output reader panicked");
        Vec::new()
    })
}
