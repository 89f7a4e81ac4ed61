use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, bail};
use clap::Parser;
use color_print::cformat;
use log::LevelFilter;
use strum::IntoEnumIterator;

use grove::config::{
    self, ConfigError, FileConfig, GitConfigStore, Origin, Project, Setting, Settings, Source,
};
use grove::hooks::{HookResult, HookRunner, HookType, RunResult, StreamingHookRunner};
use grove::path::format_path_for_display;
use grove::styling::{
    self, EMPHASIS, SOURCE, eprintln, error_message, hint_message, println, success_message,
};

mod cli;

use cli::{Cli, Commands, ConfigCommand, HookCommand};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", error_message(format!("{e:#}")));
            if let Some(ConfigError::Invalid(_)) = e.downcast_ref::<ConfigError>() {
                eprintln!("{}", hint_message("Fix .grove.toml or the grove.* git config keys"));
            }
            process::exit(1);
        }
    }
}

/// Returns the process exit code.
fn run(cli: Cli) -> anyhow::Result<i32> {
    let dir = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Config(ConfigCommand::Path) => {
            handle_config_path(&dir);
            Ok(0)
        }
        Commands::Config(ConfigCommand::Init { force }) => {
            handle_config_init(&dir, force)?;
            Ok(0)
        }
        Commands::Config(ConfigCommand::Show) => {
            let project = load_project(&dir, cli.plain)?;
            handle_config_show(project.settings());
            Ok(0)
        }
        Commands::Hook(HookCommand::Run { hook_type, stream }) => {
            let project = load_project(&dir, cli.plain)?;
            Ok(handle_hook_run(&project, hook_type, stream))
        }
    }
}

/// Logging: warnings by default; `-v` debug, `-vv` trace; `RUST_LOG` wins when set.
///
/// The logger is built permissive and the global max level gates it, so a
/// `debug` setting resolved later can still raise the level.
fn init_logging(verbose: u8) {
    let permissive = if verbose >= 2 {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter_level(permissive)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(if verbose == 0 {
            LevelFilter::Warn
        } else {
            permissive
        });
    }
}

fn load_project(dir: &Path, plain: bool) -> anyhow::Result<Project> {
    let store = GitConfigStore::at(dir);
    let mut project = Project::load(dir, &store)
        .with_context(|| format!("Failed to load settings for {}", format_path_for_display(dir)))?;

    let settings = project.settings_mut();
    settings.load_from_process_environment();
    if plain {
        settings.set_plain(true);
    }

    if settings.debug() && log::max_level() < LevelFilter::Debug {
        log::set_max_level(LevelFilter::Debug);
    }
    styling::apply_color_choice(settings);

    Ok(project)
}

fn handle_config_path(cwd: &Path) {
    let lookup = |var: &str| std::env::var(var).ok();
    let found = config::find_config_path(cwd, lookup);
    for path in config::search_paths(cwd, lookup) {
        let shown = format_path_for_display(&path);
        if found.as_ref() == Some(&path) {
            println!("{}", cformat!("<bold>{shown}</>  <green>(active)</>"));
        } else if path.is_file() {
            println!("{shown}  (shadowed)");
        } else {
            println!("{shown}");
        }
    }
}

fn handle_config_init(dir: &Path, force: bool) -> anyhow::Result<()> {
    let path: PathBuf = config::file::config_file_path(dir);
    if FileConfig::exists(dir) && !force {
        bail!(
            "{} already exists; use --force to replace it",
            format_path_for_display(&path)
        );
    }
    FileConfig::write_template(dir)?;
    eprintln!(
        "{}",
        success_message(format!("Created {}", format_path_for_display(&path)))
    );
    Ok(())
}

fn handle_config_show(settings: &Settings) {
    let width = Setting::iter()
        .map(|s| s.file_key().len())
        .max()
        .unwrap_or(0);
    for setting in Setting::iter() {
        let origin = settings.source(setting);
        let value = settings.value(setting);
        let value = if origin == Origin::Resolved(Source::Default) {
            value.to_string()
        } else {
            format!("{EMPHASIS}{value}{EMPHASIS:#}")
        };
        println!(
            "{:<width$} = {value}  {SOURCE}({origin}){SOURCE:#}",
            setting.file_key()
        );
    }
}

fn handle_hook_run(project: &Project, hook_type: HookType, stream: bool) -> i32 {
    let commands = project.hook_commands(hook_type);
    if commands.is_empty() {
        eprintln!(
            "{}",
            hint_message(format!("No {hook_type} hooks in .grove.toml"))
        );
        return 0;
    }

    let result: RunResult = if stream {
        StreamingHookRunner::for_settings(styling::stderr(), project.settings())
            .with_context(hook_type.to_string())
            .run(project.root(), commands)
    } else {
        HookRunner::new()
            .with_context(hook_type.to_string())
            .run(project.root(), commands)
    };

    match &result.failed {
        None => {
            eprintln!(
                "{}",
                success_message(format!(
                    "Ran {} {hook_type} hook command(s)",
                    result.succeeded.len()
                ))
            );
            0
        }
        Some(failed) => {
            report_failure(failed, !stream);
            failed.exit_code
        }
    }
}

fn report_failure(failed: &HookResult, show_output: bool) {
    if show_output {
        // Output already went to the terminal when streaming
        let mut stderr = styling::stderr();
        if let Err(e) = stderr
            .write_all(failed.stdout.as_bytes())
            .and_then(|()| stderr.write_all(failed.stderr.as_bytes()))
        {
            log::debug!("Failed to show output of {}: {e}", failed.command);
        }
    }
    eprintln!(
        "{}",
        error_message(cformat!(
            "Hook command <bold>{}</> failed with exit code {}",
            failed.command,
            failed.exit_code
        ))
    );
}
