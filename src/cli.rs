use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Styles};
use clap::{Parser, Subcommand};
use grove::HookType;

/// Help colors, matching the message styling
fn help_styles() -> Styles {
    Styles::styled()
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
}

#[derive(Parser, Debug)]
#[command(name = "grove", version, about = "Project settings and hooks for git worktrees")]
#[command(styles = help_styles())]
pub struct Cli {
    /// Project directory (default: current directory)
    #[arg(short = 'C', global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Plain output: no colors or icons
    #[arg(long, global = true)]
    pub plain: bool,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and create configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Run project hooks
    #[command(subcommand)]
    Hook(HookCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show effective settings and where each came from
    Show,

    /// Write an annotated .grove.toml template
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// List config file locations in search order
    Path,
}

#[derive(Subcommand, Debug)]
pub enum HookCommand {
    /// Run the commands declared for a hook, stopping at the first failure
    Run {
        #[arg(value_enum)]
        hook_type: HookType,

        /// Show output live, prefixed with the command
        #[arg(long)]
        stream: bool,
    },
}
