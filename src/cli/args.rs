//! Clap argument types.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use confdiff::models::change::Change;
use confdiff::output::RenderError;

/// Dump an application's runtime configuration and diff two dumps.
#[derive(Parser, Debug)]
#[command(name = confdiff::constants::APP_NAME, version = confdiff::constants::VERSION)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Evaluate the configuration sources and write a dump.
    Dump(DumpArgs),

    /// Compare two dumps and report every difference.
    Diff(DiffArgs),

    /// Print the contents of a dump.
    Read(ReadArgs),
}

/// Arguments for the `dump` subcommand.
#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// Output file (default: config_dump_<env>_<timestamp>.json in the output dir).
    pub output: Option<PathBuf>,

    /// Directory holding the configuration sources.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Use deterministic placeholder values instead of the live environment.
    #[arg(long = "static", default_value_t = false)]
    pub static_values: bool,

    /// Print the materialized environment instead of writing a dump.
    #[arg(long, default_value_t = false)]
    pub show_env: bool,

    /// Dotenv file whose values override the materialized environment.
    #[arg(long, value_name = "FILE")]
    pub dotenv: Option<PathBuf>,

    /// Environment identifier for the default output name.
    #[arg(long)]
    pub env_name: Option<String>,
}

/// Arguments for the `diff` subcommand.
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// The older dump.
    pub before: PathBuf,

    /// The newer dump.
    pub after: PathBuf,

    /// Highlight output with colors.
    #[arg(long, default_value_t = false)]
    pub color: bool,

    /// Output format.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,
}

/// Arguments for the `read` subcommand.
#[derive(Parser, Debug)]
pub struct ReadArgs {
    /// Dump file to print.
    pub file: PathBuf,

    /// Highlight output with colors.
    #[arg(long, default_value_t = false)]
    pub color: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    /// Render changes using the renderer for this format.
    pub fn render(&self, changes: &[Change], color: bool) -> Result<String, RenderError> {
        use confdiff::output::OutputRenderer;
        match self {
            OutputFormat::Terminal => {
                confdiff::output::terminal::TerminalRenderer::new(color).render(changes)
            }
            OutputFormat::Json => confdiff::output::json::JsonRenderer.render(changes),
        }
    }
}
