//! confdiff binary entry point.

mod cli;

use confdiff::config;
use confdiff::diff;
use confdiff::dump;
use confdiff::env;
use confdiff::materialize;
use confdiff::models;
use confdiff::output;
use confdiff::scanner;
use confdiff::source;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Command, DiffArgs, DumpArgs, ReadArgs};
use config::Config;
use env::Env;
use models::Mode;
use source::{ConfigSource, TomlDirSource};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let env = Env::real();
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let config = Config::load(Some(&cwd), &env).context("failed to load confdiff config")?;

    match cli.command {
        Command::Dump(args) => run_dump(args, &config, &env),
        Command::Diff(args) => run_diff(args, &config),
        Command::Read(args) => run_read(args, &config),
    }
}

/// Scan, materialize and evaluate the configuration, then write a dump.
fn run_dump(args: DumpArgs, config: &Config, env: &Env) -> Result<()> {
    let config_dir = args
        .config_dir
        .unwrap_or_else(|| config.dump.config_dir.clone());

    let names = scanner::scan_env_vars(&config_dir, &config.scan.extensions)
        .context("failed to scan configuration sources")?;

    let overrides = match &args.dotenv {
        Some(path) => {
            Some(materialize::load_dotenv(path).context("failed to load dotenv overrides")?)
        }
        None => None,
    };

    let mode = if args.static_values {
        Mode::Static
    } else {
        Mode::Live
    };
    let mapping = materialize::materialize(&names, mode, overrides.as_ref(), env);

    if args.show_env {
        print!("{}", materialize::format_mapping(&mapping));
        return Ok(());
    }

    let source = TomlDirSource::new(&config_dir);
    let snapshot = source
        .load(&env.overlay(&mapping))
        .context("failed to evaluate configuration")?;

    let output = match args.output {
        Some(path) => path,
        None => default_output_path(args.env_name.as_deref(), config),
    };
    dump::write_dump(&snapshot, &output).context("failed to write dump")?;

    println!("Wrote {}", output.display());
    Ok(())
}

fn default_output_path(env_name: Option<&str>, config: &Config) -> PathBuf {
    let env_name = env_name.unwrap_or(&config.dump.env_name);
    config
        .dump
        .output_dir
        .join(dump::default_dump_name(env_name, chrono::Utc::now()))
}

/// Compare two dumps and print the changes.
fn run_diff(args: DiffArgs, config: &Config) -> Result<()> {
    let before = read_dump(&args.before)?;
    let after = read_dump(&args.after)?;

    let changes = diff::diff(&before, &after);
    let summary = models::Summary::from_changes(&changes);
    tracing::info!(
        added = summary.added,
        removed = summary.removed,
        changed = summary.changed,
        "diff complete"
    );

    let color = use_color(args.color, config);
    let report = args
        .format
        .render(&changes, color)
        .context("failed to render changes")?;
    print!("{report}");
    Ok(())
}

/// Print one dump.
fn run_read(args: ReadArgs, config: &Config) -> Result<()> {
    let snapshot = read_dump(&args.file)?;
    let color = use_color(args.color, config);
    let renderer = output::terminal::TerminalRenderer::new(color);
    print!("{}", renderer.render_snapshot(&snapshot));
    Ok(())
}

fn read_dump(path: &Path) -> Result<models::Snapshot> {
    dump::read_dump(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Resolve the color flag. `colored` turns itself off when stdout is not a
/// terminal, so an explicit request forces it back on.
fn use_color(flag: bool, config: &Config) -> bool {
    let color = flag || config.render.color;
    if color {
        colored::control::set_override(true);
    }
    color
}
