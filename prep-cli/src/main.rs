//! Prep CLI - Command-line interface for the prep transformation engine.

mod commands;
mod dataset;

use anyhow::Result;
use clap::{Parser, Subcommand};
use prep_executor::EngineConfig;
use prep_executor::observability::{TracingGuard, init_tracing};
use std::path::PathBuf;

/// Prep - Replays action scripts over tabular datasets.
#[derive(Parser)]
#[command(name = "prep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Engine configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an action script over a dataset
    Run {
        /// Path to the action script (JSON)
        #[arg(short, long)]
        script: PathBuf,

        /// Path to the input dataset (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after this many written rows
        #[arg(short, long)]
        limit: Option<u64>,

        /// Indent records, one per line
        #[arg(long)]
        pretty: bool,
    },

    /// Check that every action of a script exists and accepts its scope
    Validate {
        /// Path to the action script (JSON)
        script: PathBuf,
    },

    /// List the built-in actions
    Actions,

    /// Record scripts as steps of a preparation and replay its history
    History {
        /// Action scripts, one step each, in order
        #[arg(required = true)]
        scripts: Vec<PathBuf>,

        /// Dataset the preparation applies to
        #[arg(short, long, default_value = "dataset")]
        dataset: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn setup_logging(verbosity: u8, config: &EngineConfig) -> Result<TracingGuard> {
    let tracing_config = config.tracing_config();
    let filter_set = config.log.level.is_some()
        || std::env::var_os("PREP_LOG_LEVEL").is_some()
        || std::env::var_os("RUST_LOG").is_some();

    // -v wins over configured and environment filters
    let tracing_config = match verbosity {
        0 if filter_set => tracing_config,
        0 => tracing_config.with_filter("warn"),
        1 => tracing_config.with_filter("info"),
        2 => tracing_config.with_filter("debug"),
        _ => tracing_config.with_filter("trace"),
    };
    init_tracing(tracing_config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let _tracing_guard = setup_logging(cli.verbose, &config)?;

    match cli.command {
        Commands::Run {
            script,
            input,
            output,
            limit,
            pretty,
        } => {
            let options = commands::run::RunOptions {
                script: &script,
                input: &input,
                output: output.as_deref(),
                limit: limit.or(config.preview_limit),
                pretty,
            };
            commands::run::run(options)
        }
        Commands::Validate { script } => commands::validate::run(&script),
        Commands::Actions => commands::actions::run(),
        Commands::History { scripts, dataset } => {
            commands::history::run(&scripts, &dataset, &config.app_version)
        }
    }
}
