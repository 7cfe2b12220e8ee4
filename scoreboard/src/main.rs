mod config;
mod logging;
mod statsd;

use clap::{Parser, Subcommand};
use config::{Config, ConfigError};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "scoreboard", about = "Sports scoreboard aggregator")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the aggregator
    Run(ConfigArgs),
    /// Load and validate a config file, then exit
    CheckConfig(ConfigArgs),
}

#[derive(clap::Args)]
struct ConfigArgs {
    #[arg(long)]
    config_file_path: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid aggregator config: {0}")]
    Validation(#[from] aggregator::config::ConfigValidationError),
    #[error(transparent)]
    Metrics(#[from] statsd::MetricsInitError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Aggregator(#[from] aggregator::errors::AggregatorError),
}

fn load_config(args: &ConfigArgs) -> Result<Config, CliError> {
    let config = Config::from_file(&args.config_file_path)?;
    config.aggregator.validate()?;
    Ok(config)
}

fn run(args: &ConfigArgs) -> Result<(), CliError> {
    let config = load_config(args)?;

    let _sentry = logging::init(config.common.logging.as_ref());
    if let Some(metrics_config) = &config.common.metrics {
        statsd::init(metrics_config)?;
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(aggregator::run(config.aggregator))?;

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        CliCommand::Run(args) => run(args),
        CliCommand::CheckConfig(args) => load_config(args).map(|_| {
            println!("Config ok: {}", args.config_file_path.display());
        }),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}
