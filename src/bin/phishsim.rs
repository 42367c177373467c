//! phishsim command-line runner
//!
//! Trains a simulated organization, writes the results to SQLite and exports
//! the aggregated reports as CSV.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishsim::report::export_reports;
use phishsim::{Organization, ResultStore, SimResult, SqliteStore, TrainingConfig};

/// Simulate phishing-awareness training and export aggregated results.
#[derive(Debug, Parser)]
#[command(name = "phishsim", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "PHISHSIM_CONFIG")]
    config: Option<PathBuf>,

    /// Number of simulated users
    #[arg(long)]
    users: Option<usize>,

    /// Simulations per user
    #[arg(long)]
    simulations: Option<usize>,

    /// Length of the training programme in days
    #[arg(long)]
    interval_days: Option<u32>,

    /// Master random seed
    #[arg(long)]
    seed: Option<u64>,

    /// SQLite database path (":memory:" for a throwaway run)
    #[arg(short, long, env = "PHISHSIM_DATABASE")]
    database: Option<PathBuf>,

    /// Results table name
    #[arg(long)]
    table: Option<String>,

    /// Directory for the CSV reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print a JSON summary of the run to stdout
    #[arg(long)]
    summary: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn resolve_config(&self) -> SimResult<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::load(path)?,
            None => TrainingConfig::default(),
        };
        if let Some(users) = self.users {
            config.n_users = users;
        }
        if let Some(simulations) = self.simulations {
            config.n_simulations = simulations;
        }
        if let Some(days) = self.interval_days {
            config.training_interval_days = days;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(database) = &self.database {
            config.database.clone_from(database);
        }
        if let Some(table) = &self.table {
            config.table.clone_from(table);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        Ok(config.validate()?)
    }
}

fn run(cli: &Cli) -> SimResult<()> {
    let config = cli.resolve_config()?;

    let mut organization = Organization::new(&config)?;
    organization.do_training()?;

    let mut store = SqliteStore::open(&config.database)?;
    store.replace_results(&config.table, &organization.result())?;
    info!(
        table = %config.table,
        fingerprint = %organization.fingerprint(),
        "training results successfully uploaded to the database"
    );

    export_reports(&store, &config.table, &config.output_dir)?;

    if cli.summary {
        let summary = serde_json::to_string_pretty(&organization.summary())
            .map_err(phishsim::ExportError::from)?;
        println!("{summary}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "run failed");
            ExitCode::FAILURE
        }
    }
}
