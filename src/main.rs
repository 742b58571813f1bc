use anyhow::Context;
use clap::{Parser, Subcommand};
use mockbars::profile::load_profile;
use mockbars::synthetic::RunSummary;
use mockbars::{FixtureRunner, RunProfile};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate synthetic daily OHLCV fixtures for backtesting
#[derive(Parser)]
#[command(name = "mockbars")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML run profile; the built-in 2023 profile is used when omitted.
    /// `MOCKBARS_*` environment variables override either one
    #[arg(short, long, global = true)]
    profile: Option<PathBuf>,

    /// Directory the CSV files are written to
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Seed for the random stream
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate per-symbol and combined CSV files (default)
    Generate,

    /// Re-read previously generated files and validate every bar
    Verify,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let profile = build_profile(&cli)?;

    tracing::info!(
        "Profile: {} symbols, {} -> {}, seed {}, output {}",
        profile.symbols.len(),
        profile.start_date,
        profile.end_date,
        profile.seed,
        profile.output_dir.display()
    );

    let runner = FixtureRunner::new(profile);

    match cli.command.unwrap_or(Commands::Generate) {
        Commands::Generate => {
            let summary = runner.run().context("fixture generation failed")?;
            report(&summary);
        }
        Commands::Verify => {
            let summary = runner.verify().context("fixture verification failed")?;
            report(&summary);
        }
    }

    Ok(())
}

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mockbars=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_profile(cli: &Cli) -> anyhow::Result<RunProfile> {
    let mut profile = match &cli.profile {
        Some(path) => load_profile(Some(path.as_path()))
            .with_context(|| format!("failed to load profile {}", path.display()))?,
        None => load_profile(None).context("failed to read MOCKBARS_* overrides")?,
    };

    if let Some(dir) = &cli.output_dir {
        profile = profile.with_output_dir(dir.clone());
    }
    if let Some(seed) = cli.seed {
        profile = profile.with_seed(seed);
    }

    Ok(profile)
}

fn report(summary: &RunSummary) {
    tracing::info!(
        "{} files, {} bars, {} combined rows",
        summary.files.len() + 1,
        summary.total_bars(),
        summary.combined_rows
    );
}
