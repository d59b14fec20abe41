use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tax_core::InMemoryRateScheduleRepository;
use tax_data::{RateScheduleLoader, input_loader, run_batch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Calculate UAE corporate tax for a batch of entities.
///
/// Rate schedules are loaded from CSV (one row per version) and each input
/// row is calculated under the schedule in effect at the end of its tax
/// year, unless a version is pinned. Results are written as JSON.
#[derive(Parser, Debug)]
#[command(name = "tax-engine")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing versioned rate schedules
    #[arg(short, long)]
    schedules: PathBuf,

    /// Path to the CSV file containing calculation inputs
    #[arg(short, long)]
    inputs: PathBuf,

    /// Calculate every input under this schedule version
    #[arg(long)]
    version_id: Option<String>,

    /// Evaluation date for installment status (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Write JSON results here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let file = File::open(&args.schedules)
        .with_context(|| format!("Failed to open: {}", args.schedules.display()))?;
    let schedules = RateScheduleLoader::parse(file)
        .with_context(|| format!("Failed to parse rate schedules: {}", args.schedules.display()))?;
    if schedules.is_empty() {
        bail!("No rate schedules found in {}", args.schedules.display());
    }

    let repo = InMemoryRateScheduleRepository::new();
    RateScheduleLoader::load(&repo, &schedules)
        .await
        .context("Failed to load rate schedules")?;

    let inputs = input_loader::load_from_file(&args.inputs)
        .with_context(|| format!("Failed to load inputs: {}", args.inputs.display()))?;
    info!(count = inputs.len(), %as_of, "calculating");

    let outcome = run_batch(&repo, &inputs, args.version_id.as_deref(), as_of)
        .await
        .context("Batch aborted")?;

    for rejected in &outcome.rejected {
        for error in &rejected.errors {
            warn!(
                entity_id = %rejected.entity_id,
                tax_year = rejected.tax_year,
                field = %error.field,
                "{}",
                error.reason
            );
        }
    }

    let json = serde_json::to_string_pretty(&outcome).context("Failed to serialise results")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            info!(path = %path.display(), "results written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write results")?;
        }
    }

    info!(
        calculated = outcome.results.len(),
        rejected = outcome.rejected.len(),
        "done"
    );

    Ok(())
}
