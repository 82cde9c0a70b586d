// Growth Governor diagnose runner
// Reads a weekly CSV sheet, layers cached secondary inputs, prints the diagnosis.
//
// Usage:
//   cargo run --bin diagnose -- weeks.csv
//   cargo run --bin diagnose -- weeks.csv --overrides secondary.json --json
//   RUST_LOG=growth_governor=debug cargo run --bin diagnose -- weeks.csv

mod args;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use growth_governor::ingest::{parse_week_table, IngestError};
use growth_governor::overrides::{OverrideError, SecondaryOverrides};
use growth_governor::report::render_text;
use growth_governor::{diagnose_with, GovernorError, Thresholds};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Overrides(#[from] OverrideError),

    #[error("invalid thresholds file: {0}")]
    Thresholds(#[source] serde_json::Error),

    #[error(transparent)]
    Governor(#[from] GovernorError),

    #[error("failed to encode diagnosis: {0}")]
    Encode(#[source] serde_json::Error),
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn run(cli: &args::CliArgs) -> Result<String, CliError> {
    let table = std::fs::File::open(&cli.table).map_err(|source| CliError::Io {
        path: cli.table.clone(),
        source,
    })?;
    let weeks = parse_week_table(table)?;

    let weeks = match &cli.overrides {
        Some(path) => {
            let overrides = SecondaryOverrides::from_json(&read(path)?)?;
            tracing::info!(entries = overrides.len(), "secondary overrides loaded");
            overrides.apply(&weeks)
        }
        None => weeks,
    };

    let thresholds = match &cli.thresholds {
        Some(path) => Thresholds::from_json(&read(path)?).map_err(CliError::Thresholds)?,
        None => Thresholds::default(),
    };

    let diagnosis = diagnose_with(&weeks, &thresholds)?;
    if cli.json {
        serde_json::to_string_pretty(&diagnosis).map_err(CliError::Encode)
    } else {
        Ok(render_text(&diagnosis))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "growth_governor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = match args::parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{}\n\n{}", msg, args::USAGE);
            return ExitCode::from(1);
        }
    };

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(CliError::Governor(e)) => {
            eprintln!("Insufficient data: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
