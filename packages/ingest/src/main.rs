#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the property client map pipeline.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use propmap_cli_utils::YearProgress;
use propmap_ingest::aggregate::MultiYearResult;
use propmap_ingest::config::DashboardConfig;
use propmap_ingest::{build_pipeline, open_cache};
use propmap_record_models::NormalizedRecord;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "propmap", about = "Property client map data pipeline")]
struct Cli {
    /// Path to a TOML config file (defaults to the embedded config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and normalize a single year
    Load {
        /// Year identifier (e.g., "2023")
        year: String,
        /// Discard any cached records for the year before loading
        #[arg(long)]
        refresh: bool,
    },
    /// Load several years concurrently and print the combined records
    LoadAll {
        /// Comma-separated years (defaults to the configured list)
        #[arg(long, value_delimiter = ',')]
        years: Option<Vec<String>>,
    },
    /// Load several years and print summary statistics and insights
    Summary {
        /// Comma-separated years (defaults to the configured list)
        #[arg(long, value_delimiter = ',')]
        years: Option<Vec<String>>,
    },
    /// Delete the persisted geocode cache
    ClearCache,
    /// Print the effective configuration
    Config,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct YearOutput<'a> {
    year: &'a str,
    records: &'a [NormalizedRecord],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct YearStatus<'a> {
    year: &'a str,
    records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MultiYearOutput<'a> {
    years: Vec<YearStatus<'a>>,
    records: &'a [NormalizedRecord],
}

impl<'a> MultiYearOutput<'a> {
    /// Per-year status in requested order, followed by the combined records.
    fn new(requested: &'a [String], result: &'a MultiYearResult) -> Self {
        let mut years: Vec<YearStatus<'a>> = Vec::with_capacity(result.by_year.len());
        for year in requested {
            if years.iter().any(|s| s.year == year.as_str()) {
                continue;
            }
            years.push(YearStatus {
                year,
                records: result.by_year.get(year).map_or(0, |r| r.len()),
                error: result
                    .failures
                    .iter()
                    .find(|f| &f.year == year)
                    .map(|f| f.reason.as_str()),
            });
        }

        Self {
            years,
            records: &result.combined,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = propmap_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = DashboardConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            print_json(&config)?;
        }
        Commands::ClearCache => {
            open_cache(&config)?.clear();
        }
        Commands::Load { year, refresh } => {
            let pipeline = build_pipeline(&config, Some(YearProgress::factory(&multi, 1)))?;
            if refresh {
                pipeline.dataset.invalidate(&year);
            }

            let start = Instant::now();
            let records = pipeline.dataset.load(&year).await?;
            log::info!(
                "Loaded {} records for {year} in {:.1}s",
                records.len(),
                start.elapsed().as_secs_f64()
            );

            print_json(&YearOutput {
                year: &year,
                records: &records,
            })?;
        }
        Commands::LoadAll { years } => {
            let years = years.unwrap_or_else(|| config.years.clone());
            let progress = YearProgress::factory(&multi, years.len());
            let pipeline = build_pipeline(&config, Some(progress))?;

            let start = Instant::now();
            let result = pipeline.aggregator.load_all(&years).await;
            log::info!(
                "Loaded {} records from {} years in {:.1}s",
                result.combined.len(),
                result.succeeded(),
                start.elapsed().as_secs_f64()
            );

            print_json(&MultiYearOutput::new(&years, &result))?;
        }
        Commands::Summary { years } => {
            let years = years.unwrap_or_else(|| config.years.clone());
            let progress = YearProgress::factory(&multi, years.len());
            let pipeline = build_pipeline(&config, Some(progress))?;

            let result = pipeline.aggregator.load_all(&years).await;
            print_json(&propmap_analytics::summarize(&result.combined))?;
        }
    }

    Ok(())
}
