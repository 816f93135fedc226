//! Command-line parsing for the dataset explorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loading/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::Metric;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covex", version, about = "COVID-19 dataset explorer")]
pub struct Cli {
    /// Dataset CSV (overrides COVID_DATA_PATH).
    #[arg(long, global = true, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Print the view as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands, one per screen.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Quick global figures: latest date, case/death totals, locations tracked.
    Home,
    /// One location over a date range: smoothed trend, vaccination, key figures.
    Overview(OverviewArgs),
    /// Compare countries on one metric: latest values, correlations, statistics.
    Compare(CompareArgs),
    /// Country-only global summary: totals, peaks, vaccination leaders, continents.
    Summary(SummaryArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct OverviewArgs {
    /// Location to show (defaults to the first one alphabetically).
    #[arg(short, long)]
    pub country: Option<String>,

    /// First date (defaults to 30 days before --end).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Last date (defaults to the latest date in the dataset).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,

    /// Export the filtered rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct CompareArgs {
    /// Countries to compare, comma separated (defaults to the first five).
    #[arg(short, long, value_delimiter = ',')]
    pub countries: Vec<String>,

    /// Metric to analyze.
    #[arg(short, long, value_enum, default_value_t = Metric::NewCasesSmoothed)]
    pub metric: Metric,

    /// Export the selected countries' rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// First date (defaults to the earliest date).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Last date (defaults to the latest date).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,

    /// How many locations to list by vaccination rate.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Export the daily global sums to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
