//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves the dataset path (flag > environment > default)
//! - loads the dataset through the cache
//! - runs the screen pipeline and prints text or JSON
//! - writes optional exports

use std::io;
use std::path::Path;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cache::DatasetCache;
use crate::cli::{Cli, Command, CompareArgs, OverviewArgs, SummaryArgs};
use crate::config::Settings;
use crate::domain::{Field, FillPolicy};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `covex` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::from_env().with_data_path(cli.data.clone());
    debug!(path = %settings.data_path.display(), "resolved dataset path");

    let cache = DatasetCache::new();
    let output = if cli.json { Output::Json } else { Output::Text };

    match cli.command {
        Command::Home => handle_home(&cache, &settings, output),
        Command::Overview(args) => handle_overview(&cache, &settings, output, args),
        Command::Compare(args) => handle_compare(&cache, &settings, output, args),
        Command::Summary(args) => handle_summary(&cache, &settings, output, args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Text,
    Json,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed when embedded (tests, other front-ends).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_home(cache: &DatasetCache, settings: &Settings, output: Output) -> Result<(), AppError> {
    // The landing screen only needs the core fields.
    let ds = cache.get_or_load(&settings.data_path, FillPolicy::Core)?;
    let view = pipeline::home_view(&ds);
    emit(output, &view, || crate::report::format_home(&view))
}

fn handle_overview(
    cache: &DatasetCache,
    settings: &Settings,
    output: Output,
    args: OverviewArgs,
) -> Result<(), AppError> {
    let ds = cache.get_or_load(&settings.data_path, FillPolicy::Extended)?;
    let view = pipeline::overview_view(&ds, args.country.as_deref(), args.start, args.end)?;
    emit(output, &view, || crate::report::format_overview(&view))?;

    if let Some(path) = &args.export {
        crate::io::export::write_records_csv(path, &view.rows, &pipeline::OVERVIEW_FIELDS)?;
        log_export(path, view.rows.len());
    }
    Ok(())
}

fn handle_compare(
    cache: &DatasetCache,
    settings: &Settings,
    output: Output,
    args: CompareArgs,
) -> Result<(), AppError> {
    let ds = cache.get_or_load(&settings.data_path, FillPolicy::Extended)?;
    let view = pipeline::compare_view(&ds, &args.countries, args.metric);
    emit(output, &view, || crate::report::format_compare(&view))?;

    if let Some(path) = &args.export {
        let mut fields = vec![args.metric.field()];
        for f in pipeline::CORRELATION_FIELDS {
            if !fields.contains(&f) {
                fields.push(f);
            }
        }
        crate::io::export::write_records_csv(path, &view.rows, &fields)?;
        log_export(path, view.rows.len());
    }
    Ok(())
}

fn handle_summary(
    cache: &DatasetCache,
    settings: &Settings,
    output: Output,
    args: SummaryArgs,
) -> Result<(), AppError> {
    let ds = cache.get_or_load(&settings.data_path, FillPolicy::Extended)?;
    let view = pipeline::summary_view(&ds, args.start, args.end, args.top)?;
    emit(output, &view, || crate::report::format_summary(&view))?;

    if let Some(path) = &args.export {
        let fields: &[Field] = &pipeline::SUMMARY_FIELDS;
        crate::io::export::write_daily_totals_csv(path, &view.daily, fields)?;
        log_export(path, view.daily.len());
    }
    Ok(())
}

/// Print a view either as pretty JSON or via its text formatter.
fn emit<T, F>(output: Output, view: &T, text: F) -> Result<(), AppError>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match output {
        Output::Text => println!("{}", text()),
        Output::Json => {
            let json = serde_json::to_string_pretty(view)
                .map_err(|e| AppError::new(2, format!("Failed to serialize view: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn log_export(path: &Path, rows: usize) {
    info!(path = %path.display(), rows, "wrote export");
}
