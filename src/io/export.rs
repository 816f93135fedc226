//! Export the series behind a screen to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! Missing values are written as empty cells, never as 0.

use std::path::Path;

use crate::domain::{DailyTotals, Field, Record};
use crate::error::AppError;

/// Write `location,date,<fields…>` rows.
pub fn write_records_csv(path: &Path, records: &[&Record], fields: &[Field]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header = vec!["location".to_string(), "date".to_string()];
    header.extend(fields.iter().map(|f| f.column().to_string()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        let mut row = vec![r.location.clone(), r.date.to_string()];
        row.extend(fields.iter().map(|&f| fmt_cell(r.value(f))));
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write `date,<fields…>` daily sums.
pub fn write_daily_totals_csv(path: &Path, totals: &[DailyTotals], fields: &[Field]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header = vec!["date".to_string()];
    header.extend(fields.iter().map(|f| f.column().to_string()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for day in totals {
        let mut row = vec![day.date.to_string()];
        row.extend(fields.iter().map(|&f| fmt_cell(day.sums.get(&f).copied())));
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}
