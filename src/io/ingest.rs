//! CSV ingest and normalization.
//!
//! This module turns the per-location daily CSV into an immutable `Dataset`:
//!
//! - **Strict schema** for the identity and core counter columns
//! - **Fatal parse errors**: an unparseable date or number aborts the load
//! - **Fill policy** applied per column (see `FillPolicy`)
//! - **Derived smoothing** (7-sample trailing mean) when the source lacks it
//!
//! No aggregation logic lives here.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{Dataset, Field, FillPolicy, Record};
use crate::error::LoadError;

/// Samples per smoothing window.
pub const SMOOTHING_WINDOW: usize = 7;

/// Columns every source must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "location",
    "date",
    "new_cases",
    "new_deaths",
    "total_cases",
    "total_deaths",
];

/// Load a dataset from a CSV file.
pub fn load(path: &Path, policy: FillPolicy) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), ?policy, "loading dataset");
    load_from_reader(file, policy)
}

/// Load a dataset from any CSV byte source.
pub fn load_from_reader<R: Read>(source: R, policy: FillPolicy) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers)?;
    debug!(
        columns = headers.len(),
        numeric = columns.fields.len(),
        has_continent = columns.continent.is_some(),
        "resolved dataset header"
    );

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = result?;
        // Header is line 1.
        let line = row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        records.push(parse_row(&row, &columns, policy, line)?);
    }

    if !columns.fields.contains_key(&Field::NewCasesSmoothed) {
        apply_rolling_mean(&mut records, Field::NewCases, Field::NewCasesSmoothed, SMOOTHING_WINDOW);
    }
    if !columns.fields.contains_key(&Field::NewDeathsSmoothed) {
        apply_rolling_mean(&mut records, Field::NewDeaths, Field::NewDeathsSmoothed, SMOOTHING_WINDOW);
    }

    let dataset = Dataset::new(records);
    info!(
        rows = dataset.len(),
        continents = dataset.continents().len(),
        ?policy,
        "dataset loaded"
    );
    Ok(dataset)
}

/// Resolved column positions.
#[derive(Debug)]
struct Columns {
    location: usize,
    date: usize,
    continent: Option<usize>,
    fields: HashMap<Field, usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let header_map = build_header_map(headers);

        for name in REQUIRED_COLUMNS {
            if !header_map.contains_key(name) {
                return Err(LoadError::MissingColumn(name));
            }
        }

        let fields = Field::ALL
            .iter()
            .filter_map(|&f| header_map.get(f.column()).map(|&idx| (f, idx)))
            .collect();

        Ok(Self {
            location: header_map["location"],
            date: header_map["date"],
            continent: header_map.get("continent").copied(),
            fields,
        })
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(
    row: &StringRecord,
    columns: &Columns,
    policy: FillPolicy,
    line: usize,
) -> Result<Record, LoadError> {
    let location = get_cell(row, Some(columns.location))
        .ok_or(LoadError::EmptyLocation { line })?
        .to_string();

    let date_raw = get_cell(row, Some(columns.date)).unwrap_or("");
    let date = parse_date(date_raw).ok_or_else(|| LoadError::InvalidDate {
        line,
        value: date_raw.to_string(),
    })?;

    let mut record = Record::new(location, date);
    record.continent = get_cell(row, columns.continent).map(str::to_string);

    for field in Field::ALL {
        let raw = get_cell(row, columns.fields.get(&field).copied());
        let value = parse_number(raw).map_err(|value| LoadError::InvalidNumber {
            line,
            column: field.column(),
            value,
        })?;
        let value = match value {
            None if policy.fills(field) => Some(0.0),
            other => other,
        };
        record.set_value(field, value);
    }

    Ok(record)
}

fn get_cell(row: &StringRecord, idx: Option<usize>) -> Option<&str> {
    row.get(idx?).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a numeric cell. Missing markers yield `Ok(None)`; anything else that
/// is not a finite number is returned as `Err(raw)`.
fn parse_number(raw: Option<&str>) -> Result<Option<f64>, String> {
    let Some(s) = raw else { return Ok(None) };
    if is_missing_marker(s) {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(s.to_string()),
    }
}

fn is_missing_marker(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "nan" | "na" | "n/a" | "null" | "none"
    )
}

/// Parse a calendar date.
///
/// ISO dates are the norm; `YYYY/MM/DD` and month-first `MM/DD/YYYY` or
/// `MM-DD-YYYY` are also accepted, as is an ISO date-time (the time part is
/// dropped).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let (head, tail) = (s.get(..10)?, s.get(10..)?);
    if tail.starts_with(' ') || tail.starts_with('T') {
        return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
    }
    None
}

/// Fill `target` with the trailing `window`-sample mean of `source`.
///
/// Rows are partitioned by location and ordered by date within each partition
/// (stable, so duplicate dates keep source order). The first `window - 1`
/// samples of every partition, and any window containing a missing value,
/// get `None`.
pub fn apply_rolling_mean(records: &mut [Record], source: Field, target: Field, window: usize) {
    let window = window.max(1);

    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| {
        records[a]
            .location
            .cmp(&records[b].location)
            .then(records[a].date.cmp(&records[b].date))
    });

    let mut smoothed: Vec<(usize, Option<f64>)> = Vec::with_capacity(records.len());
    for group in order.chunk_by(|&a, &b| records[a].location == records[b].location) {
        let values: Vec<Option<f64>> = group.iter().map(|&i| records[i].value(source)).collect();
        for (k, &idx) in group.iter().enumerate() {
            smoothed.push((idx, window_mean(&values, k, window)));
        }
    }

    for (idx, value) in smoothed {
        records[idx].set_value(target, value);
    }
}

fn window_mean(values: &[Option<f64>], end: usize, window: usize) -> Option<f64> {
    if end + 1 < window {
        return None;
    }
    let mut sum = 0.0;
    for v in &values[end + 1 - window..=end] {
        sum += (*v)?;
    }
    Some(sum / window as f64)
}
