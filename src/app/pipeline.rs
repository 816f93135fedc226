//! Shared "screen pipeline" logic used by every front-end.
//!
//! Each function takes the loaded dataset plus a (possibly partial) user
//! selection, fills in the defaults the dashboard uses, and runs the
//! aggregation engine:
//! selection -> defaults -> filter -> group/aggregate -> view
//!
//! Front-ends then only deal with presentation (text, JSON, CSV).

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{
    ContinentDay, CorrelationMatrix, DailyTotals, Dataset, Field, Metric, Peak, Reading, Record,
    SummaryStats,
};
use crate::engine;
use crate::error::AppError;

/// Length of the default overview window, ending on the latest date.
pub const OVERVIEW_DEFAULT_DAYS: u64 = 30;

/// Countries preselected on the comparison screen.
pub const COMPARE_DEFAULT_COUNT: usize = 5;

/// Fields correlated against each other on the comparison screen.
pub const CORRELATION_FIELDS: [Field; 4] = [
    Field::TotalCasesPerMillion,
    Field::TotalDeathsPerMillion,
    Field::IcuPatientsPerMillion,
    Field::PeopleFullyVaccinatedPerHundred,
];

/// Fields shown (and exported) by the overview screen.
pub const OVERVIEW_FIELDS: [Field; 9] = [
    Field::NewCasesSmoothed,
    Field::NewDeathsSmoothed,
    Field::PeopleFullyVaccinatedPerHundred,
    Field::TotalVaccinations,
    Field::PeopleFullyVaccinated,
    Field::TotalCases,
    Field::TotalDeaths,
    Field::IcuPatients,
    Field::TotalTestsPerThousand,
];

/// Daily global sums computed by the summary screen.
pub const SUMMARY_FIELDS: [Field; 4] = [
    Field::NewCases,
    Field::NewDeaths,
    Field::PeopleFullyVaccinated,
    Field::IcuPatients,
];

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub latest_date: Option<NaiveDate>,
    pub total_cases: f64,
    pub total_deaths: f64,
    pub locations_tracked: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewView<'a> {
    pub location: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Rows in range, ascending by date.
    pub rows: Vec<&'a Record>,
    /// Latest row in range; `None` renders as "No data".
    pub latest: Option<&'a Record>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareView<'a> {
    pub metric: Metric,
    pub countries: Vec<String>,
    pub rows: Vec<&'a Record>,
    /// Metric value of each country's latest row.
    pub latest: BTreeMap<String, Option<f64>>,
    pub correlation: CorrelationMatrix,
    pub stats: BTreeMap<String, SummaryStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Country-only daily sums of `SUMMARY_FIELDS` within the range.
    pub daily: Vec<DailyTotals>,
    pub total_cases: f64,
    pub total_deaths: f64,
    /// Percent; `None` when there were no cases.
    pub death_rate: Option<f64>,
    /// ICU patients on the last day of the range.
    pub current_icu: Option<f64>,
    pub peak_cases: Option<Peak>,
    pub peak_deaths: Option<Peak>,
    pub avg_daily_cases: Option<f64>,
    pub avg_daily_deaths: Option<f64>,
    pub top_vaccinated: Vec<Reading>,
    pub continents: BTreeMap<String, Vec<ContinentDay>>,
}

/// Landing screen figures. Sums run over every row, rollups included.
pub fn home_view(ds: &Dataset) -> HomeView {
    let totals = engine::group_sum_by_date(ds.records(), &[Field::NewCases, Field::NewDeaths]);
    HomeView {
        latest_date: totals.last().map(|t| t.date),
        total_cases: engine::column_total(&totals, Field::NewCases),
        total_deaths: engine::column_total(&totals, Field::NewDeaths),
        locations_tracked: engine::locations(ds).len(),
    }
}

/// Overview of one location over a date range.
pub fn overview_view<'a>(
    ds: &'a Dataset,
    country: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<OverviewView<'a>, AppError> {
    if ds.is_empty() {
        return Err(AppError::new(3, "Dataset has no rows."));
    }
    let locations = engine::locations(ds);
    let location = match country {
        Some(c) => c.to_string(),
        None => locations
            .first()
            .cloned()
            .ok_or_else(|| AppError::new(3, "Dataset has no rows."))?,
    };
    if !locations.contains(&location) {
        warn!(%location, "location not present in dataset");
    }

    let (_, max_date) =
        engine::date_bounds(ds.records()).ok_or_else(|| AppError::new(3, "Dataset has no rows."))?;
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => {
            ensure_ordered(s, e)?;
            (s, e)
        }
        // A defaulted end never precedes an explicit start.
        (Some(s), None) => (s, max_date.max(s)),
        (None, e) => {
            let e = e.unwrap_or(max_date);
            let s = e
                .checked_sub_days(Days::new(OVERVIEW_DEFAULT_DAYS))
                .unwrap_or(e);
            (s, e)
        }
    };

    let rows = engine::filter_by_location_and_range(ds, &location, start, end);
    let latest = engine::latest_record(rows.iter().copied());
    debug!(%location, %start, %end, rows = rows.len(), "overview selection");

    Ok(OverviewView {
        location,
        start,
        end,
        rows,
        latest,
    })
}

/// Multi-country comparison on one metric.
pub fn compare_view<'a>(ds: &'a Dataset, countries: &[String], metric: Metric) -> CompareView<'a> {
    let countries: Vec<String> = if countries.is_empty() {
        engine::countries(ds)
            .into_iter()
            .take(COMPARE_DEFAULT_COUNT)
            .collect()
    } else {
        countries.to_vec()
    };

    let known = engine::locations(ds);
    for c in &countries {
        if !known.contains(c) {
            warn!(country = %c, "country not present in dataset");
        }
    }

    let rows = engine::filter_by_locations(ds, &countries);
    let field = metric.field();
    let latest = engine::latest_per_location(rows.iter().copied())
        .into_iter()
        .map(|(location, r)| (location, r.value(field)))
        .collect();
    let correlation = engine::correlation_matrix(rows.iter().copied(), &CORRELATION_FIELDS);
    let stats = engine::summary_stats(rows.iter().copied(), field);
    debug!(countries = countries.len(), rows = rows.len(), ?metric, "comparison selection");

    CompareView {
        metric,
        countries,
        rows,
        latest,
        correlation,
        stats,
    }
}

/// Country-only global summary over a date range.
pub fn summary_view(
    ds: &Dataset,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    top_n: usize,
) -> Result<SummaryView, AppError> {
    let countries = engine::country_records(ds);
    let global = engine::group_sum_by_date(countries, &SUMMARY_FIELDS);

    let first = global.first().map(|t| t.date);
    let last = global.last().map(|t| t.date);
    // Only a range the caller spelled out in full can be inverted; a defaulted
    // bound is clamped to the explicit one.
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => {
            ensure_ordered(s, e)?;
            (Some(s), Some(e))
        }
        (Some(s), None) => (Some(s), last.map(|l| l.max(s))),
        (None, Some(e)) => (first.map(|f| f.min(e)), Some(e)),
        (None, None) => (first, last),
    };
    let daily = match (start, end) {
        (Some(s), Some(e)) => engine::within_dates(&global, s, e),
        _ => Vec::new(),
    };

    let total_cases = engine::column_total(&daily, Field::NewCases);
    let total_deaths = engine::column_total(&daily, Field::NewDeaths);

    Ok(SummaryView {
        start,
        end,
        total_cases,
        total_deaths,
        death_rate: engine::death_rate(total_deaths, total_cases),
        current_icu: daily.last().map(|t| t.sum(Field::IcuPatients)),
        peak_cases: engine::peak(&daily, Field::NewCases),
        peak_deaths: engine::peak(&daily, Field::NewDeaths),
        avg_daily_cases: engine::daily_mean(&daily, Field::NewCases),
        avg_daily_deaths: engine::daily_mean(&daily, Field::NewDeaths),
        top_vaccinated: engine::top_latest_reported(
            ds.records(),
            Field::PeopleFullyVaccinatedPerHundred,
            top_n,
        ),
        continents: engine::continent_breakdown(ds),
        daily,
    })
}

fn ensure_ordered(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::new(
            3,
            format!("Start date {start} is after end date {end}."),
        ));
    }
    Ok(())
}
