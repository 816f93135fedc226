//! Row selection: by location, by date range, and country-only views.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::domain::{DailyTotals, Dataset, Record, WORLD};

/// Records of `location` dated within `[start, end]`, ascending by date.
///
/// Records sharing a date keep their source order. An empty result is valid.
pub fn filter_by_location_and_range<'a>(
    ds: &'a Dataset,
    location: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&'a Record> {
    let mut out: Vec<&Record> = ds
        .records()
        .iter()
        .filter(|r| r.location == location && r.date >= start && r.date <= end)
        .collect();
    out.sort_by_key(|r| r.date);
    out
}

/// Records whose location is in `locations`, in source order.
pub fn filter_by_locations<'a, I, S>(ds: &'a Dataset, locations: I) -> Vec<&'a Record>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let wanted: HashSet<String> = locations
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect();
    ds.records()
        .iter()
        .filter(|r| wanted.contains(&r.location))
        .collect()
}

/// Whether `location` is a rollup row (a continent name or "World").
pub fn is_pseudo_location(ds: &Dataset, location: &str) -> bool {
    location == WORLD || ds.continents().contains(location)
}

/// Every distinct location, sorted.
pub fn locations(ds: &Dataset) -> Vec<String> {
    let set: BTreeSet<&str> = ds.records().iter().map(|r| r.location.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Distinct locations that are countries (pseudo-locations removed), sorted.
pub fn countries(ds: &Dataset) -> Vec<String> {
    locations(ds)
        .into_iter()
        .filter(|l| !is_pseudo_location(ds, l))
        .collect()
}

/// All records of country locations, in source order.
pub fn country_records(ds: &Dataset) -> Vec<&Record> {
    ds.records()
        .iter()
        .filter(|r| !is_pseudo_location(ds, &r.location))
        .collect()
}

/// Earliest and latest date in `records`.
pub fn date_bounds<'a, I>(records: I) -> Option<(NaiveDate, NaiveDate)>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().fold(None, |acc, r| match acc {
        None => Some((r.date, r.date)),
        Some((lo, hi)) => Some((lo.min(r.date), hi.max(r.date))),
    })
}

/// Daily rows dated within `[start, end]`.
pub fn within_dates(totals: &[DailyTotals], start: NaiveDate, end: NaiveDate) -> Vec<DailyTotals> {
    totals
        .iter()
        .filter(|t| t.date >= start && t.date <= end)
        .cloned()
        .collect()
}
