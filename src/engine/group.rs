//! Grouping: per-date sums, per-location snapshots, continent rollups.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{ContinentDay, DailyTotals, Dataset, Field, Reading, Record};

/// The record with the latest date. Ties go to the one seen last.
///
/// `None` for an empty sequence; callers show "no data", not zeros.
pub fn latest_record<'a, I>(records: I) -> Option<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().fold(None, |best, r| match best {
        Some(b) if b.date > r.date => Some(b),
        _ => Some(r),
    })
}

/// Sum each of `fields` across records sharing a date.
///
/// One row per distinct date, ascending. Missing values count as 0 here only.
/// Repeated entries in `fields` are summed once.
pub fn group_sum_by_date<'a, I>(records: I, fields: &[Field]) -> Vec<DailyTotals>
where
    I: IntoIterator<Item = &'a Record>,
{
    let fields: BTreeSet<Field> = fields.iter().copied().collect();
    let mut by_date: BTreeMap<_, BTreeMap<Field, f64>> = BTreeMap::new();
    for r in records {
        let sums = by_date
            .entry(r.date)
            .or_insert_with(|| fields.iter().map(|&f| (f, 0.0)).collect());
        for &f in &fields {
            if let (Some(v), Some(acc)) = (r.value(f), sums.get_mut(&f)) {
                *acc += v;
            }
        }
    }

    by_date
        .into_iter()
        .map(|(date, sums)| DailyTotals { date, sums })
        .collect()
}

/// For each location, its latest record (ties: the one seen last).
pub fn latest_per_location<'a, I>(records: I) -> BTreeMap<String, &'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out: BTreeMap<String, &Record> = BTreeMap::new();
    for r in records {
        match out.get(&r.location) {
            Some(existing) if existing.date > r.date => {}
            _ => {
                out.insert(r.location.clone(), r);
            }
        }
    }
    out
}

/// Daily new cases/deaths per continent, from rows with a continent label.
pub fn continent_breakdown(ds: &Dataset) -> BTreeMap<String, Vec<ContinentDay>> {
    let mut grouped: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for r in ds.records() {
        if let Some(continent) = r.continent.as_deref() {
            grouped.entry(continent).or_default().push(r);
        }
    }

    grouped
        .into_iter()
        .map(|(continent, rows)| {
            let days = group_sum_by_date(rows, &[Field::NewCases, Field::NewDeaths])
                .into_iter()
                .map(|t| ContinentDay {
                    date: t.date,
                    new_cases: t.sum(Field::NewCases),
                    new_deaths: t.sum(Field::NewDeaths),
                })
                .collect();
            (continent.to_string(), days)
        })
        .collect()
}

/// For each location, the most recent non-null value of `field`.
///
/// Locations that never report the field are left out.
pub fn latest_reported<'a, I>(records: I, field: Field) -> BTreeMap<String, Reading>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out: BTreeMap<String, Reading> = BTreeMap::new();
    for r in records {
        let Some(value) = r.value(field) else { continue };
        match out.get(&r.location) {
            Some(existing) if existing.date > r.date => {}
            _ => {
                out.insert(
                    r.location.clone(),
                    Reading {
                        location: r.location.clone(),
                        date: r.date,
                        value,
                    },
                );
            }
        }
    }
    out
}

/// Top `n` locations by their latest reported `field`, highest first.
///
/// Equal values are ordered by location name.
pub fn top_latest_reported<'a, I>(records: I, field: Field, n: usize) -> Vec<Reading>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut readings: Vec<Reading> = latest_reported(records, field).into_values().collect();
    readings.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.location.cmp(&b.location))
    });
    readings.truncate(n);
    readings
}
