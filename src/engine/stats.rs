//! Statistics over records and daily series.
//!
//! Everything here is total: sparse input produces `None` cells rather than
//! errors, and `NaN`/`inf` never escape to callers.

use std::collections::BTreeMap;

use statrs::statistics::Statistics;

use crate::domain::{CorrelationMatrix, DailyTotals, Field, Peak, Record, SummaryStats};
use crate::engine::group::latest_per_location;

/// Joint samples a correlation cell needs before it is reported.
pub const MIN_CORRELATION_SAMPLES: usize = 2;

/// Pearson correlation between every pair of `fields`, one sample per location.
///
/// Samples are the latest record of each location. Each cell uses the
/// locations where both fields are present (pairwise-complete). The diagonal is
/// always 1.0 and the matrix is symmetric.
pub fn correlation_matrix<'a, I>(records: I, fields: &[Field]) -> CorrelationMatrix
where
    I: IntoIterator<Item = &'a Record>,
{
    let latest = latest_per_location(records);
    let n = fields.len();
    let mut cells = vec![vec![None; n]; n];

    for i in 0..n {
        cells[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = latest
                .values()
                .filter_map(|r| Some((r.value(fields[i])?, r.value(fields[j])?)))
                .unzip();
            let r = pearson(&xs, &ys);
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }

    CorrelationMatrix {
        fields: fields.to_vec(),
        cells,
    }
}

/// Pearson correlation coefficient; `None` when undefined.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < MIN_CORRELATION_SAMPLES {
        return None;
    }
    let sx = xs.iter().std_dev();
    let sy = ys.iter().std_dev();
    if !(sx > 0.0 && sy > 0.0) {
        return None;
    }
    let r = xs.iter().covariance(ys.iter()) / (sx * sy);
    finite(r).map(|r| r.clamp(-1.0, 1.0))
}

/// Mean/min/max/sample-std of `field`, grouped by location.
///
/// Only non-null values count. A group with one observation has no standard
/// deviation; a group with none has no mean, min or max either.
pub fn summary_stats<'a, I>(records: I, field: Field) -> BTreeMap<String, SummaryStats>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in records {
        let values = groups.entry(r.location.clone()).or_default();
        if let Some(v) = r.value(field) {
            values.push(v);
        }
    }

    groups
        .into_iter()
        .map(|(location, values)| (location, describe(&values)))
        .collect()
}

/// Descriptive statistics of one sample.
pub fn describe(values: &[f64]) -> SummaryStats {
    if values.is_empty() {
        return SummaryStats {
            count: 0,
            mean: None,
            min: None,
            max: None,
            std_dev: None,
        };
    }

    SummaryStats {
        count: values.len(),
        mean: finite(values.iter().mean()),
        min: finite(Statistics::min(values.iter())),
        max: finite(Statistics::max(values.iter())),
        std_dev: if values.len() < 2 {
            None
        } else {
            finite(values.iter().std_dev())
        },
    }
}

/// Largest value of `field` in a daily series, with the date(s) it occurred.
///
/// The reported `date` is the earliest of the tied dates.
pub fn peak(series: &[DailyTotals], field: Field) -> Option<Peak> {
    let value = series
        .iter()
        .map(|t| t.sum(field))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))?;

    let mut dates: Vec<_> = series
        .iter()
        .filter(|t| t.sum(field) == value)
        .map(|t| t.date)
        .collect();
    dates.sort();
    let date = *dates.first()?;

    Some(Peak { value, date, dates })
}

/// Sum of `field` across a daily series.
pub fn column_total(series: &[DailyTotals], field: Field) -> f64 {
    series.iter().map(|t| t.sum(field)).sum()
}

/// Mean of `field` across a daily series; `None` when the series is empty.
pub fn daily_mean(series: &[DailyTotals], field: Field) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let values: Vec<f64> = series.iter().map(|t| t.sum(field)).collect();
    finite(values.iter().mean())
}

/// Deaths as a percentage of cases; `None` ("undefined") on a zero denominator.
pub fn death_rate(deaths: f64, cases: f64) -> Option<f64> {
    if cases == 0.0 {
        return None;
    }
    finite(deaths / cases * 100.0)
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn country(location: &str, cases_pm: f64, deaths_pm: Option<f64>) -> Record {
        let mut r = Record::new(location, day(1));
        r.total_cases_per_million = Some(cases_pm);
        r.total_deaths_per_million = deaths_pm;
        r
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let rows = vec![
            country("A", 1.0, Some(2.0)),
            country("B", 2.0, Some(4.5)),
            country("C", 3.0, Some(5.0)),
            country("D", 4.0, None),
        ];
        let fields = [
            Field::TotalCasesPerMillion,
            Field::TotalDeathsPerMillion,
            Field::IcuPatientsPerMillion,
        ];
        let m = correlation_matrix(&rows, &fields);

        for i in 0..fields.len() {
            assert_eq!(m.get(i, i), Some(1.0));
            for j in 0..fields.len() {
                assert_eq!(m.cells[i][j], m.cells[j][i]);
            }
        }
        let r = m.get(0, 1).unwrap();
        assert!(r > 0.9 && r <= 1.0);
        // No location reports ICU data.
        assert_eq!(m.get(0, 2), None);
    }

    #[test]
    fn correlation_uses_latest_row_per_location() {
        let mut old = country("A", 100.0, Some(0.0));
        old.date = day(1);
        let mut new = country("A", 1.0, Some(1.0));
        new.date = day(2);
        let rows = vec![old, new, country("B", 2.0, Some(2.0))];
        // Latest rows are perfectly correlated; the stale row would break that.
        let m = correlation_matrix(&rows, &[Field::TotalCasesPerMillion, Field::TotalDeathsPerMillion]);
        assert!((m.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_needs_two_samples_and_variance() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[1.0, 1.0], &[2.0, 3.0]), None);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_observation_has_no_std_dev() {
        let mut a = Record::new("A", day(1));
        a.new_cases_smoothed = Some(5.0);
        let stats = summary_stats([&a], Field::NewCasesSmoothed);
        let s = stats["A"];
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, Some(5.0));
        assert_eq!(s.std_dev, None);
    }

    #[test]
    fn summary_stats_ignore_missing_values() {
        let rows: Vec<Record> = [Some(2.0), None, Some(4.0), Some(6.0)]
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let mut r = Record::new("A", day(i as u32 + 1));
                r.icu_patients = v;
                r
            })
            .collect();
        let mut empty = Record::new("B", day(1));
        empty.icu_patients = None;

        let stats = summary_stats(rows.iter().chain([&empty]), Field::IcuPatients);
        let a = stats["A"];
        assert_eq!((a.count, a.mean, a.min, a.max), (3, Some(4.0), Some(2.0), Some(6.0)));
        assert!((a.std_dev.unwrap() - 2.0).abs() < 1e-12);

        let b = stats["B"];
        assert_eq!((b.count, b.mean, b.std_dev), (0, None, None));
    }

    fn series(values: &[f64]) -> Vec<DailyTotals> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DailyTotals {
                date: day(i as u32 + 1),
                sums: [(Field::NewCases, v)].into_iter().collect(),
            })
            .collect()
    }

    #[test]
    fn peak_ties_pick_earliest_date() {
        let p = peak(&series(&[3.0, 9.0, 1.0, 9.0]), Field::NewCases).unwrap();
        assert_eq!(p.value, 9.0);
        assert_eq!(p.date, day(2));
        assert_eq!(p.dates, vec![day(2), day(4)]);
        assert_eq!(peak(&[], Field::NewCases), None);
    }

    #[test]
    fn death_rate_is_undefined_without_cases() {
        assert_eq!(death_rate(0.0, 0.0), None);
        assert_eq!(death_rate(5.0, 0.0), None);
        assert_eq!(death_rate(2.0, 100.0), Some(2.0));
    }

    #[test]
    fn daily_mean_and_total() {
        let s = series(&[1.0, 2.0, 6.0]);
        assert_eq!(column_total(&s, Field::NewCases), 9.0);
        assert_eq!(daily_mean(&s, Field::NewCases), Some(3.0));
        assert_eq!(daily_mean(&[], Field::NewCases), None);
    }
}
