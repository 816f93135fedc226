//! Formatted terminal output for each screen.
//!
//! We keep formatting code in one place so:
//! - the loader/engine code stays free of presentation concerns
//! - sentinel rendering ("No data", "undefined") is decided in one spot

use crate::app::pipeline::{CompareView, HomeView, OverviewView, SummaryView};
use crate::domain::{Field, Peak, Record};

/// Shown wherever a value is absent.
pub const NO_DATA: &str = "No data";

/// Shown for a ratio whose denominator is zero.
pub const UNDEFINED: &str = "undefined";

pub fn format_home(view: &HomeView) -> String {
    let mut out = String::new();

    out.push_str("=== COVID-19 Global Data ===\n");
    out.push_str(&format!(
        "Last updated: {}\n\n",
        view.latest_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| NO_DATA.to_string())
    ));
    out.push_str(&format!("{:<20} {:>16}\n", "Total Cases", fmt_count(view.total_cases)));
    out.push_str(&format!("{:<20} {:>16}\n", "Total Deaths", fmt_count(view.total_deaths)));
    out.push_str(&format!(
        "{:<20} {:>16}\n",
        "Countries Tracked",
        fmt_count(view.locations_tracked as f64)
    ));

    out
}

pub fn format_overview(view: &OverviewView<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Overview: {} ({} .. {}) ===\n",
        view.location, view.start, view.end
    ));

    out.push_str("\nCases and deaths (7-day avg) / vaccination progress:\n");
    if view.rows.is_empty() {
        out.push_str(NO_DATA);
        out.push('\n');
    } else {
        out.push_str(&row_line(&[
            ("date", 10),
            ("new_cases", 14),
            ("new_deaths", 12),
            ("fully_vax_%", 12),
        ]));
        out.push_str(&rule(&[10, 14, 12, 12]));
        for r in &view.rows {
            out.push_str(
                format!(
                    "{:<10} {:>14} {:>12} {:>12}\n",
                    r.date,
                    fmt_opt(r.new_cases_smoothed, 1),
                    fmt_opt(r.new_deaths_smoothed, 1),
                    fmt_opt(r.people_fully_vaccinated_per_hundred, 2),
                )
                .trim_end(),
            );
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "\nKey figures (latest record: {}):\n",
        view.latest
            .map(|r| r.date.to_string())
            .unwrap_or_else(|| NO_DATA.to_string())
    ));
    let figures = [
        (Field::TotalVaccinations, 0),
        (Field::PeopleFullyVaccinated, 0),
        (Field::TotalCases, 0),
        (Field::TotalDeaths, 0),
        (Field::IcuPatients, 0),
        (Field::TotalTestsPerThousand, 1),
    ];
    for (field, decimals) in figures {
        out.push_str(&format!(
            "  {:<26} {:>16}\n",
            field.label(),
            latest_figure(view.latest, field, decimals)
        ));
    }

    out
}

pub fn format_compare(view: &CompareView<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Comparison: {} ===\n", view.metric.label()));
    out.push_str(&format!("Countries: {}\n", view.countries.join(", ")));

    out.push_str("\nLatest values:\n");
    out.push_str(&row_line(&[("location", 24), ("value", 16)]));
    out.push_str(&rule(&[24, 16]));
    for (location, value) in &view.latest {
        out.push_str(&format!("{:<24} {:>16}\n", truncate(location, 24), fmt_opt(*value, 2)));
    }

    out.push_str("\nCorrelation (latest row per country):\n");
    let labels: Vec<String> = view
        .correlation
        .fields
        .iter()
        .map(|f| truncate(f.label(), 12))
        .collect();
    let mut header = format!("{:<12}", "");
    for l in &labels {
        header.push_str(&format!(" {l:>12}"));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    for (i, l) in labels.iter().enumerate() {
        let mut line = format!("{l:<12}");
        for j in 0..labels.len() {
            let cell = view
                .correlation
                .get(i, j)
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "n/a".to_string());
            line.push_str(&format!(" {cell:>12}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str("\nSummary statistics:\n");
    out.push_str(&row_line(&[
        ("location", 24),
        ("mean", 12),
        ("min", 12),
        ("max", 12),
        ("std_dev", 12),
    ]));
    out.push_str(&rule(&[24, 12, 12, 12, 12]));
    for (location, s) in &view.stats {
        out.push_str(&format!(
            "{:<24} {:>12} {:>12} {:>12} {:>12}\n",
            truncate(location, 24),
            fmt_opt(s.mean, 2),
            fmt_opt(s.min, 2),
            fmt_opt(s.max, 2),
            fmt_opt(s.std_dev, 2),
        ));
    }

    out
}

pub fn format_summary(view: &SummaryView) -> String {
    let mut out = String::new();

    let range = match (view.start, view.end) {
        (Some(s), Some(e)) => format!("{s} .. {e}"),
        _ => NO_DATA.to_string(),
    };
    out.push_str(&format!("=== Global Summary ({range}) ===\n"));

    out.push_str(&format!("{:<22} {:>16}\n", "Total Cases", fmt_count(view.total_cases)));
    out.push_str(&format!("{:<22} {:>16}\n", "Total Deaths", fmt_count(view.total_deaths)));
    out.push_str(&format!(
        "{:<22} {:>16}\n",
        "Death Rate",
        view.death_rate
            .map(|r| format!("{r:.2}%"))
            .unwrap_or_else(|| UNDEFINED.to_string())
    ));
    out.push_str(&format!(
        "{:<22} {:>16}\n",
        "Current ICU Patients",
        fmt_opt_count(view.current_icu)
    ));

    out.push_str("\nKey insights:\n");
    let peak_line = |label: &str, peak: &Option<Peak>| match peak {
        Some(p) => format!("- Peak daily {label}: {} on {}\n", fmt_count(p.value), p.date),
        None => format!("- Peak daily {label}: {NO_DATA}\n"),
    };
    out.push_str(&peak_line("cases", &view.peak_cases));
    out.push_str(&peak_line("deaths", &view.peak_deaths));
    out.push_str(&format!(
        "- Average daily cases: {}\n",
        fmt_opt_count(view.avg_daily_cases)
    ));
    out.push_str(&format!(
        "- Average daily deaths: {}\n",
        fmt_opt_count(view.avg_daily_deaths)
    ));

    out.push_str(&format!(
        "\nVaccination rate by location (top {}):\n",
        view.top_vaccinated.len()
    ));
    out.push_str(&row_line(&[("location", 24), ("fully_vax_%", 12), ("as_of", 10)]));
    out.push_str(&rule(&[24, 12, 10]));
    for r in &view.top_vaccinated {
        out.push_str(&format!(
            "{:<24} {:>12.2} {:<10}\n",
            truncate(&r.location, 24),
            r.value,
            r.date
        ));
    }

    out.push_str("\nBy continent (latest day):\n");
    out.push_str(&row_line(&[
        ("continent", 16),
        ("date", 10),
        ("new_cases", 14),
        ("new_deaths", 12),
    ]));
    out.push_str(&rule(&[16, 10, 14, 12]));
    for (continent, days) in &view.continents {
        if let Some(d) = days.last() {
            out.push_str(&format!(
                "{:<16} {:<10} {:>14} {:>12}\n",
                truncate(continent, 16),
                d.date,
                fmt_count(d.new_cases),
                fmt_count(d.new_deaths)
            ));
        }
    }

    out
}

fn latest_figure(latest: Option<&Record>, field: Field, decimals: usize) -> String {
    match latest.and_then(|r| r.value(field)) {
        Some(v) if decimals == 0 => fmt_count(v),
        Some(v) => fmt_grouped(v, decimals),
        None => NO_DATA.to_string(),
    }
}

fn row_line(cols: &[(&str, usize)]) -> String {
    let mut line = String::new();
    for (i, &(name, width)) in cols.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        if i == 0 {
            line.push_str(&format!("{name:<width$}"));
        } else {
            line.push_str(&format!("{name:>width$}"));
        }
    }
    format!("{}\n", line.trim_end())
}

fn rule(widths: &[usize]) -> String {
    let parts: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    format!("{}\n", parts.join(" "))
}

/// Whole number with thousands separators.
pub fn fmt_count(v: f64) -> String {
    fmt_grouped(v, 0)
}

fn fmt_opt_count(v: Option<f64>) -> String {
    v.map(fmt_count).unwrap_or_else(|| NO_DATA.to_string())
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| format!("{x:.decimals$}"))
        .unwrap_or_else(|| NO_DATA.to_string())
}

/// Fixed-point number with thousands separators in the integer part.
pub fn fmt_grouped(v: f64, decimals: usize) -> String {
    let raw = format!("{:.decimals$}", v.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = v < 0.0 && raw.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn grouped_numbers() {
        assert_eq!(fmt_count(0.0), "0");
        assert_eq!(fmt_count(999.0), "999");
        assert_eq!(fmt_count(1234567.4), "1,234,567");
        assert_eq!(fmt_grouped(-12345.678, 1), "-12,345.7");
        assert_eq!(fmt_grouped(-0.04, 1), "0.0");
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("France", 10), "France");
        assert_eq!(truncate("Democratic Republic of Congo", 10), "Democrati.");
    }

    #[test]
    fn summary_renders_undefined_death_rate() {
        let view = SummaryView {
            start: None,
            end: None,
            daily: Vec::new(),
            total_cases: 0.0,
            total_deaths: 0.0,
            death_rate: None,
            current_icu: None,
            peak_cases: None,
            peak_deaths: None,
            avg_daily_cases: None,
            avg_daily_deaths: None,
            top_vaccinated: Vec::new(),
            continents: Default::default(),
        };
        let txt = format_summary(&view);
        assert!(txt.contains("Death Rate                    undefined"));
        assert!(txt.contains("Current ICU Patients            No data"));
        assert!(!txt.contains("NaN"));
    }

    #[test]
    fn overview_shows_no_data_without_latest_record() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let view = OverviewView {
            location: "Chile".to_string(),
            start: d,
            end: d,
            rows: Vec::new(),
            latest: None,
        };
        let txt = format_overview(&view);
        assert!(txt.contains("Key figures (latest record: No data)"));
        assert!(txt.contains("Total Cases"));
        assert!(!txt.contains(" 0\n"));
    }
}
