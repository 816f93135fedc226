use std::fs;
use std::path::Path;

use chrono::{Days, NaiveDate};

use covid_explorer::app::pipeline::{self, OVERVIEW_FIELDS};
use covid_explorer::cache::DatasetCache;
use covid_explorer::domain::{Field, FillPolicy, Metric};
use covid_explorer::engine;
use covid_explorer::io::{export, ingest};
use covid_explorer::report;

const SOURCE: &str = "\
iso_code,continent,location,date,new_cases,new_deaths,total_cases,total_deaths,people_fully_vaccinated_per_hundred
USA,North America,United States,2021-01-01,100,2,100,2,1.5
USA,North America,United States,2021-01-02,200,3,300,5,2.5
FRA,Europe,France,2021-01-01,50,1,50,1,4.0
OWID_WRL,,World,2021-01-01,150,3,150,3,
OWID_WRL,,World,2021-01-02,200,3,350,6,
";

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, m, d).expect("valid date")
}

fn write_source(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("covid_data.csv");
    fs::write(&path, SOURCE).expect("failed writing source csv");
    path
}

#[test]
fn group_sum_adds_locations_per_date() {
    let csv = "location,date,new_cases,new_deaths,total_cases,total_deaths\n\
               US,2021-01-01,100,0,100,0\n\
               US,2021-01-02,200,0,300,0\n\
               FR,2021-01-01,50,0,50,0\n";
    let ds = ingest::load_from_reader(csv.as_bytes(), FillPolicy::Core).expect("load");

    let totals = engine::group_sum_by_date(ds.records(), &[Field::NewCases]);
    let sums: Vec<_> = totals.iter().map(|t| (t.date, t.sum(Field::NewCases))).collect();
    assert_eq!(sums, vec![(day(1, 1), 150.0), (day(1, 2), 200.0)]);

    let first = day(1, 1);
    let before = engine::filter_by_location_and_range(
        &ds,
        "US",
        first - Days::new(30),
        first - Days::new(1),
    );
    assert!(before.is_empty());
}

#[test]
fn home_screen_counts_every_location() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = write_source(temp.path());
    let cache = DatasetCache::new();

    let ds = cache.get_or_load(&path, FillPolicy::Core).expect("load");
    let view = pipeline::home_view(&ds);
    assert_eq!(view.latest_date, Some(day(1, 2)));
    assert_eq!(view.total_cases, 700.0);
    assert_eq!(view.locations_tracked, 3);

    let json = serde_json::to_value(&view).expect("serialize");
    assert_eq!(json["total_deaths"], 12.0);
    assert!(report::format_home(&view).contains("Countries Tracked"));
}

#[test]
fn summary_screen_excludes_world_rollup() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = write_source(temp.path());
    let cache = DatasetCache::new();
    let ds = cache.get_or_load(&path, FillPolicy::Extended).expect("load");

    let view = pipeline::summary_view(&ds, None, None, 2).expect("summary");
    assert_eq!(view.total_cases, 350.0);
    assert_eq!(view.total_deaths, 6.0);
    let rate = view.death_rate.expect("defined death rate");
    assert!((rate - 6.0 / 350.0 * 100.0).abs() < 1e-9);

    let peak = view.peak_cases.as_ref().expect("peak");
    assert_eq!((peak.value, peak.date), (200.0, day(1, 2)));

    let leaders: Vec<_> = view.top_vaccinated.iter().map(|r| r.location.as_str()).collect();
    assert_eq!(leaders, vec!["France", "United States"]);
    assert_eq!(view.continents.len(), 2);

    let out = temp.path().join("daily.csv");
    export::write_daily_totals_csv(&out, &view.daily, &pipeline::SUMMARY_FIELDS).expect("export");
    let text = fs::read_to_string(&out).expect("read export");
    assert_eq!(
        text.lines().next(),
        Some("date,new_cases,new_deaths,people_fully_vaccinated,icu_patients")
    );
    assert_eq!(text.lines().nth(1), Some("2021-01-01,150,3,0,0"));
}

#[test]
fn overview_of_range_before_first_record_is_empty() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = write_source(temp.path());
    let cache = DatasetCache::new();
    let ds = cache.get_or_load(&path, FillPolicy::Extended).expect("load");

    let first = day(1, 1);
    let view = pipeline::overview_view(
        &ds,
        Some("United States"),
        Some(first - Days::new(40)),
        Some(first - Days::new(10)),
    )
    .expect("overview");
    assert!(view.rows.is_empty());
    assert!(view.latest.is_none());
    assert!(report::format_overview(&view).contains("No data"));

    let view = pipeline::overview_view(&ds, Some("United States"), None, None).expect("overview");
    assert_eq!(view.rows.len(), 2);
    let out = temp.path().join("overview.csv");
    export::write_records_csv(&out, &view.rows, &OVERVIEW_FIELDS).expect("export");
    let text = fs::read_to_string(&out).expect("read export");
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn compare_screen_defaults_to_countries() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = write_source(temp.path());
    let cache = DatasetCache::new();
    let ds = cache.get_or_load(&path, FillPolicy::Extended).expect("load");

    let view = pipeline::compare_view(&ds, &[], Metric::VaccinationRate);
    assert_eq!(view.countries, vec!["France", "United States"]);
    assert_eq!(view.latest["United States"], Some(2.5));

    let n = view.correlation.fields.len();
    for i in 0..n {
        assert_eq!(view.correlation.get(i, i), Some(1.0));
        for j in 0..n {
            assert_eq!(view.correlation.get(i, j), view.correlation.get(j, i));
        }
    }

    let us = view.stats["United States"];
    assert_eq!(us.count, 2);
    assert_eq!(us.mean, Some(2.0));
    let fr = view.stats["France"];
    assert_eq!(fr.std_dev, None);
}
