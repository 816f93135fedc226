//! Shared domain types.
//!
//! These types are kept plain and serializable so they can be:
//!
//! - shared read-only between the loader, the engine and the report layer
//! - printed as JSON by the CLI (`--json`)
//! - compared for equality (a reload of identical bytes yields an equal `Dataset`)

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

/// Location name of the global rollup row.
pub const WORLD: &str = "World";

/// Every numeric column of the dataset.
///
/// The first four are the core fields: they are always filled at load time and
/// `Record::value` never returns `None` for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    NewCases,
    NewDeaths,
    TotalCases,
    TotalDeaths,
    IcuPatients,
    HospPatients,
    TotalVaccinations,
    PeopleFullyVaccinated,
    PeopleFullyVaccinatedPerHundred,
    TotalTestsPerThousand,
    TotalCasesPerMillion,
    TotalDeathsPerMillion,
    IcuPatientsPerMillion,
    HospPatientsPerMillion,
    Population,
    NewCasesSmoothed,
    NewDeathsSmoothed,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::NewCases,
        Field::NewDeaths,
        Field::TotalCases,
        Field::TotalDeaths,
        Field::IcuPatients,
        Field::HospPatients,
        Field::TotalVaccinations,
        Field::PeopleFullyVaccinated,
        Field::PeopleFullyVaccinatedPerHundred,
        Field::TotalTestsPerThousand,
        Field::TotalCasesPerMillion,
        Field::TotalDeathsPerMillion,
        Field::IcuPatientsPerMillion,
        Field::HospPatientsPerMillion,
        Field::Population,
        Field::NewCasesSmoothed,
        Field::NewDeathsSmoothed,
    ];

    /// Fields that are never null after loading, whatever the fill policy.
    pub const CORE: [Field; 4] = [
        Field::NewCases,
        Field::NewDeaths,
        Field::TotalCases,
        Field::TotalDeaths,
    ];

    /// Fields zero-filled only under `FillPolicy::Extended`.
    pub const EXTENDED_FILL: [Field; 5] = [
        Field::IcuPatients,
        Field::TotalVaccinations,
        Field::PeopleFullyVaccinated,
        Field::PeopleFullyVaccinatedPerHundred,
        Field::TotalTestsPerThousand,
    ];

    /// Column name in the source CSV.
    pub fn column(self) -> &'static str {
        match self {
            Field::NewCases => "new_cases",
            Field::NewDeaths => "new_deaths",
            Field::TotalCases => "total_cases",
            Field::TotalDeaths => "total_deaths",
            Field::IcuPatients => "icu_patients",
            Field::HospPatients => "hosp_patients",
            Field::TotalVaccinations => "total_vaccinations",
            Field::PeopleFullyVaccinated => "people_fully_vaccinated",
            Field::PeopleFullyVaccinatedPerHundred => "people_fully_vaccinated_per_hundred",
            Field::TotalTestsPerThousand => "total_tests_per_thousand",
            Field::TotalCasesPerMillion => "total_cases_per_million",
            Field::TotalDeathsPerMillion => "total_deaths_per_million",
            Field::IcuPatientsPerMillion => "icu_patients_per_million",
            Field::HospPatientsPerMillion => "hosp_patients_per_million",
            Field::Population => "population",
            Field::NewCasesSmoothed => "new_cases_smoothed",
            Field::NewDeathsSmoothed => "new_deaths_smoothed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::NewCases => "New Cases",
            Field::NewDeaths => "New Deaths",
            Field::TotalCases => "Total Cases",
            Field::TotalDeaths => "Total Deaths",
            Field::IcuPatients => "ICU Patients",
            Field::HospPatients => "Hospital Patients",
            Field::TotalVaccinations => "Total Vaccinations",
            Field::PeopleFullyVaccinated => "People Fully Vaccinated",
            Field::PeopleFullyVaccinatedPerHundred => "Vaccination Rate (%)",
            Field::TotalTestsPerThousand => "Tests per Thousand",
            Field::TotalCasesPerMillion => "Total Cases per Million",
            Field::TotalDeathsPerMillion => "Total Deaths per Million",
            Field::IcuPatientsPerMillion => "ICU Patients per Million",
            Field::HospPatientsPerMillion => "Hospital Patients per Million",
            Field::Population => "Population",
            Field::NewCasesSmoothed => "New Cases (7-day avg)",
            Field::NewDeathsSmoothed => "New Deaths (7-day avg)",
        }
    }

    pub fn is_core(self) -> bool {
        Field::CORE.contains(&self)
    }
}

/// Metrics offered by the comparison screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    NewCasesSmoothed,
    NewDeathsSmoothed,
    TotalCasesPerMillion,
    TotalDeathsPerMillion,
    IcuPatientsPerMillion,
    HospPatientsPerMillion,
    VaccinationRate,
}

impl Metric {
    pub fn field(self) -> Field {
        match self {
            Metric::NewCasesSmoothed => Field::NewCasesSmoothed,
            Metric::NewDeathsSmoothed => Field::NewDeathsSmoothed,
            Metric::TotalCasesPerMillion => Field::TotalCasesPerMillion,
            Metric::TotalDeathsPerMillion => Field::TotalDeathsPerMillion,
            Metric::IcuPatientsPerMillion => Field::IcuPatientsPerMillion,
            Metric::HospPatientsPerMillion => Field::HospPatientsPerMillion,
            Metric::VaccinationRate => Field::PeopleFullyVaccinatedPerHundred,
        }
    }

    pub fn label(self) -> &'static str {
        self.field().label()
    }
}

/// Which numeric columns get missing values replaced by zero at load time.
///
/// The landing screen only zero-fills the core counters; the analysis screens
/// also zero-fill the ICU, vaccination and testing columns. Fields outside the
/// chosen set keep missing values as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Fill `Field::CORE` only.
    Core,
    /// Fill `Field::CORE` and `Field::EXTENDED_FILL`.
    Extended,
}

impl FillPolicy {
    pub fn fills(self, field: Field) -> bool {
        match self {
            FillPolicy::Core => field.is_core(),
            FillPolicy::Extended => field.is_core() || Field::EXTENDED_FILL.contains(&field),
        }
    }
}

/// One (location, date) observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub location: String,
    pub continent: Option<String>,
    pub date: NaiveDate,

    pub new_cases: f64,
    pub new_deaths: f64,
    pub total_cases: f64,
    pub total_deaths: f64,

    pub icu_patients: Option<f64>,
    pub hosp_patients: Option<f64>,
    pub total_vaccinations: Option<f64>,
    pub people_fully_vaccinated: Option<f64>,
    pub people_fully_vaccinated_per_hundred: Option<f64>,
    pub total_tests_per_thousand: Option<f64>,
    pub total_cases_per_million: Option<f64>,
    pub total_deaths_per_million: Option<f64>,
    pub icu_patients_per_million: Option<f64>,
    pub hosp_patients_per_million: Option<f64>,
    pub population: Option<f64>,

    pub new_cases_smoothed: Option<f64>,
    pub new_deaths_smoothed: Option<f64>,
}

impl Record {
    /// A record with zeroed core counters and no other data.
    pub fn new(location: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            location: location.into(),
            continent: None,
            date,
            new_cases: 0.0,
            new_deaths: 0.0,
            total_cases: 0.0,
            total_deaths: 0.0,
            icu_patients: None,
            hosp_patients: None,
            total_vaccinations: None,
            people_fully_vaccinated: None,
            people_fully_vaccinated_per_hundred: None,
            total_tests_per_thousand: None,
            total_cases_per_million: None,
            total_deaths_per_million: None,
            icu_patients_per_million: None,
            hosp_patients_per_million: None,
            population: None,
            new_cases_smoothed: None,
            new_deaths_smoothed: None,
        }
    }

    /// Overwrite one field. `None` on a core field stores 0.
    pub fn set_value(&mut self, field: Field, value: Option<f64>) {
        let core = value.unwrap_or(0.0);
        match field {
            Field::NewCases => self.new_cases = core,
            Field::NewDeaths => self.new_deaths = core,
            Field::TotalCases => self.total_cases = core,
            Field::TotalDeaths => self.total_deaths = core,
            Field::IcuPatients => self.icu_patients = value,
            Field::HospPatients => self.hosp_patients = value,
            Field::TotalVaccinations => self.total_vaccinations = value,
            Field::PeopleFullyVaccinated => self.people_fully_vaccinated = value,
            Field::PeopleFullyVaccinatedPerHundred => self.people_fully_vaccinated_per_hundred = value,
            Field::TotalTestsPerThousand => self.total_tests_per_thousand = value,
            Field::TotalCasesPerMillion => self.total_cases_per_million = value,
            Field::TotalDeathsPerMillion => self.total_deaths_per_million = value,
            Field::IcuPatientsPerMillion => self.icu_patients_per_million = value,
            Field::HospPatientsPerMillion => self.hosp_patients_per_million = value,
            Field::Population => self.population = value,
            Field::NewCasesSmoothed => self.new_cases_smoothed = value,
            Field::NewDeathsSmoothed => self.new_deaths_smoothed = value,
        }
    }

    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::NewCases => Some(self.new_cases),
            Field::NewDeaths => Some(self.new_deaths),
            Field::TotalCases => Some(self.total_cases),
            Field::TotalDeaths => Some(self.total_deaths),
            Field::IcuPatients => self.icu_patients,
            Field::HospPatients => self.hosp_patients,
            Field::TotalVaccinations => self.total_vaccinations,
            Field::PeopleFullyVaccinated => self.people_fully_vaccinated,
            Field::PeopleFullyVaccinatedPerHundred => self.people_fully_vaccinated_per_hundred,
            Field::TotalTestsPerThousand => self.total_tests_per_thousand,
            Field::TotalCasesPerMillion => self.total_cases_per_million,
            Field::TotalDeathsPerMillion => self.total_deaths_per_million,
            Field::IcuPatientsPerMillion => self.icu_patients_per_million,
            Field::HospPatientsPerMillion => self.hosp_patients_per_million,
            Field::Population => self.population,
            Field::NewCasesSmoothed => self.new_cases_smoothed,
            Field::NewDeathsSmoothed => self.new_deaths_smoothed,
        }
    }
}

/// The loaded dataset. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    continents: BTreeSet<String>,
}

impl Dataset {
    /// Wrap records (kept in the given order) and index their continent labels.
    pub fn new(records: Vec<Record>) -> Self {
        let continents = records
            .iter()
            .filter_map(|r| r.continent.clone())
            .collect();
        Self {
            records,
            continents,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct non-null continent labels.
    pub fn continents(&self) -> &BTreeSet<String> {
        &self.continents
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-date sums produced by `engine::group_sum_by_date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub sums: BTreeMap<Field, f64>,
}

impl DailyTotals {
    /// Sum of `field` on this date; 0 when the field was not requested.
    pub fn sum(&self, field: Field) -> f64 {
        self.sums.get(&field).copied().unwrap_or(0.0)
    }
}

/// One day of a continent's case/death totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContinentDay {
    pub date: NaiveDate,
    pub new_cases: f64,
    pub new_deaths: f64,
}

/// Descriptive statistics of one field within one location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Number of non-null observations.
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Sample standard deviation; `None` below two observations.
    pub std_dev: Option<f64>,
}

/// Symmetric Pearson correlation matrix. `None` cells lack enough data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<Field>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.cells.get(i).and_then(|row| row.get(j)).copied().flatten()
    }
}

/// Maximum single-day value of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peak {
    pub value: f64,
    /// Earliest date on which `value` occurs.
    pub date: NaiveDate,
    /// Every date on which `value` occurs, ascending.
    pub dates: Vec<NaiveDate>,
}

/// Most recent non-null value of a field for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub location: String,
    pub date: NaiveDate,
    pub value: f64,
}
