//! Runtime configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. CLI flags override them (see `app::run`).

use std::path::PathBuf;

/// Environment variable naming the dataset file.
pub const DATA_PATH_ENV: &str = "COVID_DATA_PATH";

pub const DEFAULT_DATA_PATH: &str = "data/covid_data.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_path = lookup(DATA_PATH_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        Self { data_path }
    }

    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.data_path = path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_path() {
        let s = Settings::from_lookup(|_| None);
        assert_eq!(s.data_path, PathBuf::from(DEFAULT_DATA_PATH));

        let s = Settings::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(s.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn cli_flag_overrides_environment() {
        let s = Settings::from_lookup(|k| (k == DATA_PATH_ENV).then(|| "env.csv".to_string()));
        assert_eq!(s.data_path, PathBuf::from("env.csv"));

        let s = s.with_data_path(Some(PathBuf::from("flag.csv")));
        assert_eq!(s.data_path, PathBuf::from("flag.csv"));
    }
}
