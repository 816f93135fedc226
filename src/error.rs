//! Error types.
//!
//! - `LoadError` is the typed failure of the dataset loader. Every variant maps
//!   to one of two kinds: a parse failure or a schema mismatch.
//! - `AppError` is what the binary reports: a message plus a process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of load failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The source is missing, malformed, or holds an unparseable value.
    ParseFailure,
    /// A required column is absent.
    SchemaMismatch,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open dataset '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column: `{0}`")]
    MissingColumn(&'static str),
    #[error("Line {line}: invalid date '{value}'")]
    InvalidDate { line: usize, value: String },
    #[error("Line {line}: invalid number '{value}' in column `{column}`")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("Line {line}: empty `location`")]
    EmptyLocation { line: usize },
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::MissingColumn(_) => LoadErrorKind::SchemaMismatch,
            LoadError::Open { .. }
            | LoadError::Csv(_)
            | LoadError::InvalidDate { .. }
            | LoadError::InvalidNumber { .. }
            | LoadError::EmptyLocation { .. } => LoadErrorKind::ParseFailure,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::new(2, err.to_string())
    }
}
