//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the column vocabulary (`Field`, `Metric`) and load policy (`FillPolicy`)
//! - observation rows (`Record`) and the immutable `Dataset`
//! - aggregation outputs (`DailyTotals`, `SummaryStats`, `CorrelationMatrix`, etc.)

pub mod types;

pub use types::*;
