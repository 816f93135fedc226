//! Input/output helpers.
//!
//! - CSV ingest + normalization (`ingest`)
//! - CSV exports of screen series (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
