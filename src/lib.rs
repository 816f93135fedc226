//! `covid-explorer` library crate.
//!
//! The binary (`covex`) is a thin wrapper around this library so that:
//!
//! - loading and aggregation are testable without spawning processes
//! - the engine is reusable by other front-ends (dashboards, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod report;
