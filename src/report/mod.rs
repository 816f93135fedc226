//! Reporting: text rendering of screen views.

pub mod format;

pub use format::*;
