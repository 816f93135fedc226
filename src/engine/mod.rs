//! Aggregation engine.
//!
//! Pure functions over a loaded `Dataset` (or any sequence of `&Record`):
//!
//! - selection by location/date and country-only views (`filter`)
//! - per-date sums, latest-row snapshots, continent rollups (`group`)
//! - correlation, descriptive statistics, peaks and ratios (`stats`)
//!
//! Nothing here mutates its input or fails on sparse data.

pub mod filter;
pub mod group;
pub mod stats;

pub use filter::*;
pub use group::*;
pub use stats::*;
