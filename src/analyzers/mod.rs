//! Windowed analytics over cleaned disruption rows.
//!
//! This module turns the rows produced by the cleaner into daily metrics:
//! per-day incident counts, duration averages, per-type rolling totals,
//! station-impact ranking, and cancellation rates.

pub mod aggregate;
pub mod types;
pub mod utility;
