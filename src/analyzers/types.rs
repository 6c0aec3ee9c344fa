//! Data types produced by the aggregation pipeline.

use chrono::NaiveDate;
use serde::Serialize;

/// One reporting row per `(date, disruption type)` pair in the analysis
/// window.
#[derive(Debug, Clone, Serialize)]
pub struct DailyDisruptionMetrics {
    pub disruption_date: NaiveDate,
    pub disruption_type: String,
    pub incident_count: u64,
    /// Mean duration for this date and type, rounded to 2 decimals.
    pub avg_duration_minutes: f64,
    /// Sum of this type's daily counts over its 7 most recent occurrence
    /// dates up to and including this one.
    pub rolling_7day_total: u64,
    /// Window-wide worst station, identical on every row of a run; absent
    /// when no station's percentile rank exceeds the reporting threshold.
    pub worst_station: Option<String>,
    /// Share of this date's incidents (all types) that are cancellations,
    /// as a percentage rounded to 2 decimals.
    pub cancellation_rate_pct: f64,
}
