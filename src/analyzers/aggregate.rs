//! Multi-pass computation of [`DailyDisruptionMetrics`] over a trailing
//! window of cleaned rows.
//!
//! The passes run in order: window filter, group by day and type, per-type
//! rolling totals, station-impact ranking, per-day cancellation rates.
//! Each pass materializes its input fully; nothing here is incremental.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::analyzers::types::DailyDisruptionMetrics;
use crate::analyzers::utility::{mean, round2};
use crate::cleaner::DisruptionRow;

/// Length of the default trailing analysis window in days.
pub const WINDOW_DAYS: i64 = 30;

/// Entries covered by a rolling total: the current per-type daily count plus
/// up to six preceding ones.
const ROLLING_ENTRIES: usize = 7;

/// Percentile rank a station must strictly exceed to be reported as the
/// window's worst station.
const WORST_STATION_PERCENTILE: f64 = 0.90;

/// Aggregates rows over the standard trailing 30-day window ending at `now`.
pub fn aggregate_disruptions(
    rows: &[DisruptionRow],
    now: DateTime<Utc>,
) -> Vec<DailyDisruptionMetrics> {
    aggregate_window(rows, now - Duration::days(WINDOW_DAYS))
}

/// Aggregates all rows with `start_time >= since` into daily metrics,
/// ordered by date descending and incident count descending. Empty input
/// (or a window containing no rows) yields an empty result.
pub fn aggregate_window(
    rows: &[DisruptionRow],
    since: DateTime<Utc>,
) -> Vec<DailyDisruptionMetrics> {
    let window: Vec<&DisruptionRow> = rows.iter().filter(|r| r.start_time >= since).collect();

    // Group durations by (date, type). The BTreeMap gives the rolling pass
    // its required date-ascending iteration order.
    let mut groups: BTreeMap<(NaiveDate, String), Vec<f64>> = BTreeMap::new();
    for row in &window {
        groups
            .entry((row.start_time.date_naive(), row.disruption_type.clone()))
            .or_default()
            .push(row.duration_minutes);
    }

    struct DayGroup {
        date: NaiveDate,
        disruption_type: String,
        count: u64,
        avg_duration: f64,
    }

    let day_groups: Vec<DayGroup> = groups
        .into_iter()
        .map(|((date, disruption_type), durations)| DayGroup {
            date,
            disruption_type,
            count: durations.len() as u64,
            avg_duration: round2(mean(&durations)),
        })
        .collect();

    // Rolling totals accumulate per type, over occurrence dates rather than
    // calendar days: a sparse type still sums its last 7 entries.
    let mut history: HashMap<&str, Vec<u64>> = HashMap::new();
    let mut rolling_totals = Vec::with_capacity(day_groups.len());
    for group in &day_groups {
        let counts = history.entry(group.disruption_type.as_str()).or_default();
        counts.push(group.count);
        let tail = counts.len().saturating_sub(ROLLING_ENTRIES);
        rolling_totals.push(counts[tail..].iter().sum::<u64>());
    }

    // Per-date totals across all types for the cancellation-rate denominator.
    let mut day_totals: HashMap<NaiveDate, (u64, u64)> = HashMap::new();
    for group in &day_groups {
        let entry = day_totals.entry(group.date).or_default();
        if group.disruption_type == "cancellation" {
            entry.0 += group.count;
        }
        entry.1 += group.count;
    }

    let worst = worst_station(&window);

    let mut metrics: Vec<DailyDisruptionMetrics> = day_groups
        .iter()
        .zip(rolling_totals)
        .map(|(group, rolling_7day_total)| {
            // A date only exists here because it has rows, so the total is
            // never zero.
            let (cancellations, total) = day_totals[&group.date];
            DailyDisruptionMetrics {
                disruption_date: group.date,
                disruption_type: group.disruption_type.clone(),
                incident_count: group.count,
                avg_duration_minutes: group.avg_duration,
                rolling_7day_total,
                worst_station: worst.clone(),
                cancellation_rate_pct: round2(100.0 * cancellations as f64 / total as f64),
            }
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.disruption_date
            .cmp(&a.disruption_date)
            .then(b.incident_count.cmp(&a.incident_count))
    });
    metrics
}

/// Station with the highest percentile rank of disruption counts over the
/// whole window, reported only when that rank strictly exceeds
/// [`WORST_STATION_PERCENTILE`].
///
/// Percentile rank is `(rank - 1) / (n - 1)` over distinct stations in
/// ascending count order, ties sharing a rank. With fewer than two distinct
/// stations the rank is degenerate and no station is reported. A tie among
/// top-count stations is broken by the lexicographically smallest code.
fn worst_station(window: &[&DisruptionRow]) -> Option<String> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for row in window {
        let Some(stations) = row.affected_stations.as_deref() else {
            continue;
        };
        for code in stations.split(',').map(str::trim) {
            if !code.is_empty() {
                *counts.entry(code).or_default() += 1;
            }
        }
    }

    let n = counts.len();
    if n < 2 {
        return None;
    }

    let max_count = *counts.values().max().unwrap_or(&0);
    let below_max = counts.values().filter(|&&c| c < max_count).count();
    let top_rank = below_max as f64 / (n - 1) as f64;
    if top_rank <= WORST_STATION_PERCENTILE {
        return None;
    }

    counts
        .into_iter()
        .filter(|&(_, c)| c == max_count)
        .map(|(code, _)| code)
        .min()
        .map(str::to_string)
}
