use chrono::{TimeZone, Utc};
use nl_rail_disruptions::analyzers::aggregate::aggregate_window;
use nl_rail_disruptions::cleaner::clean_disruptions;
use nl_rail_disruptions::feed::parse_disruptions;
use nl_rail_disruptions::store::{RowStore, StoreConfig};

#[test]
fn test_full_pipeline() {
    let bytes = include_bytes!("fixtures/sample_disruptions.json");
    let records = parse_disruptions(bytes).expect("Failed to parse fixture feed");
    assert_eq!(records.len(), 7);

    // Fixed clock so the ongoing disruption in the fixture gets a stable end.
    let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
    let rows = clean_disruptions(&records, now);

    // Two fixture records are junk: a placeholder title and a bad start.
    assert_eq!(rows.len(), 5);
    for row in &rows {
        assert!(row.duration_minutes >= 0.0);
        assert!((2..=5).contains(&row.impact_level));
    }

    let path = std::env::temp_dir().join("nl_rail_disruptions_pipeline.csv");
    let _ = std::fs::remove_file(&path);
    let store = RowStore::new(StoreConfig { path: path.clone() });
    store.append_rows(&rows).expect("Failed to append rows");

    let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let fetched = store.fetch_rows(since).expect("Failed to fetch rows");
    assert_eq!(fetched.len(), rows.len());

    let metrics = aggregate_window(&fetched, since);
    assert_eq!(metrics.len(), 5);

    // Newest date first; the ongoing maintenance row is alone on the 18th.
    assert_eq!(metrics[0].disruption_date.to_string(), "2024-03-18");
    assert_eq!(metrics[0].disruption_type, "maintenance");
    assert_eq!(metrics[0].rolling_7day_total, 1);
    assert_eq!(metrics[0].cancellation_rate_pct, 0.0);

    // Second cancellation day rolls up both occurrence dates.
    let cancel_16 = metrics
        .iter()
        .find(|m| {
            m.disruption_type == "cancellation" && m.disruption_date.to_string() == "2024-03-16"
        })
        .expect("cancellation metrics for the 16th");
    assert_eq!(cancel_16.incident_count, 1);
    assert_eq!(cancel_16.rolling_7day_total, 2);
    assert_eq!(cancel_16.cancellation_rate_pct, 50.0);

    // ASD is on three of the five rows, a unique maximum across five
    // distinct stations, and is attached identically everywhere.
    for m in &metrics {
        assert_eq!(m.worst_station.as_deref(), Some("ASD"));
    }

    std::fs::remove_file(&path).unwrap();
}
