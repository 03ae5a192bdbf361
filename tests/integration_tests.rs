use chrono::{FixedOffset, Utc};
use posture_rater::parser::parse_documents;
use posture_rater::stats::{self, AnalyticsReport, DailySummary};

// The fixture holds one afternoon of readings from a demo store: four clean
// documents (12:00, 12:15, 13:00, 14:00 UTC), one with no timestamp, and one
// with a timestamp that does not parse.

#[test]
fn test_full_pipeline() {
    let bytes = include_bytes!("fixtures/sample_readings.json");
    let readings = parse_documents(bytes).expect("Failed to parse documents");

    assert_eq!(readings.len(), 6);
    assert_eq!(
        readings.iter().filter(|r| r.timestamp.is_none()).count(),
        2
    );

    let summary = DailySummary::from_readings(&readings);
    assert_eq!(summary.total_readings, 6);
    // Excellent + 2x Good out of 6
    assert_eq!(summary.good_posture_percentage, 50);
    // Poor + Very poor
    assert_eq!(summary.alert_count, 2);
    assert_eq!(summary.latest_posture.as_deref(), Some("Poor"));
    assert_eq!(summary.latest_score, Some(50));
}

#[test]
fn test_analytics_report_from_fixture() {
    let bytes = include_bytes!("fixtures/sample_readings.json");
    let readings = parse_documents(bytes).expect("Failed to parse documents");

    let report = AnalyticsReport::from_readings(&readings, &Utc);

    assert_eq!(report.distribution.excellent, 16);
    assert_eq!(report.distribution.good, 33);
    assert_eq!(report.distribution.okay, 16);
    assert_eq!(report.distribution.poor, 33);

    // The two timestamp-less readings stay out of the hourly buckets
    assert_eq!(report.hourly.len(), 3);
    assert_eq!(report.hourly[0].hour, 12);
    assert_eq!(report.hourly[0].label, "12:00");
    assert_eq!(report.hourly[0].average_score, 82.5);
    assert_eq!(report.hourly[1].hour, 13);
    assert_eq!(report.hourly[1].average_score, 85.0);
    assert_eq!(report.hourly[2].hour, 14);
    assert_eq!(report.hourly[2].average_score, 50.0);
}

#[test]
fn test_hour_buckets_follow_requested_offset() {
    let bytes = include_bytes!("fixtures/sample_readings.json");
    let readings = parse_documents(bytes).expect("Failed to parse documents");

    let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
    let slots = stats::hourly_quality(&readings, &ist);

    // 12:00/12:15 UTC land together in the 17:30-ish bucket at +05:30
    let hours: Vec<u32> = slots.iter().map(|s| s.hour).collect();
    assert_eq!(hours, vec![17, 18, 19]);
    assert_eq!(slots[0].average_score, 82.5);
}
