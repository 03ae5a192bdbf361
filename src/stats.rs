use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single posture reading fetched from the document store.
///
/// `timestamp` is Unix seconds and is `None` when the source document is
/// missing or carries a malformed timestamp field. Such readings are skipped
/// by the time-bucketed views but still count in category-only aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureReading {
    pub timestamp: Option<i64>,
    pub posture: String,
}

/// Converts a posture category label into a numeric score.
///
/// | Category      | Score |
/// |---------------|-------|
/// | Excellent     | 95    |
/// | Good          | 85    |
/// | Okay          | 70    |
/// | Poor          | 50    |
/// | Very poor     | 30    |
/// | anything else | 0     |
pub fn score_of(posture: &str) -> u32 {
    match posture {
        "Excellent" => 95,
        "Good" => 85,
        "Okay" => 70,
        "Poor" => 50,
        "Very poor" => 30,
        _ => 0,
    }
}

/// Display glyph for a posture category, neutral face for anything unrecognized.
pub fn emoji_of(posture: &str) -> &'static str {
    match posture {
        "Excellent" => "😊",
        "Good" => "🙂",
        "Okay" => "😐",
        "Poor" => "😕",
        "Very poor" => "☹️",
        _ => "😐",
    }
}

/// Share of readings rated Excellent or Good, as a truncated percentage.
/// Returns 0 for an empty list.
pub fn good_posture_percentage(readings: &[PostureReading]) -> u32 {
    if readings.is_empty() {
        return 0;
    }

    let good = readings
        .iter()
        .filter(|r| r.posture == "Excellent" || r.posture == "Good")
        .count();

    (good * 100 / readings.len()) as u32
}

/// Number of readings that would have triggered a posture alert.
pub fn alert_count(readings: &[PostureReading]) -> usize {
    readings
        .iter()
        .filter(|r| r.posture == "Poor" || r.posture == "Very poor")
        .count()
}

/// Percentage share of each quality bucket. "Very poor" readings fold into
/// the `poor` bucket. Each share truncates independently, so the four values
/// can sum to less than 100.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PostureDistribution {
    pub excellent: u32,
    pub good: u32,
    pub okay: u32,
    pub poor: u32,
}

pub fn distribution(readings: &[PostureReading]) -> PostureDistribution {
    if readings.is_empty() {
        return PostureDistribution::default();
    }

    let total = readings.len();
    let excellent = readings.iter().filter(|r| r.posture == "Excellent").count();
    let good = readings.iter().filter(|r| r.posture == "Good").count();
    let okay = readings.iter().filter(|r| r.posture == "Okay").count();
    let poor = readings
        .iter()
        .filter(|r| r.posture == "Poor" || r.posture == "Very poor")
        .count();

    PostureDistribution {
        excellent: (excellent * 100 / total) as u32,
        good: (good * 100 / total) as u32,
        okay: (okay * 100 / total) as u32,
        poor: (poor * 100 / total) as u32,
    }
}

/// Average posture score for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySlot {
    pub hour: u32,
    pub label: String,
    pub average_score: f64,
}

/// Buckets readings by hour of day (0–23) in the given time zone and averages
/// the score of each non-empty bucket.
///
/// Readings without a timestamp are skipped. The result is sparse: hours with
/// no readings produce no slot. Slots are ordered ascending by hour and
/// labeled `"{hour}:00"` with no leading zero.
pub fn hourly_quality<Tz: TimeZone>(readings: &[PostureReading], tz: &Tz) -> Vec<HourlySlot> {
    let mut buckets: BTreeMap<u32, Vec<u32>> = BTreeMap::new();

    for reading in readings {
        if let Some(ts) = reading.timestamp {
            if let Some(utc) = DateTime::from_timestamp(ts, 0) {
                let hour = utc.with_timezone(tz).hour();
                buckets
                    .entry(hour)
                    .or_default()
                    .push(score_of(&reading.posture));
            }
        }
    }

    buckets
        .into_iter()
        .map(|(hour, scores)| {
            let sum: u32 = scores.iter().sum();
            HourlySlot {
                hour,
                label: format!("{}:00", hour),
                average_score: sum as f64 / scores.len() as f64,
            }
        })
        .collect()
}

/// Filters readings to the given calendar date in `tz`, sorted ascending by
/// timestamp. The window is inclusive on both ends, 00:00:00 through 23:59:59.
pub fn readings_for_date<Tz: TimeZone>(
    readings: &[PostureReading],
    date: NaiveDate,
    tz: &Tz,
) -> Vec<PostureReading> {
    let Some((start, end)) = day_bounds(date, tz) else {
        return Vec::new();
    };

    let mut day: Vec<PostureReading> = readings
        .iter()
        .filter(|r| r.timestamp.is_some_and(|ts| ts >= start && ts <= end))
        .cloned()
        .collect();
    day.sort_by_key(|r| r.timestamp);
    day
}

fn day_bounds<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<(i64, i64)> {
    let start = tz
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .earliest()?;
    let end = tz
        .from_local_datetime(&date.and_hms_opt(23, 59, 59)?)
        .latest()?;
    Some((start.timestamp(), end.timestamp()))
}

/// Most recent reading by timestamp. Readings without a timestamp rank lowest.
pub fn latest_reading(readings: &[PostureReading]) -> Option<&PostureReading> {
    readings.iter().max_by_key(|r| r.timestamp.unwrap_or(0))
}

/// One-line summary of a day of readings, written as a CSV row by watch mode
/// and rendered by the summary command.
#[derive(Debug, Default, Serialize)]
pub struct DailySummary {
    pub timestamp: DateTime<Utc>,
    pub total_readings: usize,
    pub good_posture_percentage: u32,
    pub alert_count: usize,
    pub latest_posture: Option<String>,
    pub latest_score: Option<u32>,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl DailySummary {
    pub fn from_readings(readings: &[PostureReading]) -> Self {
        let latest = latest_reading(readings);

        DailySummary {
            timestamp: Utc::now(),
            total_readings: readings.len(),
            good_posture_percentage: good_posture_percentage(readings),
            alert_count: alert_count(readings),
            latest_posture: latest.map(|r| r.posture.clone()),
            latest_score: latest.map(|r| score_of(&r.posture)),
            error_type: None,
            error_message: None,
        }
    }

    /// Create an error record with timestamp and error information
    pub fn from_error(error_type: &str, error_message: &str) -> Self {
        DailySummary {
            timestamp: Utc::now(),
            error_type: Some(error_type.to_string()),
            error_message: Some(error_message.to_string()),
            ..Default::default()
        }
    }
}

/// Analytics view over a day of readings: distribution plus hourly averages.
#[derive(Debug, Serialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub total_readings: usize,
    pub good_posture_percentage: u32,
    pub alert_count: usize,
    pub distribution: PostureDistribution,
    pub hourly: Vec<HourlySlot>,
}

impl AnalyticsReport {
    pub fn from_readings<Tz: TimeZone>(readings: &[PostureReading], tz: &Tz) -> Self {
        AnalyticsReport {
            generated_at: Utc::now(),
            total_readings: readings.len(),
            good_posture_percentage: good_posture_percentage(readings),
            alert_count: alert_count(readings),
            distribution: distribution(readings),
            hourly: hourly_quality(readings, tz),
        }
    }
}
