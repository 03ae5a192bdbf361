//! CLI entry point for the posture rater tool.
//!
//! Provides subcommands for summarizing the current day of readings,
//! rendering analytics views, analyzing raw document dumps, and polling the
//! store on an interval.

mod infra;
mod services;

use crate::infra::firestore::client::FirestoreClient;
use crate::services::reading_store::ReadingStore;
use anyhow::Result;
use chrono::{FixedOffset, Local, Utc};
use clap::{Parser, Subcommand};
use posture_rater::{
    fetch::{BasicClient, fetch_bytes},
    output::{append_record, print_json},
    parser::parse_documents,
    stats::{self, AnalyticsReport, DailySummary, PostureReading},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "posture_rater")]
#[command(about = "A tool to analyze posture readings", long_about = None)]
struct Cli {
    /// UTC offset for day windows and hour buckets (e.g. "+05:30").
    /// Defaults to the process-local offset.
    #[arg(long, global = true, value_name = "OFFSET")]
    utc_offset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize today's readings from the configured store
    Summary {
        /// Optional CSV file to append the summary row to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Hourly quality and category distribution for today
    Analytics,
    /// Analyze a raw document dump from a file or URL
    Analyze {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// CSV file to append results to
        #[arg(short, long, default_value = "data.csv")]
        output: String,
    },
    /// Poll the store on an interval and append summary rows to a CSV
    Watch {
        /// Sample rate: query the store every X seconds
        #[arg(short = 'r', long, default_value_t = 60)]
        sample_rate: u64,

        /// Number of samples to collect (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        num_samples: usize,

        /// CSV file to append summary rows to
        #[arg(short, long, default_value = "posture_summary.csv")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/posture_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("posture_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let tz = resolve_utc_offset(cli.utc_offset.as_deref())?;

    match cli.command {
        Commands::Summary { output } => {
            summarize(&tz, output.as_deref()).await?;
        }
        Commands::Analytics => {
            analytics(&tz).await?;
        }
        Commands::Analyze { source, output } => {
            let bytes = fetcher(&source).await?;
            let readings = parse_documents(&bytes)?;
            let todays = todays_readings(&readings, &tz);

            let summary = DailySummary::from_readings(&todays);
            print_json(&summary)?;
            report_analytics(&AnalyticsReport::from_readings(&todays, &tz))?;

            append_record(&output, &summary)?;
        }
        Commands::Watch {
            sample_rate,
            num_samples,
            output,
        } => {
            watch(&tz, sample_rate, num_samples, &output).await?;
        }
    }

    Ok(())
}

/// Parses a `±HH:MM` offset argument, falling back to the process-local
/// offset when none is given.
fn resolve_utc_offset(arg: Option<&str>) -> Result<FixedOffset> {
    match arg {
        Some(raw) => raw
            .parse::<FixedOffset>()
            .map_err(|e| anyhow::anyhow!("Invalid UTC offset {:?}: {}", raw, e)),
        None => Ok(*Local::now().offset()),
    }
}

/// Builds the store client from environment configuration.
fn store_from_env() -> FirestoreClient {
    let project_id =
        std::env::var("FIRESTORE_PROJECT_ID").expect("FIRESTORE_PROJECT_ID must be set");

    let mut client = FirestoreClient::new(project_id);
    if let Ok(collection) = std::env::var("FIRESTORE_COLLECTION") {
        client = client.with_collection(collection);
    }
    if let Ok(base_url) = std::env::var("FIRESTORE_BASE_URL") {
        client = client.with_base_url(base_url);
    }
    client
}

/// Fetches all readings, absorbing transport and parse failures into an
/// empty list so the aggregation layer only ever sees valid input.
async fn fetch_or_empty(store: &impl ReadingStore) -> Vec<PostureReading> {
    match store.fetch_readings().await {
        Ok(readings) => {
            debug!(count = readings.len(), "Readings fetched");
            readings
        }
        Err(e) => {
            error!(error = %e, "Store fetch failed, continuing with no readings");
            Vec::new()
        }
    }
}

fn todays_readings(readings: &[PostureReading], tz: &FixedOffset) -> Vec<PostureReading> {
    let today = Utc::now().with_timezone(tz).date_naive();
    stats::readings_for_date(readings, today, tz)
}

#[tracing::instrument(skip(tz, output))]
async fn summarize(tz: &FixedOffset, output: Option<&str>) -> Result<()> {
    let store = store_from_env();
    let readings = fetch_or_empty(&store).await;
    let todays = todays_readings(&readings, tz);

    let summary = DailySummary::from_readings(&todays);

    if let Some(latest) = stats::latest_reading(&todays) {
        info!(
            posture = %latest.posture,
            glyph = stats::emoji_of(&latest.posture),
            score = stats::score_of(&latest.posture),
            "Current posture"
        );
    } else {
        info!("No readings for today");
    }

    info!(
        total = summary.total_readings,
        good_posture_percentage = summary.good_posture_percentage,
        alerts = summary.alert_count,
        "Today's summary"
    );

    print_json(&summary)?;

    if let Some(path) = output {
        append_record(path, &summary)?;
    }

    Ok(())
}

#[tracing::instrument(skip(tz))]
async fn analytics(tz: &FixedOffset) -> Result<()> {
    let store = store_from_env();
    let readings = fetch_or_empty(&store).await;
    let todays = todays_readings(&readings, tz);

    let report = AnalyticsReport::from_readings(&todays, tz);
    report_analytics(&report)
}

/// Logs the analytics view the way the app's charts render it: one line per
/// non-empty hour, then the four distribution buckets, then the full JSON.
fn report_analytics(report: &AnalyticsReport) -> Result<()> {
    if report.hourly.is_empty() {
        info!("No data available for today");
    }

    for slot in &report.hourly {
        info!(
            hour = %slot.label,
            average_score = slot.average_score,
            "Hourly quality"
        );
    }

    info!(
        excellent = report.distribution.excellent,
        good = report.distribution.good,
        okay = report.distribution.okay,
        poor = report.distribution.poor,
        "Posture distribution"
    );

    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Polls the store at a configurable interval, appending one summary row per
/// sample to the output CSV. Fetch failures produce an error row instead.
#[tracing::instrument(skip(tz, output), fields(sample_rate, num_samples))]
async fn watch(tz: &FixedOffset, sample_rate: u64, num_samples: usize, output: &str) -> Result<()> {
    let store = store_from_env();

    if num_samples == 0 {
        info!(sample_rate, "Sampling infinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, sample_rate, "Starting sample collection");
    }

    let mut sample_count = 0;

    loop {
        // Check if we've reached the sample limit (0 = infinite)
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }

        sample_count += 1;

        info!(
            sample = sample_count,
            total = if num_samples == 0 {
                None
            } else {
                Some(num_samples)
            },
            "Starting sample round"
        );

        let fetch_start = std::time::Instant::now();
        match store.fetch_readings().await {
            Ok(readings) => {
                let elapsed = fetch_start.elapsed();
                if elapsed.as_secs() > 15 {
                    warn!(elapsed_secs = elapsed.as_secs(), "Store fetch was slow");
                }

                let todays = todays_readings(&readings, tz);
                debug!(count = todays.len(), "Readings in today's window");

                let summary = DailySummary::from_readings(&todays);
                if let Err(e) = append_record(output, &summary) {
                    error!(error = %e, "Failed to write summary row");
                } else {
                    info!(
                        good_posture_percentage = summary.good_posture_percentage,
                        alerts = summary.alert_count,
                        "Sample recorded"
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "Store fetch failed");
                let error_summary = DailySummary::from_error("fetch_error", &e.to_string());
                let _ = append_record(output, &error_summary);
            }
        }

        // If not the last sample, wait before next iteration
        if num_samples == 0 || sample_count < num_samples {
            debug!(sample_rate, "Waiting before next sample");
            tokio::time::sleep(tokio::time::Duration::from_secs(sample_rate)).await;
        }
    }

    info!(output, "Finished watching store");
    Ok(())
}

/// Loads document bytes from a local file path or fetches them over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &String) -> Result<Vec<u8>> {
    let bytes = if url.starts_with("http") {
        let client = BasicClient::new()?;
        fetch_bytes(&client, url).await?
    } else {
        std::fs::read(url)?
    };
    Ok(bytes)
}
