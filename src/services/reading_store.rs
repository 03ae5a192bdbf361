//! Trait for a remote posture reading store.

use anyhow::Result;
use posture_rater::stats::PostureReading;

/// Abstraction over a remote document store holding posture readings
/// (e.g., Firestore).
///
/// Implementations surface transport and decode failures as errors; callers
/// that feed the aggregation layer are expected to absorb a failure into an
/// empty list, since the aggregator treats empty input as valid zero data.
#[async_trait::async_trait]
pub trait ReadingStore {
    /// Returns every reading in the store, unfiltered and unordered.
    async fn fetch_readings(&self) -> Result<Vec<PostureReading>>;
}
