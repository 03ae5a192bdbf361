use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::services::reading_store::ReadingStore;
use posture_rater::parser::parse_documents;
use posture_rater::stats::PostureReading;

/// Client for the Firestore REST API.
///
/// Reads the posture collection with a plain unauthenticated GET, the way
/// the companion firmware writes it. The base URL is overridable so the
/// client can be pointed at a local emulator.
pub struct FirestoreClient {
    base_url: String,
    project_id: String,
    collection: String,
}

impl FirestoreClient {
    pub fn new(project_id: String) -> Self {
        Self {
            base_url: "https://firestore.googleapis.com".to_string(),
            project_id,
            collection: "posture_data".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_collection(mut self, collection: String) -> Self {
        self.collection = collection;
        self
    }

    fn documents_url(&self) -> String {
        // One page is plenty: a day of readings is tens to low hundreds of
        // documents, and the app-side filter drops the rest anyway.
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}?pageSize=300",
            self.base_url, self.project_id, self.collection
        )
    }
}

#[async_trait]
impl ReadingStore for FirestoreClient {
    async fn fetch_readings(&self) -> Result<Vec<PostureReading>> {
        let url = self.documents_url();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Store returned status {}: {}", status, body));
        }

        let bytes = response.bytes().await?;
        parse_documents(&bytes)
    }
}
