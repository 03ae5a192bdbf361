//! JSON parser for Firestore document-store responses.

use anyhow::Result;
use serde::Deserialize;

use crate::stats::PostureReading;

/// Response envelope for a Firestore `ListDocuments` call. An empty
/// collection comes back as `{}` with no `documents` key at all.
#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    fields: Option<DocumentFields>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentFields {
    timestamp: Option<FirestoreValue>,
    posture: Option<FirestoreValue>,
}

/// Firestore wraps every field in a typed value object; integers arrive as
/// decimal strings under `integerValue`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreValue {
    integer_value: Option<String>,
    string_value: Option<String>,
}

/// Decodes a Firestore `ListDocuments` JSON response into posture readings.
///
/// Malformed fields degrade per record rather than failing the batch: a
/// missing or unparseable timestamp maps to `None` and a missing posture
/// label maps to the empty string.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON for a document list.
pub fn parse_documents(bytes: &[u8]) -> Result<Vec<PostureReading>> {
    let response: ListDocumentsResponse = serde_json::from_slice(bytes)?;

    let readings = response
        .documents
        .into_iter()
        .map(|doc| {
            let fields = doc.fields.unwrap_or_default();

            let timestamp = fields
                .timestamp
                .and_then(|v| v.integer_value)
                .and_then(|raw| raw.parse::<i64>().ok());
            let posture = fields
                .posture
                .and_then(|v| v.string_value)
                .unwrap_or_default();

            PostureReading { timestamp, posture }
        })
        .collect();

    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_collection() {
        // Firestore answers with a bare object when the collection is empty
        let result = parse_documents(b"{}");
        assert!(result.is_ok());
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_bytes() {
        let invalid_bytes = vec![0xFF, 0xFE, 0x00, 0x01];
        let result = parse_documents(&invalid_bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_valid_document() {
        let body = br#"{
            "documents": [
                {
                    "name": "projects/p/databases/(default)/documents/posture_data/abc",
                    "fields": {
                        "timestamp": { "integerValue": "1234567890" },
                        "posture": { "stringValue": "Good" }
                    }
                }
            ]
        }"#;

        let readings = parse_documents(body).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].timestamp, Some(1234567890));
        assert_eq!(readings[0].posture, "Good");
    }

    #[test]
    fn test_parse_missing_timestamp() {
        let body = br#"{
            "documents": [
                { "fields": { "posture": { "stringValue": "Okay" } } }
            ]
        }"#;

        let readings = parse_documents(body).unwrap();
        assert_eq!(readings[0].timestamp, None);
        assert_eq!(readings[0].posture, "Okay");
    }

    #[test]
    fn test_parse_malformed_timestamp() {
        let body = br#"{
            "documents": [
                {
                    "fields": {
                        "timestamp": { "integerValue": "not-a-number" },
                        "posture": { "stringValue": "Poor" }
                    }
                }
            ]
        }"#;

        let readings = parse_documents(body).unwrap();
        assert_eq!(readings[0].timestamp, None);
        assert_eq!(readings[0].posture, "Poor");
    }

    #[test]
    fn test_parse_missing_posture_defaults_to_empty() {
        let body = br#"{
            "documents": [
                { "fields": { "timestamp": { "integerValue": "42" } } }
            ]
        }"#;

        let readings = parse_documents(body).unwrap();
        assert_eq!(readings[0].timestamp, Some(42));
        assert_eq!(readings[0].posture, "");
    }

    #[test]
    fn test_parse_document_without_fields() {
        let body = br#"{ "documents": [ { "name": "projects/p/doc" } ] }"#;

        let readings = parse_documents(body).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].timestamp, None);
        assert_eq!(readings[0].posture, "");
    }
}
