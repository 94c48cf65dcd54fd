use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::core::canonicalize_term;

/// Errors that can occur when talking to the feature-extraction service
#[derive(Debug, Error)]
pub enum NlpError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Upstream NLP collaborator deriving specialization tags from case text
///
/// The extraction technique is opaque to this subsystem; the pipeline only
/// consumes the resulting tag set, and proceeds with an empty set when the
/// service fails or exceeds its sub-timeout.
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    async fn derive_specializations(
        &self,
        case_type: &str,
        description: &str,
    ) -> Result<HashSet<String>, NlpError>;
}

/// Feature-extraction service client
pub struct HttpFeatureService {
    base_url: String,
    client: Client,
}

impl HttpFeatureService {
    /// Create a new feature service client with its sub-timeout
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }
}

#[async_trait]
impl FeatureExtractor for HttpFeatureService {
    async fn derive_specializations(
        &self,
        case_type: &str,
        description: &str,
    ) -> Result<HashSet<String>, NlpError> {
        let url = format!("{}/features", self.base_url.trim_end_matches('/'));

        let payload = serde_json::json!({
            "caseType": case_type,
            "description": description,
        });

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(NlpError::ApiError(format!(
                "Failed to derive specializations: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let tags = json
            .get("specializations")
            .and_then(|s| s.as_array())
            .ok_or_else(|| NlpError::InvalidResponse("Missing specializations array".into()))?;

        let derived: HashSet<String> = tags
            .iter()
            .filter_map(|t| t.as_str())
            .map(canonicalize_term)
            .filter(|t| !t.is_empty())
            .collect();

        tracing::debug!("Derived {} specialization tags", derived.len());

        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_derive_specializations_canonicalizes_tags() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/features")
            .with_status(200)
            .with_body(
                serde_json::json!({ "specializations": ["Employment Law", " employment law "] })
                    .to_string(),
            )
            .create_async()
            .await;

        let service = HttpFeatureService::new(server.url(), Duration::from_secs(2));

        let derived = service
            .derive_specializations("Employment Law", "Dismissed without notice.")
            .await
            .unwrap();

        assert_eq!(derived.len(), 1);
        assert!(derived.contains("employment law"));
    }

    #[tokio::test]
    async fn test_empty_tag_set_is_valid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/features")
            .with_status(200)
            .with_body(serde_json::json!({ "specializations": [] }).to_string())
            .create_async()
            .await;

        let service = HttpFeatureService::new(server.url(), Duration::from_secs(2));

        let derived = service
            .derive_specializations("Family Law", "Custody dispute.")
            .await
            .unwrap();

        assert!(derived.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_surfaces_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/features")
            .with_status(500)
            .create_async()
            .await;

        let service = HttpFeatureService::new(server.url(), Duration::from_secs(2));

        let err = service
            .derive_specializations("Family Law", "Custody dispute.")
            .await
            .unwrap_err();

        assert!(matches!(err, NlpError::ApiError(_)));
    }
}
