use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::core::canonicalize_term;
use crate::models::AttorneyProfile;

/// Errors that can occur when talking to the attorney directory
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Source of candidate attorneys for one jurisdiction
///
/// The pool arrives unsorted and may be empty; jurisdiction and
/// active-status filtering happen on the directory side.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_candidates(
        &self,
        jurisdiction_hint: &str,
    ) -> Result<Vec<AttorneyProfile>, CandidateError>;
}

/// Attorney directory API client
///
/// Handles all communication with the marketplace's attorney directory:
/// querying the candidate pool eligible for scoring.
pub struct HttpCandidateDirectory {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpCandidateDirectory {
    /// Create a new directory client
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }
}

#[async_trait]
impl CandidateSource for HttpCandidateDirectory {
    async fn fetch_candidates(
        &self,
        jurisdiction_hint: &str,
    ) -> Result<Vec<AttorneyProfile>, CandidateError> {
        let url = format!(
            "{}/attorneys?status=active&jurisdiction={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(jurisdiction_hint)
        );

        tracing::debug!("Fetching candidates from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CandidateError::ApiError(format!(
                "Failed to fetch candidates: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("attorneys")
            .and_then(|d| d.as_array())
            .ok_or_else(|| CandidateError::InvalidResponse("Missing attorneys array".into()))?;

        let mut malformed = 0;
        let profiles: Vec<AttorneyProfile> = documents
            .iter()
            .filter_map(|doc| match serde_json::from_value(doc.clone()) {
                Ok(profile) => Some(canonicalize_profile(profile)),
                Err(e) => {
                    // A malformed record never aborts the fetch
                    tracing::warn!("Skipping malformed attorney record: {}", e);
                    malformed += 1;
                    None
                }
            })
            .collect();

        tracing::debug!(
            "Fetched {} candidates for '{}' ({} malformed skipped)",
            profiles.len(),
            jurisdiction_hint,
            malformed
        );

        Ok(profiles)
    }
}

/// Case-fold the free-text fields compared during scoring
fn canonicalize_profile(mut profile: AttorneyProfile) -> AttorneyProfile {
    profile.specializations = profile
        .specializations
        .iter()
        .map(|s| canonicalize_term(s))
        .collect();
    profile.languages = profile.languages.iter().map(|l| canonicalize_term(l)).collect();
    profile.location = canonicalize_term(&profile.location);
    profile
}
