use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::core::matcher::{AnalysisError, Matcher};
use crate::core::{assemble_profile, normalize_intake, normalize_preferences, ValidationError};
use crate::models::{IntakeRequest, PreferencesRequest};
use crate::services::{CandidateSource, FeatureExtractor};

use super::{AnalysisFailure, AnalysisTicket, SessionError, SessionStore, SessionView};

/// Errors surfaced by the pipeline's operation surface
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// The matching engine's operation surface
///
/// Owns the session store, the collaborator handles and the matcher; route
/// handlers call into it and the analysis stage runs as a background task
/// it spawns on the Preferences -> Analyzing transition.
#[derive(Clone)]
pub struct MatchPipeline {
    store: Arc<SessionStore>,
    directory: Arc<dyn CandidateSource>,
    extractor: Arc<dyn FeatureExtractor>,
    matcher: Matcher,
}

impl MatchPipeline {
    pub fn new(
        store: Arc<SessionStore>,
        directory: Arc<dyn CandidateSource>,
        extractor: Arc<dyn FeatureExtractor>,
        matcher: Matcher,
    ) -> Self {
        Self {
            store,
            directory,
            extractor,
            matcher,
        }
    }

    /// Begin a session: validate the intake and advance it to Preferences
    pub async fn submit_case(&self, raw: &IntakeRequest) -> Result<SessionView, PipelineError> {
        let intake = normalize_intake(raw)?;
        let id = self.store.create().await;
        Ok(self.store.submit_intake(id, intake).await?)
    }

    /// Re-submit intake into an existing session (after a "new search")
    pub async fn submit_intake(
        &self,
        id: Uuid,
        raw: &IntakeRequest,
    ) -> Result<SessionView, PipelineError> {
        let intake = normalize_intake(raw)?;
        Ok(self.store.submit_intake(id, intake).await?)
    }

    /// Submit preferences and start the analysis stage
    pub async fn submit_preferences(
        &self,
        id: Uuid,
        raw: &PreferencesRequest,
    ) -> Result<SessionView, PipelineError> {
        let preferences = normalize_preferences(raw)?;
        let ticket = self.store.begin_analysis(id, preferences).await?;

        let store = Arc::clone(&self.store);
        let directory = Arc::clone(&self.directory);
        let extractor = Arc::clone(&self.extractor);
        let matcher = self.matcher.clone();
        tokio::spawn(run_analysis(store, directory, extractor, matcher, id, ticket));

        Ok(self.store.view(id).await?)
    }

    pub async fn session(&self, id: Uuid) -> Result<SessionView, PipelineError> {
        Ok(self.store.view(id).await?)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<SessionView, PipelineError> {
        Ok(self.store.cancel(id).await?)
    }

    pub async fn refine(&self, id: Uuid) -> Result<SessionView, PipelineError> {
        Ok(self.store.refine(id).await?)
    }

    pub async fn new_search(&self, id: Uuid) -> Result<SessionView, PipelineError> {
        Ok(self.store.new_search(id).await?)
    }
}

/// One analysis run, from frozen inputs to a committed session outcome
///
/// Upstream failures degrade the run instead of failing it: a missing
/// feature set scores with no derived specializations, a missing candidate
/// pool yields an empty result with `degraded` set.
async fn run_analysis(
    store: Arc<SessionStore>,
    directory: Arc<dyn CandidateSource>,
    extractor: Arc<dyn FeatureExtractor>,
    matcher: Matcher,
    id: Uuid,
    ticket: AnalysisTicket,
) {
    let mut degraded = false;

    let derived = match extractor
        .derive_specializations(&ticket.intake.case_type, &ticket.intake.description)
        .await
    {
        Ok(tags) => tags,
        Err(e) => {
            tracing::warn!(
                "Feature service unavailable for session {}, proceeding without derived specializations: {}",
                id,
                e
            );
            degraded = true;
            HashSet::new()
        }
    };

    let profile = Arc::new(assemble_profile(&ticket.intake, &ticket.preferences, derived));

    let candidates = match directory.fetch_candidates(&profile.location).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                "Candidate directory unavailable for session {}, returning degraded empty result: {}",
                id,
                e
            );
            degraded = true;
            Vec::new()
        }
    };

    match matcher.run_batch(profile, candidates, ticket.cancel).await {
        Ok(result) => {
            tracing::info!(
                "Analysis complete for session {}: {} matches from {} candidates ({} skipped)",
                id,
                result.matches.len(),
                result.total_candidates,
                result.skipped
            );
            store.complete(id, result, degraded).await;
        }
        Err(AnalysisError::Cancelled) => {
            // The session already moved to Cancelled when the flag was set
            tracing::debug!("Analysis for session {} cancelled, batch discarded", id);
        }
        Err(AnalysisError::Timeout) => {
            tracing::warn!("Analysis for session {} exceeded its deadline", id);
            store.fail(id, AnalysisFailure::Timeout).await;
        }
    }
}
