// Integration tests for the matching session workflow

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use lexora_match::core::{Matcher, DEFAULT_REASON_THRESHOLD};
use lexora_match::models::{
    AttorneyProfile, AvailabilityTier, BudgetBands, BudgetTier, IntakeRequest,
    PreferencesRequest, ScoringWeights, UrgencyTier,
};
use lexora_match::services::{CandidateError, CandidateSource, FeatureExtractor, NlpError};
use lexora_match::session::{MatchPipeline, PipelineError, SessionState, SessionStore, SessionView};
use uuid::Uuid;

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn attorney(id: &str, specializations: &[&str]) -> AttorneyProfile {
    AttorneyProfile {
        id: id.to_string(),
        name: format!("Attorney {}", id),
        specializations: set(specializations),
        experience_years: 10,
        cases_handled: 150,
        success_rate: Some(0.8),
        languages: set(&["english"]),
        location: "new york".to_string(),
        hourly_rate: 200.0,
        average_rating: Some(4.4),
        review_count: 25,
        availability: AvailabilityTier::High,
    }
}

fn intake_request() -> IntakeRequest {
    IntakeRequest {
        case_type: "Employment Law".to_string(),
        location: "New York".to_string(),
        description: "I was dismissed from my position without notice after reporting safety violations to management.".to_string(),
    }
}

fn preferences_request() -> PreferencesRequest {
    PreferencesRequest {
        urgency: UrgencyTier::Standard,
        budget: BudgetTier::Standard,
        preferred_languages: vec!["English".to_string()],
        location: None,
    }
}

/// Directory fixture serving a fixed pool, optionally after a delay
struct StaticDirectory {
    pool: Vec<AttorneyProfile>,
    delay: Duration,
}

impl StaticDirectory {
    fn new(pool: Vec<AttorneyProfile>) -> Self {
        Self {
            pool,
            delay: Duration::from_millis(0),
        }
    }

    fn slow(pool: Vec<AttorneyProfile>, delay: Duration) -> Self {
        Self { pool, delay }
    }
}

#[async_trait]
impl CandidateSource for StaticDirectory {
    async fn fetch_candidates(&self, _hint: &str) -> Result<Vec<AttorneyProfile>, CandidateError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.pool.clone())
    }
}

/// Directory fixture that is always down
struct FailingDirectory;

#[async_trait]
impl CandidateSource for FailingDirectory {
    async fn fetch_candidates(&self, _hint: &str) -> Result<Vec<AttorneyProfile>, CandidateError> {
        Err(CandidateError::ApiError("directory unavailable".to_string()))
    }
}

/// Extractor fixture mapping the case type straight to a tag
struct StaticExtractor {
    tags: Vec<String>,
}

impl StaticExtractor {
    fn tagging(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[async_trait]
impl FeatureExtractor for StaticExtractor {
    async fn derive_specializations(
        &self,
        _case_type: &str,
        _description: &str,
    ) -> Result<HashSet<String>, NlpError> {
        Ok(self.tags.iter().cloned().collect())
    }
}

/// Extractor fixture that is always down
struct FailingExtractor;

#[async_trait]
impl FeatureExtractor for FailingExtractor {
    async fn derive_specializations(
        &self,
        _case_type: &str,
        _description: &str,
    ) -> Result<HashSet<String>, NlpError> {
        Err(NlpError::ApiError("feature service unavailable".to_string()))
    }
}

fn pipeline_with(
    directory: Arc<dyn CandidateSource>,
    extractor: Arc<dyn FeatureExtractor>,
) -> MatchPipeline {
    let store = Arc::new(SessionStore::new(Duration::from_secs(3600)));
    MatchPipeline::new(store, directory, extractor, Matcher::with_defaults())
}

async fn wait_for_terminal_state(pipeline: &MatchPipeline, id: Uuid) -> SessionView {
    for _ in 0..200 {
        let view = pipeline.session(id).await.unwrap();
        if view.state != SessionState::Analyzing {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session {} never left Analyzing", id);
}

async fn run_to_results(pipeline: &MatchPipeline) -> SessionView {
    let created = pipeline.submit_case(&intake_request()).await.unwrap();
    assert_eq!(created.state, SessionState::Preferences);

    pipeline
        .submit_preferences(created.id, &preferences_request())
        .await
        .unwrap();

    let view = wait_for_terminal_state(pipeline, created.id).await;
    assert_eq!(view.state, SessionState::Results);
    view
}

#[tokio::test]
async fn test_specialization_outweighs_experience_and_track_record() {
    // Candidate A matches the derived specialization; B is stronger on every
    // other dimension but must still rank below A
    let a = AttorneyProfile {
        experience_years: 14,
        cases_handled: 410,
        success_rate: Some(0.86),
        ..attorney("attorney_a", &["employment law"])
    };
    let b = AttorneyProfile {
        experience_years: 20,
        cases_handled: 500,
        success_rate: Some(0.95),
        ..attorney("attorney_b", &["corporate law"])
    };

    let pipeline = pipeline_with(
        Arc::new(StaticDirectory::new(vec![b, a])),
        Arc::new(StaticExtractor::tagging(&["employment law"])),
    );

    let view = run_to_results(&pipeline).await;
    let result = view.result.unwrap();

    assert_eq!(result.total_candidates, 2);
    assert_eq!(result.matches[0].attorney.id, "attorney_a");
    assert!(result.matches[0].score.total > result.matches[1].score.total);
    for m in &result.matches {
        assert!(m.score.total >= 0.0 && m.score.total <= 100.0);
    }
}

#[tokio::test]
async fn test_empty_candidate_pool_still_reaches_results() {
    let pipeline = pipeline_with(
        Arc::new(StaticDirectory::new(vec![])),
        Arc::new(StaticExtractor::tagging(&["employment law"])),
    );

    let view = run_to_results(&pipeline).await;
    let result = view.result.unwrap();

    assert!(result.matches.is_empty());
    assert_eq!(result.total_candidates, 0);
    assert!(!view.degraded);
    assert!(view.failure.is_none());
}

#[tokio::test]
async fn test_cancellation_mid_analysis_sticks() {
    let pool = vec![attorney("attorney_a", &["employment law"])];
    let pipeline = pipeline_with(
        Arc::new(StaticDirectory::slow(pool, Duration::from_millis(200))),
        Arc::new(StaticExtractor::tagging(&["employment law"])),
    );

    let created = pipeline.submit_case(&intake_request()).await.unwrap();
    let view = pipeline
        .submit_preferences(created.id, &preferences_request())
        .await
        .unwrap();
    assert_eq!(view.state, SessionState::Analyzing);

    // Cancel while the batch is still in flight; the state flips immediately
    let cancelled = pipeline.cancel(created.id).await.unwrap();
    assert_eq!(cancelled.state, SessionState::Cancelled);
    assert!(cancelled.cancelled_at.is_some());

    // Even after the dispatched work would have finished, the session must
    // never report Results
    tokio::time::sleep(Duration::from_millis(400)).await;
    let after = pipeline.session(created.id).await.unwrap();
    assert_eq!(after.state, SessionState::Cancelled);
    assert!(after.result.is_none());
}

#[tokio::test]
async fn test_refine_with_unchanged_inputs_reproduces_ordering() {
    let pool: Vec<AttorneyProfile> = (0..12)
        .map(|i| {
            let mut a = attorney(&format!("attorney_{:02}", i), &["employment law"]);
            a.experience_years = 3 + i;
            a.hourly_rate = 150.0 + 20.0 * i as f64;
            a
        })
        .collect();

    let pipeline = pipeline_with(
        Arc::new(StaticDirectory::new(pool)),
        Arc::new(StaticExtractor::tagging(&["employment law"])),
    );

    let first = run_to_results(&pipeline).await;
    let first_ids: Vec<String> = first
        .result
        .as_ref()
        .unwrap()
        .matches
        .iter()
        .map(|m| m.attorney.id.clone())
        .collect();

    let refined = pipeline.refine(first.id).await.unwrap();
    assert_eq!(refined.state, SessionState::Preferences);
    assert!(refined.result.is_none());

    pipeline
        .submit_preferences(first.id, &preferences_request())
        .await
        .unwrap();
    let second = wait_for_terminal_state(&pipeline, first.id).await;

    let second_ids: Vec<String> = second
        .result
        .unwrap()
        .matches
        .iter()
        .map(|m| m.attorney.id.clone())
        .collect();

    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn test_new_search_returns_to_intake() {
    let pipeline = pipeline_with(
        Arc::new(StaticDirectory::new(vec![attorney("attorney_a", &["employment law"])])),
        Arc::new(StaticExtractor::tagging(&["employment law"])),
    );

    let view = run_to_results(&pipeline).await;
    let reset = pipeline.new_search(view.id).await.unwrap();
    assert_eq!(reset.state, SessionState::Intake);
    assert!(reset.result.is_none());

    // The session accepts a fresh intake and can run again
    let resubmitted = pipeline.submit_intake(view.id, &intake_request()).await.unwrap();
    assert_eq!(resubmitted.state, SessionState::Preferences);
}

#[tokio::test]
async fn test_directory_outage_degrades_instead_of_failing() {
    let pipeline = pipeline_with(
        Arc::new(FailingDirectory),
        Arc::new(StaticExtractor::tagging(&["employment law"])),
    );

    let view = run_to_results(&pipeline).await;
    let result = view.result.unwrap();

    assert!(view.degraded);
    assert!(result.matches.is_empty());
}

#[tokio::test]
async fn test_feature_service_outage_still_produces_results() {
    let pipeline = pipeline_with(
        Arc::new(StaticDirectory::new(vec![attorney("attorney_a", &["employment law"])])),
        Arc::new(FailingExtractor),
    );

    let view = run_to_results(&pipeline).await;
    let result = view.result.unwrap();

    assert!(view.degraded);
    assert_eq!(result.matches.len(), 1);
    // Without derived specializations the overlap dimension scores zero but
    // the candidate is still ranked
    assert!(result.matches[0].score.total > 0.0);
}

#[tokio::test]
async fn test_short_description_rejected_at_submission() {
    let pipeline = pipeline_with(
        Arc::new(StaticDirectory::new(vec![])),
        Arc::new(StaticExtractor::tagging(&[])),
    );

    let mut raw = intake_request();
    raw.description = "Too short".to_string();

    let err = pipeline.submit_case(&raw).await.unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
}

#[tokio::test]
async fn test_cancel_outside_analysis_is_a_conflict() {
    let pipeline = pipeline_with(
        Arc::new(StaticDirectory::new(vec![])),
        Arc::new(StaticExtractor::tagging(&[])),
    );

    let created = pipeline.submit_case(&intake_request()).await.unwrap();
    let err = pipeline.cancel(created.id).await.unwrap_err();
    assert!(matches!(err, PipelineError::Session(_)));
}

#[tokio::test]
async fn test_batch_deadline_expiry_cancels_with_error() {
    let store = Arc::new(SessionStore::new(Duration::from_secs(3600)));
    let matcher = Matcher::new(
        ScoringWeights::default(),
        BudgetBands::default(),
        DEFAULT_REASON_THRESHOLD,
        5,
        8,
        Duration::from_millis(0),
    );
    let pipeline = MatchPipeline::new(
        store,
        Arc::new(StaticDirectory::new(vec![attorney("attorney_a", &["employment law"])])),
        Arc::new(StaticExtractor::tagging(&["employment law"])),
        matcher,
    );

    let created = pipeline.submit_case(&intake_request()).await.unwrap();
    pipeline
        .submit_preferences(created.id, &preferences_request())
        .await
        .unwrap();

    let view = wait_for_terminal_state(&pipeline, created.id).await;
    assert_eq!(view.state, SessionState::Cancelled);
    assert!(view.failure.is_some());
    assert!(view.result.is_none());
}

#[tokio::test]
async fn test_results_are_top_n_truncated_and_sorted() {
    let pool: Vec<AttorneyProfile> = (0..20)
        .map(|i| {
            let mut a = attorney(&format!("attorney_{:02}", i), &["employment law"]);
            a.experience_years = i;
            a
        })
        .collect();

    let pipeline = pipeline_with(
        Arc::new(StaticDirectory::new(pool)),
        Arc::new(StaticExtractor::tagging(&["employment law"])),
    );

    let view = run_to_results(&pipeline).await;
    let result = view.result.unwrap();

    assert_eq!(result.matches.len(), 5);
    assert_eq!(result.total_candidates, 20);
    for pair in result.matches.windows(2) {
        assert!(pair[0].score.total >= pair[1].score.total);
    }
}
