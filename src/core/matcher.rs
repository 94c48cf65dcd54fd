use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use crate::core::ranking::{rank, RankedMatch};
use crate::core::{explain, scoring};
use crate::models::{AttorneyProfile, BudgetBands, CaseProfile, MatchScore, ScoringWeights};

/// Why an analysis batch ended without a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("analysis cancelled")]
    Cancelled,

    #[error("analysis deadline exceeded")]
    Timeout,
}

/// Ranked output of one analysis batch
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matches: Vec<RankedMatch>,
    pub total_candidates: usize,
    /// Candidates excluded because their scoring task failed
    pub skipped: usize,
}

/// Main matching orchestrator
///
/// Scoring per candidate is stateless and pure, so the batch fans out one
/// task per attorney over a bounded worker pool. The ranked result is only
/// assembled once every dispatched task has completed; no partial ranking
/// is ever observable.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    bands: BudgetBands,
    reason_threshold: f64,
    top_n: usize,
    pool_size: usize,
    batch_deadline: Duration,
}

impl Matcher {
    pub fn new(
        weights: ScoringWeights,
        bands: BudgetBands,
        reason_threshold: f64,
        top_n: usize,
        pool_size: usize,
        batch_deadline: Duration,
    ) -> Self {
        Self {
            weights,
            bands,
            reason_threshold,
            top_n,
            pool_size: pool_size.max(1),
            batch_deadline,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            ScoringWeights::default(),
            BudgetBands::default(),
            explain::DEFAULT_REASON_THRESHOLD,
            5,
            8,
            Duration::from_secs(30),
        )
    }

    /// Score one case/attorney pair and attach its explanations
    pub fn score_one(&self, case: &CaseProfile, attorney: &AttorneyProfile) -> MatchScore {
        let mut score = scoring::score_candidate(case, attorney, &self.weights, &self.bands);
        score.reasons = explain::build_reasons(case, attorney, &score.components, self.reason_threshold);
        score
    }

    /// Score, rank and truncate a full candidate batch
    ///
    /// Observes the cancellation flag between dispatches and while draining,
    /// so a cancel is honored within one scoring-unit latency; the whole
    /// batch runs under the configured deadline.
    pub async fn run_batch(
        &self,
        case: Arc<CaseProfile>,
        candidates: Vec<AttorneyProfile>,
        cancel: watch::Receiver<bool>,
    ) -> Result<MatchResult, AnalysisError> {
        match tokio::time::timeout(self.batch_deadline, self.score_all(case, candidates, cancel))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::Timeout),
        }
    }

    async fn score_all(
        &self,
        case: Arc<CaseProfile>,
        candidates: Vec<AttorneyProfile>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<MatchResult, AnalysisError> {
        let total_candidates = candidates.len();
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let mut tasks: JoinSet<RankedMatch> = JoinSet::new();

        for attorney in candidates {
            if *cancel.borrow() {
                return Err(AnalysisError::Cancelled);
            }

            let permit = tokio::select! {
                biased;
                _ = cancel.changed() => return Err(AnalysisError::Cancelled),
                permit = Arc::clone(&semaphore).acquire_owned() => {
                    permit.expect("worker pool semaphore closed")
                }
            };

            let matcher = self.clone();
            let case = Arc::clone(&case);
            tasks.spawn(async move {
                let _permit = permit;
                let score = matcher.score_one(&case, &attorney);
                RankedMatch { attorney, score }
            });
        }

        let mut scored = Vec::with_capacity(total_candidates);
        let mut skipped = 0;
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.changed() => return Err(AnalysisError::Cancelled),
                joined = tasks.join_next() => joined,
            };

            match joined {
                None => break,
                Some(Ok(candidate)) => scored.push(candidate),
                Some(Err(e)) => {
                    // One bad candidate never aborts the batch
                    tracing::warn!("scoring task failed, candidate excluded: {}", e);
                    skipped += 1;
                }
            }
        }

        Ok(MatchResult {
            matches: rank(scored, self.top_n),
            total_candidates,
            skipped,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
