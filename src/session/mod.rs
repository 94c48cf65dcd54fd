// Matching session workflow: state machine, in-memory store, analysis pipeline
pub mod analysis;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::core::matcher::MatchResult;
use crate::core::{CaseIntake, CasePreferences};

pub use analysis::{MatchPipeline, PipelineError};

/// Workflow states of one matching session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Intake,
    Preferences,
    Analyzing,
    Results,
    Cancelled,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Intake => "intake",
            SessionState::Preferences => "preferences",
            SessionState::Analyzing => "analyzing",
            SessionState::Results => "results",
            SessionState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why an analyzing session ended in Cancelled without a user cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnalysisFailure {
    #[error("analysis deadline exceeded; retry the search")]
    Timeout,
}

/// Errors from session lookup and transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("cannot {action} from state {from}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },
}

/// Read-only snapshot of a session for callers
#[derive(Debug, Clone)]
pub struct SessionView {
    pub id: Uuid,
    pub state: SessionState,
    pub result: Option<MatchResult>,
    pub degraded: bool,
    pub failure: Option<AnalysisFailure>,
    pub started_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Frozen inputs handed to one analysis run
///
/// Cloned out of the session at the Preferences -> Analyzing transition so
/// the run operates on an immutable snapshot.
#[derive(Debug)]
pub struct AnalysisTicket {
    pub intake: CaseIntake,
    pub preferences: CasePreferences,
    pub cancel: watch::Receiver<bool>,
}

/// One client's end-to-end matching workflow instance
///
/// Owned exclusively by the requesting client's in-flight interaction;
/// never persisted beyond the session store.
#[derive(Debug)]
pub struct MatchingSession {
    pub id: Uuid,
    state: SessionState,
    intake: Option<CaseIntake>,
    preferences: Option<CasePreferences>,
    result: Option<MatchResult>,
    degraded: bool,
    failure: Option<AnalysisFailure>,
    started_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
    touched_at: DateTime<Utc>,
    cancel_tx: Option<watch::Sender<bool>>,
}

impl MatchingSession {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: SessionState::Intake,
            intake: None,
            preferences: None,
            result: None,
            degraded: false,
            failure: None,
            started_at: now,
            cancelled_at: None,
            touched_at: now,
            cancel_tx: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            state: self.state,
            result: self.result.clone(),
            degraded: self.degraded,
            failure: self.failure,
            started_at: self.started_at,
            cancelled_at: self.cancelled_at,
        }
    }

    fn touch(&mut self) {
        self.touched_at = Utc::now();
    }

    /// Intake -> Preferences, with validated intake fields
    fn submit_intake(&mut self, intake: CaseIntake) -> Result<(), SessionError> {
        if self.state != SessionState::Intake {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "submit intake",
            });
        }

        self.intake = Some(intake);
        self.state = SessionState::Preferences;
        self.touch();
        Ok(())
    }

    /// Preferences -> Analyzing: freeze the inputs and install a fresh
    /// cancellation channel
    fn begin_analysis(&mut self, preferences: CasePreferences) -> Result<AnalysisTicket, SessionError> {
        if self.state != SessionState::Preferences {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "begin analysis",
            });
        }

        // Guarded by construction elsewhere; intake is set on every path
        // into Preferences
        let intake = self.intake.clone().ok_or(SessionError::InvalidTransition {
            from: self.state,
            action: "begin analysis",
        })?;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.preferences = Some(preferences.clone());
        self.result = None;
        self.failure = None;
        self.degraded = false;
        self.cancel_tx = Some(cancel_tx);
        self.state = SessionState::Analyzing;
        self.touch();

        Ok(AnalysisTicket {
            intake,
            preferences,
            cancel: cancel_rx,
        })
    }

    /// Analyzing -> Results; a session already cancelled is never
    /// overwritten, so a late-finishing batch cannot resurrect it
    fn complete(&mut self, result: MatchResult, degraded: bool) -> bool {
        if self.state != SessionState::Analyzing {
            return false;
        }

        self.result = Some(result);
        self.degraded = degraded;
        self.cancel_tx = None;
        self.state = SessionState::Results;
        self.touch();
        true
    }

    /// Analyzing -> Cancelled on deadline expiry
    fn fail(&mut self, failure: AnalysisFailure) -> bool {
        if self.state != SessionState::Analyzing {
            return false;
        }

        self.failure = Some(failure);
        self.cancelled_at = Some(Utc::now());
        self.cancel_tx = None;
        self.state = SessionState::Cancelled;
        self.touch();
        true
    }

    /// Analyzing -> Cancelled on user request
    ///
    /// The state flips immediately; the dispatcher observes the flag
    /// cooperatively and in-flight scoring output is discarded.
    fn cancel(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Analyzing {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "cancel",
            });
        }

        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(true);
        }
        self.cancelled_at = Some(Utc::now());
        self.state = SessionState::Cancelled;
        self.touch();
        Ok(())
    }

    /// Results -> Preferences ("refine search"): discard result and
    /// preferences, keep the intake
    fn refine(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Results {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "refine",
            });
        }

        self.result = None;
        self.preferences = None;
        self.degraded = false;
        self.state = SessionState::Preferences;
        self.touch();
        Ok(())
    }

    /// Results -> Intake ("new search"): discard everything
    fn new_search(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Results {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "start a new search",
            });
        }

        self.result = None;
        self.preferences = None;
        self.intake = None;
        self.degraded = false;
        self.state = SessionState::Intake;
        self.touch();
        Ok(())
    }
}

/// In-memory session store
///
/// Sessions live only for the client's in-flight interaction; stale ones
/// are pruned lazily when new sessions are created.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, MatchingSession>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Create a fresh session at Intake
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;

        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::hours(1));
        let cutoff = Utc::now() - ttl;
        sessions.retain(|_, session| session.touched_at > cutoff);

        sessions.insert(id, MatchingSession::new(id));
        id
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, SessionError> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(|s| s.view()).ok_or(SessionError::NotFound)
    }

    pub async fn submit_intake(&self, id: Uuid, intake: CaseIntake) -> Result<SessionView, SessionError> {
        self.mutate(id, |session| session.submit_intake(intake)).await
    }

    pub async fn begin_analysis(
        &self,
        id: Uuid,
        preferences: CasePreferences,
    ) -> Result<AnalysisTicket, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound)?;
        session.begin_analysis(preferences)
    }

    /// Commit a finished batch; a no-op when the session was cancelled or
    /// dropped meanwhile
    pub async fn complete(&self, id: Uuid, result: MatchResult, degraded: bool) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&id) {
            if !session.complete(result, degraded) {
                tracing::debug!("Discarding batch result for session {} in state {}", id, session.state);
            }
        }
    }

    /// Record a deadline expiry; a no-op outside Analyzing
    pub async fn fail(&self, id: Uuid, failure: AnalysisFailure) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&id) {
            session.fail(failure);
        }
    }

    pub async fn cancel(&self, id: Uuid) -> Result<SessionView, SessionError> {
        self.mutate(id, |session| session.cancel()).await
    }

    pub async fn refine(&self, id: Uuid) -> Result<SessionView, SessionError> {
        self.mutate(id, |session| session.refine()).await
    }

    pub async fn new_search(&self, id: Uuid) -> Result<SessionView, SessionError> {
        self.mutate(id, |session| session.new_search()).await
    }

    async fn mutate<F>(&self, id: Uuid, op: F) -> Result<SessionView, SessionError>
    where
        F: FnOnce(&mut MatchingSession) -> Result<(), SessionError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound)?;
        op(session)?;
        Ok(session.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetTier, UrgencyTier};
    use std::collections::HashSet;

    fn intake() -> CaseIntake {
        CaseIntake {
            case_type: "Employment Law".to_string(),
            location: "new york".to_string(),
            description: "Dismissed without notice after reporting safety violations at work.".to_string(),
        }
    }

    fn preferences() -> CasePreferences {
        CasePreferences {
            urgency: UrgencyTier::Standard,
            budget: BudgetTier::Standard,
            preferred_languages: ["english".to_string()].into_iter().collect::<HashSet<_>>(),
            location: None,
        }
    }

    fn empty_result() -> MatchResult {
        MatchResult {
            matches: vec![],
            total_candidates: 0,
            skipped: 0,
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut session = MatchingSession::new(Uuid::new_v4());
        assert_eq!(session.state(), SessionState::Intake);

        session.submit_intake(intake()).unwrap();
        assert_eq!(session.state(), SessionState::Preferences);

        let ticket = session.begin_analysis(preferences()).unwrap();
        assert_eq!(session.state(), SessionState::Analyzing);
        assert_eq!(ticket.intake, intake());

        assert!(session.complete(empty_result(), false));
        assert_eq!(session.state(), SessionState::Results);
    }

    #[test]
    fn test_preferences_require_intake_first() {
        let mut session = MatchingSession::new(Uuid::new_v4());

        let err = session.begin_analysis(preferences()).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                from: SessionState::Intake,
                action: "begin analysis"
            }
        );
    }

    #[test]
    fn test_cancel_only_while_analyzing() {
        let mut session = MatchingSession::new(Uuid::new_v4());
        session.submit_intake(intake()).unwrap();

        assert!(session.cancel().is_err());

        session.begin_analysis(preferences()).unwrap();
        session.cancel().unwrap();
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.cancelled_at.is_some());
    }

    #[test]
    fn test_cancelled_session_never_reports_results() {
        let mut session = MatchingSession::new(Uuid::new_v4());
        session.submit_intake(intake()).unwrap();
        session.begin_analysis(preferences()).unwrap();
        session.cancel().unwrap();

        // A batch finishing after the cancel must be discarded
        assert!(!session.complete(empty_result(), false));
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.view().result.is_none());
    }

    #[test]
    fn test_cancel_signals_the_dispatcher() {
        let mut session = MatchingSession::new(Uuid::new_v4());
        session.submit_intake(intake()).unwrap();
        let ticket = session.begin_analysis(preferences()).unwrap();

        session.cancel().unwrap();
        assert!(*ticket.cancel.borrow());
    }

    #[test]
    fn test_refine_discards_result_and_preferences() {
        let mut session = MatchingSession::new(Uuid::new_v4());
        session.submit_intake(intake()).unwrap();
        session.begin_analysis(preferences()).unwrap();
        session.complete(empty_result(), false);

        session.refine().unwrap();
        assert_eq!(session.state(), SessionState::Preferences);
        assert!(session.result.is_none());
        assert!(session.preferences.is_none());
        // Intake survives a refine
        assert!(session.intake.is_some());

        // The session can be re-analyzed from here
        session.begin_analysis(preferences()).unwrap();
        assert_eq!(session.state(), SessionState::Analyzing);
    }

    #[test]
    fn test_new_search_discards_intake_too() {
        let mut session = MatchingSession::new(Uuid::new_v4());
        session.submit_intake(intake()).unwrap();
        session.begin_analysis(preferences()).unwrap();
        session.complete(empty_result(), false);

        session.new_search().unwrap();
        assert_eq!(session.state(), SessionState::Intake);
        assert!(session.intake.is_none());
        assert!(session.preferences.is_none());
        assert!(session.result.is_none());
    }

    #[test]
    fn test_timeout_failure_moves_to_cancelled() {
        let mut session = MatchingSession::new(Uuid::new_v4());
        session.submit_intake(intake()).unwrap();
        session.begin_analysis(preferences()).unwrap();

        assert!(session.fail(AnalysisFailure::Timeout));
        assert_eq!(session.state(), SessionState::Cancelled);
        assert_eq!(session.view().failure, Some(AnalysisFailure::Timeout));
    }

    #[tokio::test]
    async fn test_store_lookup_and_not_found() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let id = store.create().await;

        assert_eq!(store.view(id).await.unwrap().state, SessionState::Intake);
        assert_eq!(store.view(Uuid::new_v4()).await.unwrap_err(), SessionError::NotFound);
    }

    #[tokio::test]
    async fn test_store_prunes_expired_sessions() {
        let store = SessionStore::new(Duration::from_secs(0));
        let stale = store.create().await;

        // A zero TTL expires the first session as soon as another is created
        let fresh = store.create().await;

        assert_eq!(store.view(stale).await.unwrap_err(), SessionError::NotFound);
        assert!(store.view(fresh).await.is_ok());
    }
}
