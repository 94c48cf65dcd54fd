use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::domain::MatchScore;

/// One ranked attorney in a results payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMatchBody {
    #[serde(rename = "attorneyId")]
    pub attorney_id: String,
    pub name: String,
    /// Display score, rounded to the nearest integer
    pub score: u8,
    /// Points contributed per dimension (0-100 scale)
    #[serde(rename = "componentScores")]
    pub component_scores: BTreeMap<String, f64>,
    pub reasons: Vec<String>,
}

impl RankedMatchBody {
    pub fn from_score(attorney_id: String, name: String, score: &MatchScore) -> Self {
        let component_scores = score
            .components
            .iter()
            .map(|c| (c.dimension.name().to_string(), c.contribution))
            .collect();

        Self {
            attorney_id,
            name,
            score: score.total_rounded(),
            component_scores,
            reasons: score.reasons.clone(),
        }
    }
}

/// Result block of a session that reached Results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResultBody {
    pub matches: Vec<RankedMatchBody>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    /// Candidates excluded by per-candidate failure isolation
    pub skipped: usize,
}

/// Response for session creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreatedResponse {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub state: String,
}

/// Response for session state polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStateResponse {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResultBody>,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "startedAt")]
    pub started_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "cancelledAt", skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
