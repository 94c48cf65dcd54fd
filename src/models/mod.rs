// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AttorneyProfile, AvailabilityTier, BudgetBand, BudgetBands, BudgetTier, CaseProfile,
    Dimension, DimensionScore, MatchScore, ScoringWeights, UrgencyTier, DIMENSIONS,
};
pub use requests::{IntakeRequest, PreferencesRequest};
pub use responses::{
    ErrorResponse, HealthResponse, MatchResultBody, RankedMatchBody, SessionCreatedResponse,
    SessionStateResponse,
};
