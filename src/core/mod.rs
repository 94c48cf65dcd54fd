// Core algorithm exports
pub mod explain;
pub mod matcher;
pub mod normalizer;
pub mod ranking;
pub mod scoring;

pub use explain::{build_reasons, DEFAULT_REASON_THRESHOLD};
pub use matcher::{AnalysisError, MatchResult, Matcher};
pub use normalizer::{
    assemble_profile, canonicalize_term, normalize_intake, normalize_preferences, CaseIntake,
    CasePreferences, ValidationError, MIN_DESCRIPTION_CHARS,
};
pub use ranking::{rank, RankedMatch};
pub use scoring::score_candidate;
