// Service exports
pub mod candidates;
pub mod nlp;

pub use candidates::{CandidateError, CandidateSource, HttpCandidateDirectory};
pub use nlp::{FeatureExtractor, HttpFeatureService, NlpError};
