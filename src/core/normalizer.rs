use std::collections::HashSet;
use thiserror::Error;

use crate::models::{CaseProfile, IntakeRequest, PreferencesRequest};
use crate::models::{BudgetTier, UrgencyTier};

/// Minimum description length for a usable intake
pub const MIN_DESCRIPTION_CHARS: usize = 50;

/// Errors from intake/preference validation
///
/// Recovered locally and surfaced to the caller as a field-level message,
/// never fatal to a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("description must be at least {min} characters, got {length}")]
    InvalidDescription { length: usize, min: usize },

    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },
}

/// Normalized intake fields, held by a session until analysis freezes them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseIntake {
    pub case_type: String,
    pub location: String,
    pub description: String,
}

/// Normalized client preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePreferences {
    pub urgency: UrgencyTier,
    pub budget: BudgetTier,
    pub preferred_languages: HashSet<String>,
    pub location: Option<String>,
}

/// Trim and case-fold a free-text term
pub fn canonicalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate and canonicalize a raw intake submission
///
/// Pure function: no side effects, fully deterministic.
pub fn normalize_intake(raw: &IntakeRequest) -> Result<CaseIntake, ValidationError> {
    let case_type = raw.case_type.trim();
    if case_type.is_empty() {
        return Err(ValidationError::MissingRequiredField { field: "caseType" });
    }

    let location = canonicalize_term(&raw.location);
    if location.is_empty() {
        return Err(ValidationError::MissingRequiredField { field: "location" });
    }

    let description = raw.description.trim();
    let length = description.chars().count();
    if length < MIN_DESCRIPTION_CHARS {
        return Err(ValidationError::InvalidDescription {
            length,
            min: MIN_DESCRIPTION_CHARS,
        });
    }

    Ok(CaseIntake {
        case_type: case_type.to_string(),
        location,
        description: description.to_string(),
    })
}

/// Validate and canonicalize a raw preferences submission
pub fn normalize_preferences(raw: &PreferencesRequest) -> Result<CasePreferences, ValidationError> {
    let preferred_languages: HashSet<String> = raw
        .preferred_languages
        .iter()
        .map(|l| canonicalize_term(l))
        .filter(|l| !l.is_empty())
        .collect();

    if preferred_languages.is_empty() {
        return Err(ValidationError::MissingRequiredField {
            field: "preferredLanguages",
        });
    }

    let location = raw
        .location
        .as_deref()
        .map(canonicalize_term)
        .filter(|l| !l.is_empty());

    Ok(CasePreferences {
        urgency: raw.urgency,
        budget: raw.budget,
        preferred_languages,
        location,
    })
}

/// Assemble the frozen case profile for one analysis run
///
/// The derived specialization set comes from the upstream feature service
/// and may be empty.
pub fn assemble_profile(
    intake: &CaseIntake,
    preferences: &CasePreferences,
    derived_specializations: HashSet<String>,
) -> CaseProfile {
    CaseProfile {
        case_type: intake.case_type.clone(),
        urgency: preferences.urgency,
        budget: preferences.budget,
        location: preferences
            .location
            .clone()
            .unwrap_or_else(|| intake.location.clone()),
        preferred_languages: preferences.preferred_languages.clone(),
        description: intake.description.clone(),
        derived_specializations,
    }
}
