use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{BudgetTier, UrgencyTier};

/// Case intake submission
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IntakeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "case_type", rename = "caseType")]
    pub case_type: String,
    #[validate(length(min = 1))]
    #[serde(alias = "location", rename = "location")]
    pub location: String,
    #[serde(alias = "description", rename = "description")]
    pub description: String,
}

/// Client preferences submission; triggers analysis
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PreferencesRequest {
    #[serde(alias = "urgency", rename = "urgency")]
    pub urgency: UrgencyTier,
    #[serde(alias = "budget", rename = "budget")]
    pub budget: BudgetTier,
    #[validate(length(min = 1))]
    #[serde(alias = "preferredLanguages", rename = "preferredLanguages")]
    pub preferred_languages: Vec<String>,
    /// Overrides the intake location when set
    #[serde(default)]
    #[serde(alias = "location", rename = "location")]
    pub location: Option<String>,
}
