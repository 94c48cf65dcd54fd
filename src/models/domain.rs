use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Case urgency, from most to least time-critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Emergency,
    Urgent,
    Standard,
    Flexible,
    Planning,
}

impl UrgencyTier {
    /// Emergency and urgent cases need an attorney who can start now
    pub fn is_time_critical(&self) -> bool {
        matches!(self, UrgencyTier::Emergency | UrgencyTier::Urgent)
    }
}

/// Client budget tier, from least to most expensive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Economy,
    Standard,
    Premium,
    Elite,
}

/// How quickly an attorney can take on new work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityTier {
    High,
    Medium,
    Low,
}

/// Normalized, frozen representation of a client's legal matter
///
/// Assembled once when a session enters analysis and never mutated after;
/// a repeated analysis always builds a fresh snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseProfile {
    #[serde(rename = "caseType")]
    pub case_type: String,
    pub urgency: UrgencyTier,
    pub budget: BudgetTier,
    pub location: String,
    #[serde(rename = "preferredLanguages")]
    pub preferred_languages: HashSet<String>,
    pub description: String,
    #[serde(rename = "derivedSpecializations", default)]
    pub derived_specializations: HashSet<String>,
}

/// Candidate attorney record, supplied by the directory and read-only here
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttorneyProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specializations: HashSet<String>,
    #[serde(rename = "experienceYears")]
    pub experience_years: u32,
    #[serde(rename = "casesHandled")]
    pub cases_handled: u32,
    #[serde(rename = "successRate", default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub languages: HashSet<String>,
    pub location: String,
    #[serde(rename = "hourlyRate")]
    pub hourly_rate: f64,
    #[serde(rename = "averageRating", default)]
    pub average_rating: Option<f64>,
    #[serde(rename = "reviewCount", default)]
    pub review_count: u32,
    pub availability: AvailabilityTier,
}

impl AttorneyProfile {
    /// Success rate, undefined until at least one case has been handled
    pub fn track_record(&self) -> Option<f64> {
        if self.cases_handled == 0 {
            None
        } else {
            self.success_rate
        }
    }

    /// Average rating, undefined until at least one review exists
    pub fn rating(&self) -> Option<f64> {
        if self.review_count == 0 {
            None
        } else {
            self.average_rating
        }
    }
}

/// Scoring dimensions in declaration order
///
/// The order is load-bearing: explanation tie-breaks and the component
/// breakdown follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Specialization,
    Experience,
    TrackRecord,
    Language,
    Availability,
    BudgetFit,
}

/// All dimensions in declaration order
pub const DIMENSIONS: [Dimension; 6] = [
    Dimension::Specialization,
    Dimension::Experience,
    Dimension::TrackRecord,
    Dimension::Language,
    Dimension::Availability,
    Dimension::BudgetFit,
];

impl Dimension {
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Specialization => "specialization",
            Dimension::Experience => "experience",
            Dimension::TrackRecord => "track_record",
            Dimension::Language => "language",
            Dimension::Availability => "availability",
            Dimension::BudgetFit => "budget_fit",
        }
    }
}

/// One dimension's part of a match score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    /// Effective weight after renormalization over defined dimensions
    pub weight: f64,
    /// Normalized dimension score in [0, 1]
    pub score: f64,
    /// Points contributed to the total (0-100 scale)
    pub contribution: f64,
}

/// Computed compatibility score for one case/attorney pair
///
/// `total` keeps full precision; rounding to an integer happens only at the
/// display boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchScore {
    pub total: f64,
    pub components: Vec<DimensionScore>,
    pub reasons: Vec<String>,
}

impl MatchScore {
    /// Display form of the total, rounded to the nearest integer
    pub fn total_rounded(&self) -> u8 {
        self.total.round().clamp(0.0, 100.0) as u8
    }
}

/// Scoring weights, one per dimension, summing to 1.0
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub specialization: f64,
    pub experience: f64,
    pub track_record: f64,
    pub language: f64,
    pub availability: f64,
    pub budget_fit: f64,
}

impl ScoringWeights {
    pub fn for_dimension(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Specialization => self.specialization,
            Dimension::Experience => self.experience,
            Dimension::TrackRecord => self.track_record,
            Dimension::Language => self.language,
            Dimension::Availability => self.availability,
            Dimension::BudgetFit => self.budget_fit,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            specialization: 0.35,
            experience: 0.20,
            track_record: 0.20,
            language: 0.10,
            availability: 0.10,
            budget_fit: 0.05,
        }
    }
}

/// Hourly-rate band for one budget tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetBand {
    pub min: f64,
    pub max: f64,
}

/// Hourly-rate bands per budget tier
#[derive(Debug, Clone, Copy)]
pub struct BudgetBands {
    pub economy: BudgetBand,
    pub standard: BudgetBand,
    pub premium: BudgetBand,
    pub elite: BudgetBand,
}

impl BudgetBands {
    pub fn for_tier(&self, tier: BudgetTier) -> BudgetBand {
        match tier {
            BudgetTier::Economy => self.economy,
            BudgetTier::Standard => self.standard,
            BudgetTier::Premium => self.premium,
            BudgetTier::Elite => self.elite,
        }
    }
}

impl Default for BudgetBands {
    fn default() -> Self {
        Self {
            economy: BudgetBand { min: 0.0, max: 150.0 },
            standard: BudgetBand { min: 100.0, max: 300.0 },
            premium: BudgetBand { min: 250.0, max: 600.0 },
            elite: BudgetBand { min: 500.0, max: 1200.0 },
        }
    }
}
