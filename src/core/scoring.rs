use crate::models::{
    AttorneyProfile, AvailabilityTier, BudgetBand, BudgetBands, CaseProfile, Dimension,
    DimensionScore, MatchScore, ScoringWeights, DIMENSIONS,
};

/// Compute a match score (0-100) for one case/attorney pair
///
/// Scoring formula (default weights):
/// ```text
/// total = 100 * (
///     specialization * 0.35 +   # overlap with derived specializations
///     experience     * 0.20 +   # years blended with case volume
///     track_record   * 0.20 +   # success rate; excluded when undefined
///     language       * 0.10 +   # any shared language
///     availability   * 0.10 +   # availability vs urgency lookup
///     budget_fit     * 0.05     # hourly rate vs budget band
/// )
/// ```
///
/// A dimension with undefined inputs is excluded and the remaining weights
/// are rescaled to sum to 1.0 before combining, so totals stay comparable
/// across attorneys regardless of missing data.
pub fn score_candidate(
    case: &CaseProfile,
    attorney: &AttorneyProfile,
    weights: &ScoringWeights,
    bands: &BudgetBands,
) -> MatchScore {
    let raw: Vec<(Dimension, Option<f64>)> = DIMENSIONS
        .iter()
        .map(|&dimension| (dimension, dimension_score(dimension, case, attorney, bands)))
        .collect();

    let defined_weight: f64 = raw
        .iter()
        .filter(|(_, score)| score.is_some())
        .map(|(dimension, _)| weights.for_dimension(*dimension))
        .sum();

    let mut components = Vec::with_capacity(raw.len());
    if defined_weight > 0.0 {
        for (dimension, score) in raw {
            if let Some(score) = score {
                let weight = weights.for_dimension(dimension) / defined_weight;
                components.push(DimensionScore {
                    dimension,
                    weight,
                    score,
                    contribution: 100.0 * weight * score,
                });
            }
        }
    }

    let total = components
        .iter()
        .map(|c| c.contribution)
        .sum::<f64>()
        .clamp(0.0, 100.0);

    MatchScore {
        total,
        components,
        reasons: Vec::new(),
    }
}

/// Normalized score for one dimension, or None when its inputs are undefined
fn dimension_score(
    dimension: Dimension,
    case: &CaseProfile,
    attorney: &AttorneyProfile,
    bands: &BudgetBands,
) -> Option<f64> {
    match dimension {
        Dimension::Specialization => Some(specialization_score(case, attorney)),
        Dimension::Experience => Some(experience_score(attorney)),
        Dimension::TrackRecord => attorney.track_record().map(|r| r.clamp(0.0, 1.0)),
        Dimension::Language => Some(language_score(case, attorney)),
        Dimension::Availability => Some(availability_score(case, attorney.availability)),
        Dimension::BudgetFit => Some(budget_score(
            attorney.hourly_rate,
            bands.for_tier(case.budget),
        )),
    }
}

/// Fraction of the derived specializations the attorney covers
#[inline]
fn specialization_score(case: &CaseProfile, attorney: &AttorneyProfile) -> f64 {
    let overlap = case
        .derived_specializations
        .intersection(&attorney.specializations)
        .count();
    let needed = case.derived_specializations.len().max(1);

    (overlap as f64 / needed as f64).clamp(0.0, 1.0)
}

/// Years of experience blended with a case-volume confidence factor
#[inline]
fn experience_score(attorney: &AttorneyProfile) -> f64 {
    let experience_factor = (attorney.experience_years as f64 / 15.0).min(1.0);
    let volume_factor = (attorney.cases_handled as f64 / 200.0).min(1.0);

    0.7 * experience_factor + 0.3 * volume_factor
}

/// Full credit when any preferred language is shared
#[inline]
fn language_score(case: &CaseProfile, attorney: &AttorneyProfile) -> f64 {
    let shared = case
        .preferred_languages
        .intersection(&attorney.languages)
        .next()
        .is_some();

    if shared {
        1.0
    } else {
        0.0
    }
}

/// Availability lookup against case urgency
///
/// Time-critical cases require high availability for full credit; otherwise
/// every tier scores full.
#[inline]
fn availability_score(case: &CaseProfile, availability: AvailabilityTier) -> f64 {
    if !case.urgency.is_time_critical() {
        return 1.0;
    }

    match availability {
        AvailabilityTier::High => 1.0,
        AvailabilityTier::Medium => 0.5,
        AvailabilityTier::Low => 0.0,
    }
}

/// Fit of the hourly rate against the tier's configured band
///
/// Rates inside (or below) the band score full; above it the score decays
/// linearly, reaching zero at twice the band's upper bound.
#[inline]
fn budget_score(hourly_rate: f64, band: BudgetBand) -> f64 {
    if band.max <= 0.0 {
        return if hourly_rate <= 0.0 { 1.0 } else { 0.0 };
    }

    if hourly_rate <= band.max {
        return 1.0;
    }

    ((2.0 * band.max - hourly_rate) / band.max).clamp(0.0, 1.0)
}
