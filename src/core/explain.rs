use crate::models::{AttorneyProfile, BudgetTier, CaseProfile, Dimension, DimensionScore};

/// Default minimum share of total weighted contribution for a reason
pub const DEFAULT_REASON_THRESHOLD: f64 = 0.05;

/// Maximum number of reasons attached to one score
const MAX_REASONS: usize = 3;

/// Derive human-readable justifications from a score's component breakdown
///
/// Picks the top contributing dimensions (ties keep declaration order) and
/// renders one sentence each. A dimension is cited only when its share of
/// the total weighted contribution exceeds `min_share`, so a reason can
/// never assert something the score did not actually reward; an excluded
/// dimension has no component and is never cited at all.
pub fn build_reasons(
    case: &CaseProfile,
    attorney: &AttorneyProfile,
    components: &[DimensionScore],
    min_share: f64,
) -> Vec<String> {
    let total: f64 = components.iter().map(|c| c.contribution).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut ranked: Vec<&DimensionScore> = components.iter().collect();
    // Stable sort: components arrive in declaration order, which settles ties
    ranked.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));

    ranked
        .into_iter()
        .take(MAX_REASONS)
        .filter(|c| c.contribution / total > min_share)
        .map(|c| render(c.dimension, case, attorney))
        .collect()
}

fn render(dimension: Dimension, case: &CaseProfile, attorney: &AttorneyProfile) -> String {
    match dimension {
        Dimension::Specialization => {
            let covered = case
                .derived_specializations
                .intersection(&attorney.specializations)
                .count();
            let needed = case.derived_specializations.len();
            format!(
                "Strong specialization match: covers {} of the {} needed practice areas",
                covered, needed
            )
        }
        Dimension::Experience => format!(
            "{} years of experience across {} handled cases",
            attorney.experience_years, attorney.cases_handled
        ),
        Dimension::TrackRecord => {
            let rate = attorney.track_record().unwrap_or(0.0);
            format!(
                "{:.0}% success rate over {} cases",
                rate * 100.0,
                attorney.cases_handled
            )
        }
        Dimension::Language => {
            let mut shared: Vec<&str> = case
                .preferred_languages
                .intersection(&attorney.languages)
                .map(String::as_str)
                .collect();
            shared.sort_unstable();
            format!("Consultation available in {}", shared.join(", "))
        }
        Dimension::Availability => {
            if case.urgency.is_time_critical() {
                "Available to start on an urgent timeline".to_string()
            } else {
                "Availability fits the case schedule".to_string()
            }
        }
        Dimension::BudgetFit => format!(
            "Hourly rate of ${:.0} fits the {} budget",
            attorney.hourly_rate,
            budget_label(case.budget)
        ),
    }
}

fn budget_label(tier: BudgetTier) -> &'static str {
    match tier {
        BudgetTier::Economy => "economy",
        BudgetTier::Standard => "standard",
        BudgetTier::Premium => "premium",
        BudgetTier::Elite => "elite",
    }
}
