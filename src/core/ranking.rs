use std::cmp::Ordering;

use crate::models::{AttorneyProfile, MatchScore};

/// One attorney paired with its computed score
#[derive(Debug, Clone)]
pub struct RankedMatch {
    pub attorney: AttorneyProfile,
    pub score: MatchScore,
}

/// Order scored candidates and truncate to the top N
///
/// Primary key: full-precision total, descending. Ties fall through, in
/// order, to higher average rating (undefined sorts lowest), higher review
/// count, and finally lexicographically smaller attorney id — so any two
/// distinct candidates always compare unequal and the output order is
/// reproducible.
pub fn rank(mut scored: Vec<RankedMatch>, top_n: usize) -> Vec<RankedMatch> {
    scored.sort_by(compare);
    scored.truncate(top_n);
    scored
}

fn compare(a: &RankedMatch, b: &RankedMatch) -> Ordering {
    b.score
        .total
        .total_cmp(&a.score.total)
        .then_with(|| rating_key(&b.attorney).total_cmp(&rating_key(&a.attorney)))
        .then_with(|| b.attorney.review_count.cmp(&a.attorney.review_count))
        .then_with(|| a.attorney.id.cmp(&b.attorney.id))
}

// Undefined ratings sort below every defined rating
fn rating_key(attorney: &AttorneyProfile) -> f64 {
    attorney.rating().unwrap_or(f64::NEG_INFINITY)
}
