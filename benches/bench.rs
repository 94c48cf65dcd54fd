// Criterion benchmarks for Lexora Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lexora_match::core::{rank, score_candidate, RankedMatch};
use lexora_match::models::{
    AttorneyProfile, AvailabilityTier, BudgetBands, BudgetTier, CaseProfile, ScoringWeights,
    UrgencyTier,
};
use std::collections::HashSet;

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn create_case() -> CaseProfile {
    CaseProfile {
        case_type: "Employment Law".to_string(),
        urgency: UrgencyTier::Urgent,
        budget: BudgetTier::Standard,
        location: "new york".to_string(),
        preferred_languages: set(&["english", "spanish"]),
        description: "Dismissed from my position without notice after reporting safety violations.".to_string(),
        derived_specializations: set(&["employment law", "labor disputes"]),
    }
}

fn create_candidate(id: usize) -> AttorneyProfile {
    AttorneyProfile {
        id: format!("attorney_{:04}", id),
        name: format!("Attorney {}", id),
        specializations: if id % 3 == 0 {
            set(&["employment law"])
        } else {
            set(&["corporate law", "tax law"])
        },
        experience_years: (id % 25) as u32,
        cases_handled: (id * 7 % 400) as u32,
        success_rate: if id % 5 == 0 { None } else { Some(0.5 + (id % 50) as f64 / 100.0) },
        languages: set(&["english"]),
        location: "new york".to_string(),
        hourly_rate: 100.0 + (id % 40) as f64 * 15.0,
        average_rating: Some(3.0 + (id % 20) as f64 / 10.0),
        review_count: (id % 90) as u32,
        availability: match id % 3 {
            0 => AvailabilityTier::High,
            1 => AvailabilityTier::Medium,
            _ => AvailabilityTier::Low,
        },
    }
}

fn bench_score_candidate(c: &mut Criterion) {
    let case = create_case();
    let attorney = create_candidate(3);
    let weights = ScoringWeights::default();
    let bands = BudgetBands::default();

    c.bench_function("score_candidate", |b| {
        b.iter(|| {
            score_candidate(
                black_box(&case),
                black_box(&attorney),
                black_box(&weights),
                black_box(&bands),
            )
        });
    });
}

fn bench_score_and_rank_pool(c: &mut Criterion) {
    let case = create_case();
    let weights = ScoringWeights::default();
    let bands = BudgetBands::default();

    let mut group = c.benchmark_group("score_and_rank_pool");
    for pool_size in [10, 100, 1000] {
        let candidates: Vec<AttorneyProfile> = (0..pool_size).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(pool_size),
            &candidates,
            |b, candidates| {
                b.iter(|| {
                    let scored: Vec<RankedMatch> = candidates
                        .iter()
                        .map(|a| RankedMatch {
                            attorney: a.clone(),
                            score: score_candidate(&case, a, &weights, &bands),
                        })
                        .collect();
                    rank(black_box(scored), 5)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_score_candidate, bench_score_and_rank_pool);
criterion_main!(benches);
