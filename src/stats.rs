use indexmap::IndexMap;

use crate::data_models::{NormalizedListing, SalaryStats, StatisticsBundle};

/// Experience bucket for listings that carry no label.
pub const UNSPECIFIED_EXPERIENCE: &str = "unspecified";

/// Size cap of the top-skill table.
pub const TOP_SKILLS_LIMIT: usize = 20;

pub fn aggregate(listings: &[NormalizedListing], total_found: u64) -> StatisticsBundle {
    StatisticsBundle {
        total_found,
        salary_stats: salary_stats(listings),
        experience_distribution: experience_distribution(listings),
        top_skills: top_skills(listings, TOP_SKILLS_LIMIT),
        skill_coverage: skill_coverage(listings),
    }
}

/// Pools every present lower and upper bound into one sorted multiset.
/// The median is the element at `n / 2`, so even-sized pools report the upper
/// of the two middle values rather than their average.
pub fn salary_stats(listings: &[NormalizedListing]) -> SalaryStats {
    let mut pool: Vec<u64> = listings
        .iter()
        .flat_map(|l| [l.salary_from, l.salary_to])
        .flatten()
        .collect();

    if pool.is_empty() {
        return SalaryStats::default();
    }
    pool.sort_unstable();

    let sum: u128 = pool.iter().map(|&v| u128::from(v)).sum();
    SalaryStats {
        min: pool[0],
        max: pool[pool.len() - 1],
        mean: sum as f64 / pool.len() as f64,
        median: pool[pool.len() / 2],
    }
}

pub fn experience_distribution(listings: &[NormalizedListing]) -> IndexMap<String, u64> {
    let mut distribution = IndexMap::new();
    for listing in listings {
        let label = listing
            .experience
            .as_deref()
            .unwrap_or(UNSPECIFIED_EXPERIENCE);
        *distribution.entry(label.to_string()).or_insert(0) += 1;
    }
    distribution
}

/// Most frequent skills, highest count first. Equal counts keep the order in
/// which the skills were first seen.
pub fn top_skills(listings: &[NormalizedListing], limit: usize) -> IndexMap<String, u64> {
    let mut counts: IndexMap<&str, u64> = IndexMap::new();
    for skill in listings.iter().flat_map(|l| l.skills.iter()) {
        *counts.entry(skill.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    // stable: ties stay in insertion order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(skill, count)| (skill.to_string(), count))
        .collect()
}

pub fn skill_coverage(listings: &[NormalizedListing]) -> u64 {
    listings.iter().filter(|l| !l.skills.is_empty()).count() as u64
}
