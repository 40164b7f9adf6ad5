use crate::core::scoring::nearby_score;
use crate::models::ScoredCandidate;
use std::cmp::Ordering;

/// Whether the remote pass should run for a nearby list of this size
#[inline]
pub fn needs_remote_fallback(nearby_count: usize, threshold: usize) -> bool {
    nearby_count < threshold
}

fn by_score_desc(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.final_score
        .partial_cmp(&a.final_score)
        .unwrap_or(Ordering::Equal)
}

/// Score, sort and truncate candidates that passed the exact distance filter
///
/// Ties on score are broken by distance (closer first).
pub fn rank_nearby(
    mut candidates: Vec<ScoredCandidate>,
    max_distance_km: f64,
    limit: usize,
) -> Vec<ScoredCandidate> {
    for candidate in &mut candidates {
        let distance = candidate.distance_km.unwrap_or(f64::NAN);
        candidate.final_score = nearby_score(candidate.similarity_score, distance, max_distance_km);
    }

    candidates.sort_by(|a, b| {
        by_score_desc(a, b).then_with(|| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
        })
    });
    candidates.truncate(limit);
    candidates
}

/// Score remote candidates by similarity alone, sort and truncate
pub fn rank_remote(mut candidates: Vec<ScoredCandidate>, limit: usize) -> Vec<ScoredCandidate> {
    for candidate in &mut candidates {
        candidate.final_score = candidate.similarity_score;
    }

    candidates.sort_by(by_score_desc);
    candidates.truncate(limit);
    candidates
}

/// Posting ids in ranked order
pub fn ranked_ids(candidates: &[ScoredCandidate]) -> Vec<String> {
    candidates.iter().map(|c| c.posting.id.clone()).collect()
}
