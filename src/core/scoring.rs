use crate::core::similarity::{score_texts, TfidfVectorizer};
use crate::models::ScoredCandidate;

/// Proximity bonus in [0, 1], decaying linearly to 0 at the radius boundary
///
/// A zero radius only admits postings at the exact origin; those get the full
/// bonus instead of dividing by zero.
#[inline]
pub fn proximity_bonus(distance_km: f64, max_distance_km: f64) -> f64 {
    if max_distance_km <= 0.0 {
        return if distance_km <= 0.0 { 1.0 } else { 0.0 };
    }
    ((max_distance_km - distance_km) / max_distance_km).max(0.0)
}

/// Blended nearby score: text relevance in [0, 1] plus proximity bonus in [0, 1]
///
/// score = similarity + max(0, (max_distance - distance) / max_distance)
#[inline]
pub fn nearby_score(similarity: f64, distance_km: f64, max_distance_km: f64) -> f64 {
    similarity + proximity_bonus(distance_km, max_distance_km)
}

/// Fill in `similarity_score` for every candidate against the profile skills
pub fn attach_similarity(
    vectorizer: &TfidfVectorizer,
    candidate_skills: &str,
    candidates: &mut [ScoredCandidate],
) {
    if candidates.is_empty() {
        return;
    }

    let texts: Vec<String> = candidates.iter().map(|c| c.posting.combined_text()).collect();
    let scores = score_texts(vectorizer, candidate_skills, &texts);

    for (candidate, score) in candidates.iter_mut().zip(scores) {
        candidate.similarity_score = score;
    }
}
