use crate::core::distance::distance_between;
use crate::models::{Coordinates, NearbyRecord, ScoredCandidate};

/// Check if an exact distance is inside the search radius
///
/// NaN distances (missing or invalid coordinates) never pass.
#[inline]
pub fn within_radius(distance_km: f64, max_distance_km: f64) -> bool {
    distance_km <= max_distance_km
}

/// Exact haversine re-check of the coarse query results
///
/// Drops records without coordinates and records whose great-circle
/// distance exceeds the radius.
pub fn exact_distance_filter(
    records: Vec<NearbyRecord>,
    origin: &Coordinates,
    max_distance_km: f64,
) -> Vec<ScoredCandidate> {
    records
        .into_iter()
        .filter_map(|record| {
            let distance_km = record
                .posting
                .coordinates()
                .map(|coords| distance_between(origin, &coords))
                .unwrap_or(f64::NAN);

            if !within_radius(distance_km, max_distance_km) {
                return None;
            }

            Some(ScoredCandidate {
                posting: record.posting,
                coarse_distance_km: record.distance_km,
                distance_km: Some(distance_km),
                similarity_score: 0.0,
                final_score: 0.0,
            })
        })
        .collect()
}

/// Wrap postings from the remote query as unscored candidates
pub fn remote_candidates(postings: Vec<crate::models::Posting>) -> Vec<ScoredCandidate> {
    postings
        .into_iter()
        .filter(|posting| posting.mode.is_remote())
        .map(|posting| ScoredCandidate {
            posting,
            coarse_distance_km: None,
            distance_km: None,
            similarity_score: 0.0,
            final_score: 0.0,
        })
        .collect()
}
