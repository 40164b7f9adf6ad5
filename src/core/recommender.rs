use crate::core::{
    filters::{exact_distance_filter, remote_candidates},
    ranking::{needs_remote_fallback, rank_nearby, rank_remote, ranked_ids},
    scoring::attach_similarity,
    similarity::TfidfVectorizer,
};
use crate::models::{CandidateProfile, Coordinates, RankingLimits, Recommendations, ScoredCandidate};
use crate::services::{CatalogError, CatalogFilter, CatalogStore, GeocodeError, Geocoder, NearbyQuery};
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

/// Per-request failures, returned as data alongside any partial results
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Could not determine location for the city entered: {city}")]
    LocationNotFound { city: String },

    #[error("Geocoding failed: {0}")]
    GeocoderUnavailable(#[source] GeocodeError),

    #[error("Database query failed: {0}")]
    NearbyQueryFailed(#[source] CatalogError),

    #[error("Remote query failed: {0}")]
    RemoteQueryFailed(#[source] CatalogError),
}

/// A failed recommendation together with whatever was computed before the failure
#[derive(Debug)]
pub struct RecommendFailure {
    pub error: RecommendError,
    pub partial: Recommendations,
}

impl RecommendFailure {
    fn new(error: RecommendError, partial: Recommendations) -> Self {
        Self { error, partial }
    }
}

/// Recommendation orchestrator
///
/// # Pipeline Stages
/// 1. Resolve the city to coordinates
/// 2. Coarse nearby query (sector, education, planar radius)
/// 3. Exact haversine filter
/// 4. Text similarity and blended ranking
/// 5. Remote fallback when fewer than `fallback_threshold` nearby results
#[derive(Clone)]
pub struct Recommender {
    vectorizer: Arc<TfidfVectorizer>,
    catalog: Arc<dyn CatalogStore>,
    geocoder: Arc<dyn Geocoder>,
    limits: RankingLimits,
}

impl Recommender {
    pub fn new(
        vectorizer: Arc<TfidfVectorizer>,
        catalog: Arc<dyn CatalogStore>,
        geocoder: Arc<dyn Geocoder>,
        limits: RankingLimits,
    ) -> Self {
        Self {
            vectorizer,
            catalog,
            geocoder,
            limits,
        }
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Recommend nearby and remote postings for a profile
    ///
    /// Stages run strictly in order. On failure the returned
    /// [`RecommendFailure`] carries the lists computed so far.
    pub async fn recommend(
        &self,
        profile: &CandidateProfile,
    ) -> Result<Recommendations, RecommendFailure> {
        let span = tracing::info_span!("recommend", request_id = %uuid::Uuid::new_v4());
        self.run(profile).instrument(span).await
    }

    async fn run(&self, profile: &CandidateProfile) -> Result<Recommendations, RecommendFailure> {
        tracing::info!(
            "Recommending for city={:?} sectors={:?} education={} radius={}km",
            profile.city_name,
            profile.sectors,
            profile.education_level,
            profile.max_distance_km
        );

        let mut result = Recommendations::default();

        let origin = self
            .locate(&profile.city_name)
            .await
            .map_err(|e| RecommendFailure::new(e, result.clone()))?;

        let nearby = self
            .nearby_pass(profile, &origin)
            .await
            .map_err(|e| RecommendFailure::new(e, result.clone()))?;
        result.nearby_ids = ranked_ids(&nearby);

        if needs_remote_fallback(result.nearby_ids.len(), self.limits.fallback_threshold) {
            tracing::debug!(
                "Only {} nearby results, running remote pass",
                result.nearby_ids.len()
            );
            let remote = match self.remote_pass(profile).await {
                Ok(remote) => remote,
                Err(e) => {
                    tracing::error!("{}", e);
                    return Err(RecommendFailure::new(e, result));
                }
            };
            result.remote_ids = ranked_ids(&remote);
        }

        if result.is_empty() {
            tracing::info!("No postings matched the profile");
        } else {
            tracing::info!(
                "Returning {} nearby and {} remote postings",
                result.nearby_ids.len(),
                result.remote_ids.len()
            );
        }

        Ok(result)
    }

    /// Resolve the city name, rounding to 4 decimals
    async fn locate(&self, city: &str) -> Result<Coordinates, RecommendError> {
        match self.geocoder.resolve(city).await {
            Ok(Some(coords)) => Ok(coords.rounded()),
            Ok(None) => {
                tracing::info!("No location found for {:?}", city);
                Err(RecommendError::LocationNotFound { city: city.to_string() })
            }
            Err(e) => {
                tracing::error!("Geocoder failed for {:?}: {}", city, e);
                Err(RecommendError::GeocoderUnavailable(e))
            }
        }
    }

    /// Coarse query, exact filter, similarity and blended ranking
    async fn nearby_pass(
        &self,
        profile: &CandidateProfile,
        origin: &Coordinates,
    ) -> Result<Vec<ScoredCandidate>, RecommendError> {
        let query = NearbyQuery {
            filter: CatalogFilter::for_profile(profile),
            origin: *origin,
            max_distance_km: profile.max_distance_km,
            limit: self.limits.coarse_row_cap,
        };

        let records = self.catalog.aggregate_nearby(&query).await.map_err(|e| {
            tracing::error!("Coarse nearby query failed: {}", e);
            RecommendError::NearbyQueryFailed(e)
        })?;

        if records.is_empty() {
            tracing::debug!("Coarse query returned no postings");
            return Ok(Vec::new());
        }

        let coarse_count = records.len();
        let mut candidates = exact_distance_filter(records, origin, profile.max_distance_km);
        tracing::debug!(
            "Exact filter kept {} of {} coarse candidates",
            candidates.len(),
            coarse_count
        );

        if candidates.is_empty() {
            return Ok(candidates);
        }

        attach_similarity(&self.vectorizer, &profile.skills, &mut candidates);

        Ok(rank_nearby(candidates, profile.max_distance_km, self.limits.nearby_limit))
    }

    /// Remote-only query ranked by similarity alone
    async fn remote_pass(
        &self,
        profile: &CandidateProfile,
    ) -> Result<Vec<ScoredCandidate>, RecommendError> {
        let filter = CatalogFilter::for_profile(profile).remote_only();

        let postings = self
            .catalog
            .find(&filter, self.limits.remote_row_cap)
            .await
            .map_err(RecommendError::RemoteQueryFailed)?;

        let mut candidates = remote_candidates(postings);
        if candidates.is_empty() {
            return Ok(candidates);
        }

        attach_similarity(&self.vectorizer, &profile.skills, &mut candidates);

        Ok(rank_remote(candidates, self.limits.remote_limit))
    }
}
