// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod ranking;
pub mod recommender;
pub mod scoring;
pub mod similarity;

pub use distance::{haversine_distance, distance_between, planar_distance};
pub use filters::{exact_distance_filter, remote_candidates, within_radius};
pub use ranking::{needs_remote_fallback, rank_nearby, rank_remote, ranked_ids};
pub use recommender::{Recommender, RecommendError, RecommendFailure};
pub use scoring::{attach_similarity, nearby_score, proximity_bonus};
pub use similarity::{cosine_similarity, TfidfVectorizer, VectorizerError};
