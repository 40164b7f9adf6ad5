// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    parse_sectors, CandidateProfile, Coordinates, EducationLevel, NearbyRecord, Posting,
    RankingLimits, ScoredCandidate, Skills, UnknownEducationLevel, WorkMode,
};
pub use requests::RecommendRequest;
pub use responses::{ErrorResponse, HealthResponse, RecommendResponse, RecommendationBody, Recommendations};
