use serde::{Deserialize, Serialize};

/// Ordered posting ids, best match first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub nearby_ids: Vec<String>,
    pub remote_ids: Vec<String>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.nearby_ids.is_empty() && self.remote_ids.is_empty()
    }
}

/// Recommendations as returned to the caller; `error` is set when a catalog
/// query failed and the lists only hold what was computed before the failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBody {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    pub nearby_ids: Vec<String>,
    pub remote_ids: Vec<String>,
}

/// Response for the recommend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendations: RecommendationBody,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_version: u32,
    pub vocabulary_size: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(default)]
    pub nearby_ids: Vec<String>,
    #[serde(default)]
    pub remote_ids: Vec<String>,
}
