use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{Recommender, RecommendError, RecommendFailure};
use crate::models::{ErrorResponse, HealthResponse, RecommendRequest, RecommendResponse, RecommendationBody};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
    pub default_max_distance_km: u32,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommend", web::post().to(recommend));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let vectorizer = state.recommender.vectorizer();

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_version: vectorizer.version(),
        vocabulary_size: vectorizer.vocabulary_size(),
        timestamp: chrono::Utc::now(),
    })
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
        nearby_ids: vec![],
        remote_ids: vec![],
    })
}

/// Map a failed recommendation to its HTTP response
///
/// Catalog failures still answer 200 with the partial lists and an `error`
/// field, so callers keep what was computed before the failure.
fn failure_response(failure: RecommendFailure) -> HttpResponse {
    let RecommendFailure { error, partial } = failure;
    let message = error.to_string();

    match error {
        RecommendError::LocationNotFound { .. } => HttpResponse::NotFound().json(ErrorResponse {
            error: "location_not_found".to_string(),
            message,
            status_code: 404,
            nearby_ids: partial.nearby_ids,
            remote_ids: partial.remote_ids,
        }),
        RecommendError::GeocoderUnavailable(_) => HttpResponse::BadGateway().json(ErrorResponse {
            error: "geocoder_unavailable".to_string(),
            message,
            status_code: 502,
            nearby_ids: partial.nearby_ids,
            remote_ids: partial.remote_ids,
        }),
        RecommendError::NearbyQueryFailed(_) | RecommendError::RemoteQueryFailed(_) => {
            HttpResponse::Ok().json(RecommendResponse {
                recommendations: RecommendationBody {
                    error: Some(message),
                    nearby_ids: partial.nearby_ids,
                    remote_ids: partial.remote_ids,
                },
            })
        }
    }
}

/// Recommend internships endpoint
///
/// POST /api/v1/recommend
///
/// Request body:
/// ```json
/// {
///   "skills": "python, data analysis",
///   "sectors": "technology, finance",
///   "education_level": "bachelor",
///   "city_name": "Paris",
///   "max_distance_km": 150
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let profile = match req.to_profile(state.default_max_distance_km) {
        Ok(profile) => profile,
        Err(e) => return bad_request("Validation failed", e.to_string()),
    };

    match state.recommender.recommend(&profile).await {
        Ok(recommendations) => HttpResponse::Ok().json(RecommendResponse {
            recommendations: RecommendationBody {
                error: None,
                nearby_ids: recommendations.nearby_ids,
                remote_ids: recommendations.remote_ids,
            },
        }),
        Err(failure) => failure_response(failure),
    }
}
