use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use intern_match::config::{CatalogBackend, CatalogSettings, Settings};
use intern_match::core::{Recommender, TfidfVectorizer};
use intern_match::routes::{self, recommend::AppState};
use intern_match::services::{CatalogStore, DocumentStoreClient, MemoryCatalog, NominatimGeocoder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn io_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

/// Build the catalog backend selected in configuration
fn build_catalog(settings: &CatalogSettings) -> std::io::Result<Arc<dyn CatalogStore>> {
    match settings.backend {
        CatalogBackend::Http => {
            let endpoint = settings
                .endpoint
                .clone()
                .ok_or_else(|| io_error("catalog.endpoint is required for the http backend".into()))?;
            let client = DocumentStoreClient::new(
                endpoint,
                settings.api_key.clone().unwrap_or_default(),
                settings.data_source.clone(),
                settings.database.clone(),
                settings.collection.clone(),
                Duration::from_secs(settings.timeout_secs.unwrap_or(30)),
            )
            .map_err(|e| io_error(format!("Failed to create catalog client: {}", e)))?;
            info!("Catalog: document store at {} ({}/{})", settings.endpoint.as_deref().unwrap_or(""), settings.database, settings.collection);
            Ok(Arc::new(client))
        }
        CatalogBackend::File => {
            let path = settings
                .seed_path
                .clone()
                .ok_or_else(|| io_error("catalog.seed_path is required for the file backend".into()))?;
            let catalog = MemoryCatalog::from_seed_file(&path)
                .map_err(|e| io_error(format!("Failed to load catalog seed: {}", e)))?;
            info!("Catalog: {} postings from {}", catalog.len(), path);
            Ok(Arc::new(catalog))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let (default_level, default_format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(default_level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(default_format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting internship recommendation service...");

    let settings = settings.unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // The service must not start without the similarity model
    let vectorizer = Arc::new(
        TfidfVectorizer::load(&settings.model.vectorizer_path).unwrap_or_else(|e| {
            error!("Failed to load vectorizer: {}", e);
            panic!("Model artifact error: {}", e);
        }),
    );

    info!(
        "Vectorizer v{} loaded from {} ({} terms)",
        vectorizer.version(),
        settings.model.vectorizer_path,
        vectorizer.vocabulary_size()
    );

    let catalog = build_catalog(&settings.catalog)?;

    let geocoder = Arc::new(
        NominatimGeocoder::new(
            settings.geocoder.endpoint.clone(),
            settings.geocoder.user_agent.clone(),
            Duration::from_secs(settings.geocoder.timeout_secs.unwrap_or(10)),
        )
        .map_err(|e| io_error(format!("Failed to create geocoder client: {}", e)))?,
    );

    info!("Geocoder initialized at {}", settings.geocoder.endpoint);

    let limits = settings.recommend.limits();
    let recommender = Recommender::new(vectorizer, catalog, geocoder, limits);

    info!("Recommender initialized with limits: {:?}", limits);

    // Build application state
    let app_state = AppState {
        recommender,
        default_max_distance_km: settings.recommend.default_max_distance_km,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
