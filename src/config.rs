use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::models::RankingLimits;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    pub geocoder: GeocoderSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub recommend: RecommendSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Where postings are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    /// Document store data API over HTTP
    Http,
    /// JSON seed file held in memory
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub backend: CatalogBackend,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_data_source")]
    pub data_source: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    pub timeout_secs: Option<u64>,
    pub seed_path: Option<String>,
}

fn default_data_source() -> String { "Cluster0".to_string() }
fn default_database() -> String { "internships".to_string() }
fn default_collection() -> String { "postings".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderSettings {
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    pub timeout_secs: Option<u64>,
}

fn default_user_agent() -> String { "internship_recommender".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_vectorizer_path")]
    pub vectorizer_path: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            vectorizer_path: default_vectorizer_path(),
        }
    }
}

fn default_vectorizer_path() -> String { "models/tfidf_vectorizer.v1.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendSettings {
    #[serde(default = "default_max_distance_km")]
    pub default_max_distance_km: u32,
    #[serde(default = "default_list_limit")]
    pub nearby_limit: usize,
    #[serde(default = "default_list_limit")]
    pub remote_limit: usize,
    #[serde(default = "default_coarse_row_cap")]
    pub coarse_row_cap: usize,
    #[serde(default = "default_remote_row_cap")]
    pub remote_row_cap: usize,
    #[serde(default = "default_list_limit")]
    pub fallback_threshold: usize,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            default_max_distance_km: default_max_distance_km(),
            nearby_limit: default_list_limit(),
            remote_limit: default_list_limit(),
            coarse_row_cap: default_coarse_row_cap(),
            remote_row_cap: default_remote_row_cap(),
            fallback_threshold: default_list_limit(),
        }
    }
}

impl RecommendSettings {
    pub fn limits(&self) -> RankingLimits {
        RankingLimits {
            nearby_limit: self.nearby_limit,
            remote_limit: self.remote_limit,
            coarse_row_cap: self.coarse_row_cap,
            remote_row_cap: self.remote_row_cap,
            fallback_threshold: self.fallback_threshold,
        }
    }
}

fn default_max_distance_km() -> u32 { 150 }
fn default_list_limit() -> usize { 5 }
fn default_coarse_row_cap() -> usize { 500 }
fn default_remote_row_cap() -> usize { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with INTERN__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., INTERN__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("INTERN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }
}

/// Apply well-known unprefixed environment variables
///
/// `CATALOG_API_KEY` and `MODEL_PATH` are honoured so deployments can reuse
/// secrets and artifact paths without the `INTERN__` prefix.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(api_key) = env::var("CATALOG_API_KEY") {
        builder = builder.set_override("catalog.api_key", api_key)?;
    }
    if let Ok(model_path) = env::var("MODEL_PATH") {
        builder = builder.set_override("model.vectorizer_path", model_path)?;
    }

    builder.build()
}
