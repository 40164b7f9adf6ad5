use crate::models::{CandidateProfile, Coordinates, EducationLevel, NearbyRecord, Posting, WorkMode};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when querying the posting catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Attribute filter shared by the nearby and remote queries
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogFilter {
    /// Lowercase sector names
    pub sectors: Vec<String>,
    /// Education levels a posting may require
    pub education_levels: Vec<EducationLevel>,
    pub mode: Option<WorkMode>,
}

impl CatalogFilter {
    /// Sector and education filter for a candidate profile
    pub fn for_profile(profile: &CandidateProfile) -> Self {
        Self {
            sectors: profile.sectors.clone(),
            education_levels: profile.education_level.at_or_below(),
            mode: None,
        }
    }

    /// Restrict the filter to remote postings
    pub fn remote_only(mut self) -> Self {
        self.mode = Some(WorkMode::Remote);
        self
    }

    /// Evaluate the filter in-process
    pub fn matches(&self, posting: &Posting) -> bool {
        let sector = posting.sector.trim().to_lowercase();
        if !self.sectors.iter().any(|s| *s == sector) {
            return false;
        }

        if !self.education_levels.contains(&posting.min_education) {
            return false;
        }

        match &self.mode {
            Some(mode) => posting.mode == *mode,
            None => true,
        }
    }

    /// Store-side filter document
    ///
    /// The store compares raw field values, so it assumes postings are stored
    /// in canonical form: lowercase `sector`, `min_education` as one of
    /// [`EducationLevel::as_str`] and `mode` as [`WorkMode::as_str`]. Aliases
    /// such as `"Bachelors"` or `"Remote"` only match through [`Self::matches`],
    /// which parses records before comparing.
    pub fn to_document(&self) -> Value {
        let levels: Vec<&str> = self.education_levels.iter().map(|l| l.as_str()).collect();
        let mut filter = json!({
            "sector": {"$in": self.sectors},
            "min_education": {"$in": levels},
        });
        if let (Some(mode), Some(obj)) = (&self.mode, filter.as_object_mut()) {
            obj.insert("mode".to_string(), Value::String(mode.as_str().to_string()));
        }
        filter
    }
}

/// Coarse geo + attribute query for nearby postings
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub filter: CatalogFilter,
    pub origin: Coordinates,
    pub max_distance_km: f64,
    pub limit: usize,
}

impl NearbyQuery {
    /// Aggregation pipeline: match, add planar distance, match radius, limit
    pub fn to_pipeline(&self) -> Vec<Value> {
        vec![
            json!({"$match": self.filter.to_document()}),
            json!({
                "$addFields": {
                    "distance_km": {
                        "$multiply": [
                            crate::core::distance::KM_PER_DEGREE,
                            {
                                "$sqrt": {
                                    "$add": [
                                        {"$pow": [{"$subtract": ["$latitude", self.origin.latitude]}, 2]},
                                        {"$pow": [{"$subtract": ["$longitude", self.origin.longitude]}, 2]}
                                    ]
                                }
                            }
                        ]
                    }
                }
            }),
            json!({"$match": {"distance_km": {"$lte": self.max_distance_km}}}),
            json!({"$limit": self.limit}),
        ]
    }
}

/// Read access to the posting catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Run the coarse nearby pipeline
    async fn aggregate_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyRecord>, CatalogError>;

    /// Run a plain filter query
    async fn find(&self, filter: &CatalogFilter, limit: usize) -> Result<Vec<Posting>, CatalogError>;
}

/// Deserialize raw store documents, skipping records that do not fit the posting schema
pub fn parse_records<T: DeserializeOwned>(documents: &[Value]) -> Vec<T> {
    let mut rejected = 0usize;
    let records: Vec<T> = documents
        .iter()
        .filter_map(|doc| match serde_json::from_value(doc.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                rejected += 1;
                tracing::warn!("Skipping malformed catalog record: {}", e);
                None
            }
        })
        .collect();

    if rejected > 0 {
        tracing::debug!("Rejected {} of {} catalog records", rejected, documents.len());
    }

    records
}

/// Client for a document store exposing a JSON data API
/// (`/action/aggregate` and `/action/find`)
pub struct DocumentStoreClient {
    base_url: String,
    api_key: String,
    data_source: String,
    database: String,
    collection: String,
    client: Client,
}

impl DocumentStoreClient {
    /// Create a new document store client
    pub fn new(
        base_url: String,
        api_key: String,
        data_source: String,
        database: String,
        collection: String,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            data_source,
            database,
            collection,
            client,
        })
    }

    fn action_url(&self, action: &str) -> String {
        format!("{}/action/{}", self.base_url.trim_end_matches('/'), action)
    }

    async fn post_action(&self, action: &str, mut body: Value) -> Result<Vec<Value>, CatalogError> {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("dataSource".to_string(), Value::String(self.data_source.clone()));
            obj.insert("database".to_string(), Value::String(self.database.clone()));
            obj.insert("collection".to_string(), Value::String(self.collection.clone()));
        }

        let url = self.action_url(action);
        tracing::debug!("Catalog {} request to {}", action, url);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Catalog {} failed: {} - {}", action, status, text);
            return Err(CatalogError::ApiError(format!("{} failed: {}", action, status)));
        }

        let json: Value = response.json().await?;

        json.get("documents")
            .and_then(|d| d.as_array())
            .cloned()
            .ok_or_else(|| CatalogError::InvalidResponse("Missing documents array".into()))
    }
}

#[async_trait]
impl CatalogStore for DocumentStoreClient {
    async fn aggregate_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyRecord>, CatalogError> {
        let documents = self
            .post_action("aggregate", json!({"pipeline": query.to_pipeline()}))
            .await?;

        tracing::debug!("Coarse query returned {} documents", documents.len());

        Ok(parse_records(&documents))
    }

    async fn find(&self, filter: &CatalogFilter, limit: usize) -> Result<Vec<Posting>, CatalogError> {
        let documents = self
            .post_action("find", json!({"filter": filter.to_document(), "limit": limit}))
            .await?;

        tracing::debug!("Find query returned {} documents", documents.len());

        Ok(parse_records(&documents))
    }
}
