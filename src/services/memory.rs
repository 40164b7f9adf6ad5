use crate::core::distance::planar_distance;
use crate::models::{NearbyRecord, Posting};
use crate::services::catalog::{parse_records, CatalogError, CatalogFilter, CatalogStore, NearbyQuery};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// In-process posting catalog
///
/// Evaluates the same coarse and remote queries as the document store, which
/// makes it usable for local runs from a seed file and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    postings: Vec<Posting>,
}

impl MemoryCatalog {
    pub fn new(postings: Vec<Posting>) -> Self {
        Self { postings }
    }

    /// Load postings from a JSON array of store documents
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let documents: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::InvalidResponse(format!("{}: {}", path.display(), e)))?;

        let postings = parse_records(&documents);
        tracing::info!("Loaded {} postings from {}", postings.len(), path.display());

        Ok(Self::new(postings))
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn aggregate_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyRecord>, CatalogError> {
        let records = self
            .postings
            .iter()
            .filter(|posting| query.filter.matches(posting))
            .filter_map(|posting| {
                // A null distance never satisfies `$lte`, so unlocated postings are skipped
                let distance_km = planar_distance(&query.origin, &posting.coordinates()?);
                (distance_km <= query.max_distance_km).then(|| NearbyRecord {
                    posting: posting.clone(),
                    distance_km: Some(distance_km),
                })
            })
            .take(query.limit)
            .collect();

        Ok(records)
    }

    async fn find(&self, filter: &CatalogFilter, limit: usize) -> Result<Vec<Posting>, CatalogError> {
        Ok(self
            .postings
            .iter()
            .filter(|posting| filter.matches(posting))
            .take(limit)
            .cloned()
            .collect())
    }
}
