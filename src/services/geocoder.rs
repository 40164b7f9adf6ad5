use crate::models::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when resolving a place name
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Place name lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name; `Ok(None)` when nothing matches
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Client for a Nominatim-compatible `/search` endpoint
pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    client: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: String, user_agent: String, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            user_agent,
            client,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(place)
        );

        tracing::debug!("Geocoding {:?}", place);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Failed to geocode {:?}: {}",
                place,
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response.json().await?;

        let Some(first) = places.first() else {
            return Ok(None);
        };

        let latitude = first
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::InvalidResponse(format!("bad latitude {:?}: {}", first.lat, e)))?;
        let longitude = first
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::InvalidResponse(format!("bad longitude {:?}: {}", first.lon, e)))?;

        Ok(Some(Coordinates::new(latitude, longitude)))
    }
}

/// Fixed lookup table keyed by lowercase place name
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, coordinates: Coordinates) -> Self {
        self.places.insert(name.trim().to_lowercase(), coordinates);
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
        Ok(self.places.get(&place.trim().to_lowercase()).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geocoder(base_url: String) -> NominatimGeocoder {
        NominatimGeocoder::new(base_url, "internship_recommender".to_string(), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("q".into(), "Paris".into()),
                mockito::Matcher::UrlEncoded("format".into(), "json".into()),
            ]))
            .match_header("user-agent", "internship_recommender")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"lat": "48.8588897", "lon": "2.3200410", "display_name": "Paris"}]"#)
            .create_async()
            .await;

        let coords = geocoder(server.url()).resolve("Paris").await.unwrap();

        mock.assert_async().await;
        assert_eq!(coords, Some(Coordinates::new(48.8588897, 2.3200410)));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let coords = geocoder(server.url()).resolve("Nowhereville123").await.unwrap();
        assert!(coords.is_none());
    }

    #[tokio::test]
    async fn test_resolve_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = geocoder(server.url()).resolve("Paris").await.unwrap_err();
        assert!(matches!(err, GeocodeError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_static_geocoder_is_case_insensitive() {
        let geo = StaticGeocoder::new().with_place("Paris", Coordinates::new(48.8566, 2.3522));
        assert!(geo.resolve(" PARIS ").await.unwrap().is_some());
        assert!(geo.resolve("Lyon").await.unwrap().is_none());
    }
}
