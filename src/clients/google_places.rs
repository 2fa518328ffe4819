use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::GoogleConfig;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Places request timed out")]
    Timeout,

    #[error("Places HTTP error: {0}")]
    Http(String),

    #[error("Places API returned {status}: {message}")]
    Status { status: String, message: String },

    /// The page token has not become valid yet.
    #[error("Places page token not ready")]
    NotReady,

    #[error("Failed to decode Places response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for PlacesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
    pub place_type: String,
    pub keyword: Option<String>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchRequest {
    pub query: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
    pub language: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct LatLng {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct Geometry {
    #[serde(default)]
    pub location: LatLng,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PlacePhoto {
    #[serde(default)]
    pub photo_reference: String,
}

/// One entry of a nearby or text search response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PlaceResult {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub place_id: String,

    pub rating: Option<f64>,

    pub user_ratings_total: Option<u32>,

    pub price_level: Option<u8>,

    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub geometry: Geometry,

    pub vicinity: Option<String>,

    pub formatted_address: Option<String>,

    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
}

impl PlaceResult {
    #[must_use]
    pub fn first_photo_reference(&self) -> &str {
        self.photos
            .first()
            .map_or("", |p| p.photo_reference.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacesPage {
    pub results: Vec<PlaceResult>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
    next_page_token: Option<String>,
    #[serde(default)]
    status: String,
    error_message: Option<String>,
}

/// Interprets a Places Web Service JSON body.
///
/// `INVALID_REQUEST` while following a page token means the token is not
/// active yet and is reported as [`PlacesError::NotReady`].
pub fn parse_places_response(body: &str, with_page_token: bool) -> Result<PlacesPage, PlacesError> {
    let response: PlacesResponse =
        serde_json::from_str(body).map_err(|e| PlacesError::Decode(e.to_string()))?;

    match response.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(PlacesPage {
            results: response.results,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        }),
        "INVALID_REQUEST" if with_page_token => Err(PlacesError::NotReady),
        _ => Err(PlacesError::Status {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        }),
    }
}

/// Google Places search endpoints.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    async fn nearby_search(
        &self,
        request: &NearbySearchRequest,
        page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError>;

    async fn text_search(
        &self,
        request: &TextSearchRequest,
        page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError>;
}

#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_timeout: Duration,
}

impl GooglePlacesClient {
    /// Creates a client that reuses the application's pooled HTTP client.
    #[must_use]
    pub fn with_shared_client(client: Client, config: &GoogleConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }

    async fn fetch(
        &self,
        endpoint: &str,
        mut params: Vec<(&'static str, String)>,
        page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError> {
        let url = format!("{}/{endpoint}/json", self.base_url);

        // a page token replaces every other parameter except the key
        if let Some(token) = page_token {
            params = vec![("pagetoken", token.to_string())];
        }
        params.push(("key", self.api_key.clone()));

        debug!(endpoint, paged = page_token.is_some(), "Calling Places API");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PlacesError::Status {
                status: status.to_string(),
                message: body.chars().take(200).collect(),
            });
        }

        parse_places_response(&body, page_token.is_some())
    }
}

fn location_param(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.6},{longitude:.6}")
}

#[async_trait]
impl PlacesApi for GooglePlacesClient {
    async fn nearby_search(
        &self,
        request: &NearbySearchRequest,
        page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError> {
        let mut params = vec![
            ("location", location_param(request.latitude, request.longitude)),
            ("radius", request.radius_meters.to_string()),
            ("type", request.place_type.clone()),
            ("language", request.language.clone()),
        ];
        if let Some(keyword) = &request.keyword {
            params.push(("keyword", keyword.clone()));
        }

        self.fetch("nearbysearch", params, page_token).await
    }

    async fn text_search(
        &self,
        request: &TextSearchRequest,
        page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError> {
        let params = vec![
            ("query", request.query.clone()),
            ("location", location_param(request.latitude, request.longitude)),
            ("radius", request.radius_meters.to_string()),
            ("language", request.language.clone()),
        ];

        self.fetch("textsearch", params, page_token).await
    }
}
