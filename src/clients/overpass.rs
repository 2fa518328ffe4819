use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::OverpassConfig;
use crate::constants::overpass::DIET_KEYWORDS;

#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("Overpass request timed out")]
    Timeout,

    #[error("Overpass HTTP error: {0}")]
    Http(String),

    #[error("Overpass API returned status {0}")]
    Status(u16),

    #[error("Failed to decode Overpass response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for OverpassError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OverpassElement {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub id: i64,

    pub lat: Option<f64>,

    pub lon: Option<f64>,

    pub center: Option<Center>,

    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl OverpassElement {
    /// Node coordinates, or the computed center for ways.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self.center.map(|c| (c.lat, c.lon)),
        }
    }

    #[must_use]
    pub fn tag(&self, key: &str) -> &str {
        self.tags.get(key).map_or("", String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

pub fn parse_overpass_response(body: &str) -> Result<Vec<OverpassElement>, OverpassError> {
    serde_json::from_str::<OverpassResponse>(body)
        .map(|r| r.elements)
        .map_err(|e| OverpassError::Decode(e.to_string()))
}

/// Parameters of one "food venues around a point" Overpass query.
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
    pub amenities: Vec<String>,
    pub keyword: Option<String>,
    pub timeout_seconds: u32,
}

fn escape_ql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl OverpassQuery {
    /// Renders the query as Overpass QL.
    #[must_use]
    pub fn to_ql(&self) -> String {
        let around = format!(
            "(around:{},{:.6},{:.6})",
            self.radius_meters, self.latitude, self.longitude
        );

        let mut clauses = Vec::new();
        for amenity in &self.amenities {
            let amenity = escape_ql(amenity);
            clauses.push(format!(r#"node["amenity"="{amenity}"]{around};"#));
            clauses.push(format!(r#"way["amenity"="{amenity}"]{around};"#));
        }

        if let Some(keyword) = self.keyword.as_deref().map(str::to_lowercase) {
            let escaped = escape_ql(&keyword);
            clauses.push(format!(r#"node["cuisine"~"{escaped}",i]{around};"#));
            clauses.push(format!(r#"way["cuisine"~"{escaped}",i]{around};"#));

            if DIET_KEYWORDS.contains(&keyword.as_str()) {
                clauses.push(format!(r#"node["diet:{keyword}"="yes"]{around};"#));
                clauses.push(format!(r#"way["diet:{keyword}"="yes"]{around};"#));
            }
        }

        let mut ql = format!("[out:json][timeout:{}];\n(\n", self.timeout_seconds);
        for clause in clauses {
            let _ = writeln!(ql, "  {clause}");
        }
        ql.push_str(");\nout center meta;\n");
        ql
    }
}

#[async_trait]
pub trait OverpassApi: Send + Sync {
    async fn query(&self, query: &OverpassQuery) -> Result<Vec<OverpassElement>, OverpassError>;
}

#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl OverpassClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &OverpassConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }
}

#[async_trait]
impl OverpassApi for OverpassClient {
    async fn query(&self, query: &OverpassQuery) -> Result<Vec<OverpassElement>, OverpassError> {
        let ql = query.to_ql();
        debug!(amenities = query.amenities.len(), keyword = ?query.keyword, "Posting Overpass query");

        let response = self
            .client
            .post(&self.base_url)
            .form(&[("data", ql)])
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OverpassError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_overpass_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(amenities: &[&str], keyword: Option<&str>) -> OverpassQuery {
        OverpassQuery {
            latitude: 52.52,
            longitude: 13.405,
            radius_meters: 2000,
            amenities: amenities.iter().map(ToString::to_string).collect(),
            keyword: keyword.map(ToString::to_string),
            timeout_seconds: 15,
        }
    }

    #[test]
    fn test_query_has_node_and_way_per_amenity() {
        let ql = query(&["cafe", "bar"], None).to_ql();

        assert!(ql.starts_with("[out:json][timeout:15];"));
        assert!(ql.contains(r#"node["amenity"="cafe"](around:2000,52.520000,13.405000);"#));
        assert!(ql.contains(r#"way["amenity"="cafe"](around:2000,52.520000,13.405000);"#));
        assert!(ql.contains(r#"node["amenity"="bar"]"#));
        assert!(ql.trim_end().ends_with("out center meta;"));
        assert!(!ql.contains("cuisine"));
    }

    #[test]
    fn test_keyword_adds_cuisine_and_diet_clauses() {
        let ql = query(&["restaurant"], Some("Vegan")).to_ql();
        assert!(ql.contains(r#"node["cuisine"~"vegan",i]"#));
        assert!(ql.contains(r#"way["cuisine"~"vegan",i]"#));
        assert!(ql.contains(r#"node["diet:vegan"="yes"]"#));
        assert!(ql.contains(r#"way["diet:vegan"="yes"]"#));

        let ql = query(&["restaurant"], Some("thai")).to_ql();
        assert!(ql.contains(r#"node["cuisine"~"thai",i]"#));
        assert!(!ql.contains("diet:"));
    }

    #[test]
    fn test_keyword_quotes_are_escaped() {
        let ql = query(&["restaurant"], Some(r#"a"b"#)).to_ql();
        assert!(ql.contains(r#"["cuisine"~"a\"b",i]"#));
    }

    #[test]
    fn test_parse_elements() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 52.5, "lon": 13.4,
                 "tags": {"amenity": "cafe", "name": "Kaffee"}},
                {"type": "way", "id": 2, "center": {"lat": 52.6, "lon": 13.5},
                 "tags": {"amenity": "restaurant"}},
                {"type": "way", "id": 3}
            ]
        }"#;

        let elements = parse_overpass_response(body).unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].coordinates(), Some((52.5, 13.4)));
        assert_eq!(elements[0].tag("name"), "Kaffee");
        assert_eq!(elements[1].coordinates(), Some((52.6, 13.5)));
        assert_eq!(elements[1].tag("name"), "");
        assert_eq!(elements[2].coordinates(), None);
    }

    #[test]
    fn test_parse_rejects_html() {
        assert!(matches!(
            parse_overpass_response("<html>rate limited</html>"),
            Err(OverpassError::Decode(_))
        ));
    }
}
