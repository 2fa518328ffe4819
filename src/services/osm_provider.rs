use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout_at;
use tracing::{debug, info};

use crate::clients::overpass::{OverpassApi, OverpassElement, OverpassError, OverpassQuery};
use crate::config::OverpassConfig;
use crate::models::{FoodCategory, SearchOutcome, SearchQuery, SearchStats, VenueRecord};
use crate::scoring::{distance_km, format_type_label, rank};

use super::provider::{ProviderError, ProviderResult, VenueProvider};

/// Distinct amenity tags for the requested categories, in first-seen order.
#[must_use]
pub fn amenities_for(categories: &[FoodCategory]) -> Vec<String> {
    let categories = if categories.is_empty() {
        &[FoodCategory::All][..]
    } else {
        categories
    };

    let mut amenities: Vec<String> = Vec::new();
    for amenity in categories.iter().flat_map(|c| c.osm_amenities()) {
        if !amenities.iter().any(|a| a == amenity) {
            amenities.push((*amenity).to_string());
        }
    }
    amenities
}

fn matches_keyword(element: &OverpassElement, keyword: &str) -> bool {
    element.tag("name").to_lowercase().contains(keyword)
        || element.tag("cuisine").to_lowercase().contains(keyword)
        || element.tag(&format!("diet:{keyword}")) == "yes"
}

/// Community ratings are free-form tags; anything outside 0-5 counts as unrated.
fn parse_rating(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && (0.0..=5.0).contains(r))
        .unwrap_or(0.0)
}

fn to_venue(element: &OverpassElement, query: &SearchQuery) -> Option<VenueRecord> {
    let Some((latitude, longitude)) = element.coordinates() else {
        debug!(id = element.id, "Skipping element without coordinates");
        return None;
    };

    let amenity = element.tag("amenity");
    let name = match element.tag("name") {
        "" => amenity,
        name => name,
    };

    let category = match element.tag("cuisine") {
        "" => format_type_label(amenity),
        cuisine => format_type_label(cuisine),
    };

    let address = [element.tag("addr:street"), element.tag("addr:housenumber")]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(VenueRecord {
        name: name.to_string(),
        rating: parse_rating(element.tag("rating")),
        review_count: 0,
        price_level: None,
        category,
        latitude,
        longitude,
        address,
        distance_km: distance_km(query.latitude, query.longitude, latitude, longitude),
        photo_reference: String::new(),
        external_id: String::new(),
    })
}

pub struct OsmProvider {
    api: Arc<dyn OverpassApi>,
    radius_meters: u32,
    query_timeout_seconds: u32,
    call_timeout: Duration,
}

impl OsmProvider {
    #[must_use]
    pub fn new(api: Arc<dyn OverpassApi>, config: &OverpassConfig) -> Self {
        Self {
            api,
            radius_meters: config.radius_meters,
            query_timeout_seconds: config.query_timeout_seconds,
            call_timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }

    #[must_use]
    pub fn build_query(&self, query: &SearchQuery) -> OverpassQuery {
        OverpassQuery {
            latitude: query.latitude,
            longitude: query.longitude,
            radius_meters: self.radius_meters,
            amenities: amenities_for(&query.categories),
            keyword: query.keyword().map(ToString::to_string),
            timeout_seconds: self.query_timeout_seconds,
        }
    }
}

#[async_trait]
impl VenueProvider for OsmProvider {
    fn name(&self) -> &'static str {
        "osm"
    }

    async fn search(&self, query: &SearchQuery) -> Result<ProviderResult, ProviderError> {
        let overpass_query = self.build_query(query);
        let deadline = query.deadline_within(self.call_timeout);

        let elements = timeout_at(deadline, self.api.query(&overpass_query))
            .await
            .map_err(|_| OverpassError::Timeout)??;

        let keyword = query.keyword().map(str::to_lowercase);
        let mut venues: Vec<VenueRecord> = elements
            .iter()
            .filter(|e| keyword.as_deref().is_none_or(|kw| matches_keyword(e, kw)))
            .filter_map(|e| to_venue(e, query))
            .collect();
        rank(&mut venues);

        let total = u32::try_from(venues.len()).unwrap_or(u32::MAX);
        let stats = SearchStats {
            osm_results_total: u32::try_from(elements.len()).unwrap_or(u32::MAX),
            total_before_dedup: total,
            total_after_dedup: total,
            ..SearchStats::default()
        };

        info!(elements = elements.len(), results = venues.len(), "OpenStreetMap search complete");
        Ok(SearchOutcome::new(venues, stats))
    }
}
