use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, warn};

use crate::clients::google_places::{
    NearbySearchRequest, PlaceResult, PlacesApi, PlacesError, PlacesPage, TextSearchRequest,
};
use crate::config::GoogleConfig;
use crate::constants::google::{
    MIN_RATING_FOR_PHOTO, MIN_REVIEWS_FOR_PHOTO, RESTAURANT_TEXT_QUERIES,
};
use crate::constants::search::{
    CUISINE_KEYWORDS, FOOD_TYPE_FRAGMENTS, FOOD_TYPE_WHITELIST, KEYWORD_ALIASES,
};
use crate::models::{
    ALL_FOOD_CATEGORIES, FoodCategory, GENERIC_PHOTO_REFERENCE, SearchOutcome, SearchQuery,
    SearchStats, VenueRecord,
};
use crate::scoring::{deduplicate, distance_km, format_type_label, rank};

use super::provider::{ProviderError, ProviderResult, VenueProvider};

/// Keeps a place when any of its types looks like food. Places without
/// types are kept.
#[must_use]
pub fn is_food_related(types: &[String]) -> bool {
    if types.is_empty() {
        return true;
    }

    types.iter().any(|t| {
        let lower = t.to_lowercase();
        FOOD_TYPE_WHITELIST.contains(&lower.as_str())
            || FOOD_TYPE_FRAGMENTS.iter().any(|f| lower.contains(f))
    })
}

/// Whether a venue should be shown with the generic placeholder instead of
/// fetching its photo.
#[must_use]
pub fn should_use_generic_photo(photo_reference: &str, rating: f64, review_count: u32) -> bool {
    photo_reference.is_empty()
        || photo_reference == GENERIC_PHOTO_REFERENCE
        || (rating > 0.0 && rating < MIN_RATING_FOR_PHOTO)
        || review_count < MIN_REVIEWS_FOR_PHOTO
}

/// Expands well-known cuisine and diet keywords into richer search terms.
#[must_use]
pub fn resolve_keyword(keyword: &str) -> String {
    let lower = keyword.trim().to_lowercase();
    KEYWORD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map_or_else(|| keyword.trim().to_string(), |(_, expanded)| (*expanded).to_string())
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone)]
pub struct GoogleSearchSettings {
    pub radius_meters: u32,
    pub language: String,
    pub page_delay: Duration,
    pub max_pages: u32,
    pub call_timeout: Duration,
}

impl From<&GoogleConfig> for GoogleSearchSettings {
    fn from(config: &GoogleConfig) -> Self {
        Self {
            radius_meters: config.radius_meters,
            language: config.language.clone(),
            page_delay: Duration::from_millis(config.page_delay_ms),
            max_pages: config.max_pages.max(1),
            call_timeout: Duration::from_secs(config.paginated_timeout_seconds),
        }
    }
}

#[derive(Debug, Clone)]
enum PlacesCall {
    Nearby(NearbySearchRequest),
    Text(TextSearchRequest),
}

/// One fan-out call tagged with where its results came from.
#[derive(Debug, Clone)]
struct SourcedCall {
    source: String,
    supplementary: bool,
    call: PlacesCall,
}

pub struct GoogleProvider {
    api: Arc<dyn PlacesApi>,
    settings: GoogleSearchSettings,
}

impl GoogleProvider {
    #[must_use]
    pub fn new(api: Arc<dyn PlacesApi>, settings: GoogleSearchSettings) -> Self {
        Self { api, settings }
    }

    fn nearby(&self, query: &SearchQuery, place_type: &str, keyword: Option<&str>) -> PlacesCall {
        PlacesCall::Nearby(NearbySearchRequest {
            latitude: query.latitude,
            longitude: query.longitude,
            radius_meters: self.settings.radius_meters,
            place_type: place_type.to_string(),
            keyword: keyword.map(ToString::to_string),
            language: self.settings.language.clone(),
        })
    }

    fn text(&self, query: &SearchQuery, text: String) -> PlacesCall {
        PlacesCall::Text(TextSearchRequest {
            query: text,
            latitude: query.latitude,
            longitude: query.longitude,
            radius_meters: self.settings.radius_meters,
            language: self.settings.language.clone(),
        })
    }

    async fn fetch_page(
        &self,
        call: &PlacesCall,
        page_token: Option<&str>,
        deadline: Instant,
    ) -> Result<PlacesPage, PlacesError> {
        let request = async {
            match call {
                PlacesCall::Nearby(r) => self.api.nearby_search(r, page_token).await,
                PlacesCall::Text(r) => self.api.text_search(r, page_token).await,
            }
        };

        timeout_at(deadline, request)
            .await
            .map_err(|_| PlacesError::Timeout)?
    }

    /// Runs one search across up to `max_pages` pages.
    ///
    /// A failure on the first page fails the call. Later failures stop
    /// pagination and keep what was gathered.
    async fn run_call(
        &self,
        call: &PlacesCall,
        query: &SearchQuery,
    ) -> Result<ProviderResult, PlacesError> {
        let deadline = query.deadline_within(self.settings.call_timeout);
        let text_search = matches!(call, PlacesCall::Text(_));

        let mut venues = Vec::new();
        let mut stats = SearchStats::default();
        let mut page_token: Option<String> = None;
        let mut page = 0;
        let mut retried = false;

        while page < self.settings.max_pages {
            if page > 0 {
                sleep(self.settings.page_delay).await;
            }

            let result = match self.fetch_page(call, page_token.as_deref(), deadline).await {
                Ok(result) => result,
                Err(PlacesError::NotReady) if page > 0 && !retried => {
                    debug!(page, "Page token not ready, retrying");
                    retried = true;
                    sleep(self.settings.page_delay).await;
                    continue;
                }
                Err(e) if page == 0 => return Err(e),
                Err(e) => {
                    warn!(page, error = %e, "Pagination stopped early");
                    break;
                }
            };

            stats.google_pages_searched += 1;
            stats.google_results_raw += count(result.results.len());

            debug!(page, results = result.results.len(), "Places page received");

            venues.extend(
                result
                    .results
                    .into_iter()
                    .filter_map(|place| to_venue(place, query, text_search)),
            );

            match result.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
            page += 1;
            retried = false;
        }

        stats.google_results_filtered = count(venues.len());
        rank(&mut venues);

        Ok(SearchOutcome::new(venues, stats))
    }

    fn plan_fan_out(
        &self,
        query: &SearchQuery,
        categories: &[FoodCategory],
        keyword: Option<&str>,
    ) -> Vec<SourcedCall> {
        let mut calls: Vec<SourcedCall> = categories
            .iter()
            .map(|c| SourcedCall {
                source: c.as_str().to_string(),
                supplementary: false,
                call: self.nearby(query, c.google_type(), keyword),
            })
            .collect();

        if !categories.contains(&FoodCategory::Restaurant) {
            return calls;
        }

        let restaurant = FoodCategory::Restaurant.google_type();
        match keyword {
            None => {
                calls.extend(CUISINE_KEYWORDS.iter().map(|kw| SourcedCall {
                    source: format!("cuisine:{kw}"),
                    supplementary: true,
                    call: self.nearby(query, restaurant, Some(kw)),
                }));
                calls.extend(RESTAURANT_TEXT_QUERIES.iter().map(|q| SourcedCall {
                    source: format!("text:{q}"),
                    supplementary: true,
                    call: self.text(query, (*q).to_string()),
                }));
            }
            Some(kw) => {
                calls.extend(["restaurant", "food"].iter().map(|suffix| {
                    let text = format!("{kw} {suffix}");
                    SourcedCall {
                        source: format!("text:{text}"),
                        supplementary: true,
                        call: self.text(query, text),
                    }
                }));
            }
        }

        calls
    }

    async fn fan_out(
        &self,
        query: &SearchQuery,
        categories: &[FoodCategory],
        keyword: Option<&str>,
    ) -> Result<ProviderResult, ProviderError> {
        let calls = self.plan_fan_out(query, categories, keyword);
        info!(calls = calls.len(), "Starting Google fan-out");

        let results = join_all(calls.iter().map(|c| self.run_call(&c.call, query))).await;

        let mut stats = SearchStats {
            google_search_queries: count(calls.len()),
            ..SearchStats::default()
        };
        let mut venues = Vec::new();
        let mut failures = Vec::new();
        let mut primary_failed = false;

        for (call, result) in calls.iter().zip(results) {
            match result {
                Ok(outcome) => {
                    debug!(source = %call.source, results = outcome.restaurants.len(), "Fan-out call finished");
                    stats.absorb(&outcome.stats);
                    venues.extend(outcome.restaurants);
                }
                Err(e) => {
                    if call.supplementary {
                        warn!(source = %call.source, error = %e, "Supplementary search failed");
                    } else {
                        warn!(source = %call.source, error = %e, "Category search failed");
                        primary_failed = true;
                    }
                    failures.push(format!("{}: {e}", call.source));
                }
            }
        }

        if venues.is_empty() && primary_failed {
            return Err(ProviderError::AllFailed { failures });
        }

        stats.total_before_dedup = count(venues.len());
        let mut venues = deduplicate(venues);
        stats.total_after_dedup = count(venues.len());
        rank(&mut venues);

        info!(
            before = stats.total_before_dedup,
            after = stats.total_after_dedup,
            failed = failures.len(),
            "Google fan-out complete"
        );

        Ok(SearchOutcome::new(venues, stats))
    }
}

fn to_venue(place: PlaceResult, query: &SearchQuery, text_search: bool) -> Option<VenueRecord> {
    if !is_food_related(&place.types) {
        debug!(name = %place.name, types = ?place.types, "Skipping non-food place");
        return None;
    }

    let rating = place.rating.unwrap_or(0.0);
    let review_count = place.user_ratings_total.unwrap_or(0);
    let location = place.geometry.location;

    let photo_reference = if should_use_generic_photo(place.first_photo_reference(), rating, review_count) {
        GENERIC_PHOTO_REFERENCE.to_string()
    } else {
        place.first_photo_reference().to_string()
    };

    let address = if text_search {
        place.formatted_address.or(place.vicinity)
    } else {
        place.vicinity.or(place.formatted_address)
    };

    Some(VenueRecord {
        category: place
            .types
            .first()
            .map(|t| format_type_label(t))
            .unwrap_or_default(),
        distance_km: distance_km(query.latitude, query.longitude, location.lat, location.lng),
        name: place.name,
        rating,
        review_count,
        price_level: place.price_level,
        latitude: location.lat,
        longitude: location.lng,
        address: address.unwrap_or_default(),
        photo_reference,
        external_id: place.place_id,
    })
}

#[async_trait]
impl VenueProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn search(&self, query: &SearchQuery) -> Result<ProviderResult, ProviderError> {
        let keyword = query.keyword().map(resolve_keyword);
        let categories = if query.is_all_categories() {
            ALL_FOOD_CATEGORIES.to_vec()
        } else {
            query.categories.clone()
        };

        if let ([category], None) = (categories.as_slice(), keyword.as_deref()) {
            let call = self.nearby(query, category.google_type(), None);
            let mut outcome = self.run_call(&call, query).await?;
            outcome.stats.google_search_queries = 1;
            outcome.stats.total_before_dedup = count(outcome.restaurants.len());
            outcome.stats.total_after_dedup = outcome.stats.total_before_dedup;
            return Ok(outcome);
        }

        self.fan_out(query, &categories, keyword.as_deref()).await
    }
}
