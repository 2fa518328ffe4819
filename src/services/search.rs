use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{SearchOutcome, SearchQuery};

use super::aggregator::{SearchAggregator, SearchError};
use super::proximity_cache::ProximityCache;

/// Cache-first entry point for venue searches.
///
/// Only unfiltered-by-keyword searches read or populate the cache, because
/// entries are keyed by location alone.
pub struct SearchService {
    aggregator: SearchAggregator,
    cache: Arc<ProximityCache>,
}

impl SearchService {
    #[must_use]
    pub const fn new(aggregator: SearchAggregator, cache: Arc<ProximityCache>) -> Self {
        Self { aggregator, cache }
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<ProximityCache> {
        &self.cache
    }

    #[must_use]
    pub const fn aggregator(&self) -> &SearchAggregator {
        &self.aggregator
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
        let cacheable = query.keyword().is_none();

        if cacheable {
            if let Some((restaurants, stats)) = self.cache.get(query.latitude, query.longitude).await {
                metrics::counter!("search_cache_hits_total").increment(1);
                info!(results = restaurants.len(), "Serving search from cache");
                return Ok(SearchOutcome::new(restaurants, stats));
            }
            metrics::counter!("search_cache_misses_total").increment(1);
        }

        let outcome = self.aggregator.aggregate(query).await.inspect_err(|e| {
            metrics::counter!("search_failures_total").increment(1);
            debug!(error = %e, "Search failed");
        })?;

        if cacheable {
            self.cache
                .set(
                    query.latitude,
                    query.longitude,
                    outcome.restaurants.clone(),
                    outcome.stats,
                )
                .await;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProviderMode, SearchStats, VenueRecord};
    use crate::services::provider::{ProviderError, ProviderResult, VenueProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VenueProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "osm"
        }

        async fn search(&self, query: &SearchQuery) -> Result<ProviderResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let venue = VenueRecord {
                name: "Kiosk".to_string(),
                rating: 0.0,
                review_count: 0,
                price_level: None,
                category: String::new(),
                latitude: query.latitude,
                longitude: query.longitude,
                address: String::new(),
                distance_km: 0.0,
                photo_reference: String::new(),
                external_id: String::new(),
            };
            Ok(SearchOutcome::new(vec![venue], SearchStats::default()))
        }
    }

    fn service() -> (SearchService, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let aggregator = SearchAggregator::new(
            ProviderMode::Osm,
            None,
            provider.clone(),
            Duration::from_secs(60),
        );
        let cache = Arc::new(ProximityCache::new(
            Duration::from_secs(3600),
            20.0,
            Duration::from_secs(600),
        ));
        (SearchService::new(aggregator, cache), provider)
    }

    #[tokio::test]
    async fn test_second_nearby_search_hits_cache() {
        let (service, provider) = service();

        let first = service.search(&SearchQuery::at(40.7128, -74.0060)).await.unwrap();
        assert!(!first.stats.cached_result);

        let second = service.search(&SearchQuery::at(40.7129, -74.0060)).await.unwrap();
        assert!(second.stats.cached_result);
        assert_eq!(second.restaurants, first.restaurants);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keyword_search_bypasses_cache() {
        let (service, provider) = service();
        let query = SearchQuery::at(1.0, 1.0).with_keyword("vegan");

        service.search(&query).await.unwrap();
        service.search(&query).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.cache().stats().await.total_entries, 0);
    }
}
