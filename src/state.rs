use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::clients::{GooglePlacesClient, OverpassApi, OverpassClient, PlacesApi};
use crate::config::Config;
use crate::services::{
    GoogleProvider, GoogleSearchSettings, OsmProvider, ProximityCache, SearchAggregator,
    SearchService, VenueProvider,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("nearby-eats/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub cache: Arc<ProximityCache>,

    pub search_service: Arc<SearchService>,
}

impl SharedState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.google.paginated_timeout_seconds)?;

        let places: Option<Arc<dyn PlacesApi>> = config.google.is_configured().then(|| {
            Arc::new(GooglePlacesClient::with_shared_client(
                http_client.clone(),
                &config.google,
            )) as Arc<dyn PlacesApi>
        });
        let overpass: Arc<dyn OverpassApi> = Arc::new(OverpassClient::with_shared_client(
            http_client,
            &config.overpass,
        ));

        Ok(Self::with_clients(config, places, overpass))
    }

    /// Wires the search stack around the given API clients. `places` is
    /// `None` when Google is not configured.
    #[must_use]
    pub fn with_clients(
        config: Config,
        places: Option<Arc<dyn PlacesApi>>,
        overpass: Arc<dyn OverpassApi>,
    ) -> Self {
        let google = places.map(|api| {
            Arc::new(GoogleProvider::new(
                api,
                GoogleSearchSettings::from(&config.google),
            )) as Arc<dyn VenueProvider>
        });
        let osm: Arc<dyn VenueProvider> = Arc::new(OsmProvider::new(overpass, &config.overpass));

        let aggregator = SearchAggregator::new(
            config.search.provider,
            google,
            osm,
            Duration::from_secs(config.search.request_deadline_seconds),
        );

        let cache = Arc::new(ProximityCache::from_config(&config.cache));
        let search_service = Arc::new(SearchService::new(aggregator, cache.clone()));

        info!(
            provider = %config.search.provider,
            google_configured = config.google.is_configured(),
            "Search stack initialized"
        );

        Self {
            config: Arc::new(config),
            cache,
            search_service,
        }
    }
}
