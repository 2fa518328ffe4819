pub mod provider;
pub use provider::{ProviderError, ProviderResult, VenueProvider};

pub mod google_provider;
pub use google_provider::{GoogleProvider, GoogleSearchSettings};

pub mod osm_provider;
pub use osm_provider::OsmProvider;

pub mod aggregator;
pub use aggregator::{SearchAggregator, SearchError};

pub mod proximity_cache;
pub use proximity_cache::{CacheStats, ProximityCache};

pub mod search;
pub use search::SearchService;
