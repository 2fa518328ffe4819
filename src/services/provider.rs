//! Common contract for the external venue sources.

use async_trait::async_trait;
use thiserror::Error;

use crate::clients::{OverpassError, PlacesError};
use crate::models::{SearchOutcome, SearchQuery};

/// Records and per-call counters produced by one provider search.
pub type ProviderResult = SearchOutcome;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Google Places search failed: {0}")]
    Google(#[from] PlacesError),

    #[error("OpenStreetMap search failed: {0}")]
    Osm(#[from] OverpassError),

    #[error("{0} provider is not configured")]
    NotConfigured(&'static str),

    /// Every primary call failed and nothing else produced results.
    #[error("all searches failed: {}", .failures.join("; "))]
    AllFailed { failures: Vec<String> },
}

impl ProviderError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Google(PlacesError::Timeout) | Self::Osm(OverpassError::Timeout)
        )
    }
}

/// A source of food venues around a point.
///
/// Implementations issue their own network calls, map the provider's
/// response into [`crate::models::VenueRecord`]s and report per-call
/// counters in the returned stats.
#[async_trait]
pub trait VenueProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns [`ProviderError`] when the provider produced no usable result.
    async fn search(&self, query: &SearchQuery) -> Result<ProviderResult, ProviderError>;
}
