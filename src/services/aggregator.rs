use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, timeout_at};
use tracing::{info, warn};

use crate::constants::search::{GOOGLE_NAME_PREFIX, OSM_NAME_PREFIX};
use crate::models::{ProviderMode, SearchOutcome, SearchQuery, SearchStats, VenueRecord};
use crate::scoring::{deduplicate, rank};

use super::provider::{ProviderError, ProviderResult, VenueProvider};

/// Extra time granted past the query deadline before the search is abandoned
/// outright. Provider calls observe the deadline themselves.
const DEADLINE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("all providers failed: {}", .failures.join("; "))]
    AllProvidersFailed { failures: Vec<String> },

    #[error("search did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Runs the providers selected by `mode` and merges their results.
pub struct SearchAggregator {
    mode: ProviderMode,
    google: Option<Arc<dyn VenueProvider>>,
    osm: Arc<dyn VenueProvider>,
    deadline: Duration,
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn tag_names(records: &mut [VenueRecord], prefix: &str) {
    for record in records {
        record.name.insert_str(0, prefix);
    }
}

impl SearchAggregator {
    /// `google` is `None` when no API key is configured.
    #[must_use]
    pub fn new(
        mode: ProviderMode,
        google: Option<Arc<dyn VenueProvider>>,
        osm: Arc<dyn VenueProvider>,
        deadline: Duration,
    ) -> Self {
        Self {
            mode,
            google,
            osm,
            deadline,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> ProviderMode {
        self.mode
    }

    /// Searches every provider of the configured mode within the request
    /// deadline.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Provider`] when the single selected provider fails
    /// - [`SearchError::AllProvidersFailed`] when both providers fail
    /// - [`SearchError::DeadlineExceeded`] when the search overruns its deadline
    pub async fn aggregate(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
        let deadline = query.deadline_within(self.deadline);
        let query = query.clone().with_deadline(deadline);
        let started = Instant::now();

        let outcome = timeout_at(deadline + DEADLINE_GRACE, self.run(&query))
            .await
            .map_err(|_| SearchError::DeadlineExceeded(self.deadline))??;

        info!(
            mode = %self.mode,
            results = outcome.restaurants.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Search aggregated"
        );
        metrics::histogram!("search_aggregation_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        Ok(outcome)
    }

    async fn run(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
        match self.mode {
            ProviderMode::Google => {
                let google = self
                    .google
                    .as_ref()
                    .ok_or(ProviderError::NotConfigured("google"))?;
                let result = google.search(query).await?;
                Ok(Self::single(result))
            }
            ProviderMode::Osm => {
                let result = self.osm.search(query).await?;
                Ok(Self::single(result))
            }
            ProviderMode::Both => self.run_both(query).await,
        }
    }

    async fn run_both(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
        let google = async {
            match &self.google {
                Some(provider) => provider.search(query).await,
                None => Ok(ProviderResult::default()),
            }
        };
        let (google, osm) = tokio::join!(google, self.osm.search(query));

        let mut failures = Vec::new();
        let mut results = Vec::with_capacity(2);

        match google {
            Ok(mut result) => {
                tag_names(&mut result.restaurants, GOOGLE_NAME_PREFIX);
                results.push(result);
            }
            Err(e) => {
                warn!(provider = "google", error = %e, "Provider failed");
                failures.push(format!("google: {e}"));
            }
        }

        match osm {
            Ok(mut result) => {
                tag_names(&mut result.restaurants, OSM_NAME_PREFIX);
                results.push(result);
            }
            Err(e) => {
                warn!(provider = "osm", error = %e, "Provider failed");
                failures.push(format!("osm: {e}"));
            }
        }

        if results.is_empty() {
            return Err(SearchError::AllProvidersFailed { failures });
        }

        Ok(Self::merge(results))
    }

    /// A lone provider may already have deduplicated its own fan-out; its
    /// pre-dedup count is kept.
    fn single(result: ProviderResult) -> SearchOutcome {
        let provider_before = result.stats.total_before_dedup;
        let mut outcome = Self::merge(vec![result]);
        outcome.stats.total_before_dedup = outcome.stats.total_before_dedup.max(provider_before);
        outcome
    }

    /// Concatenates provider results in order, then dedups and ranks.
    fn merge(results: Vec<ProviderResult>) -> SearchOutcome {
        let mut stats = SearchStats::default();
        let mut combined = Vec::new();

        for result in results {
            stats.absorb(&result.stats);
            combined.extend(result.restaurants);
        }

        stats.total_before_dedup = count(combined.len());
        let mut restaurants = deduplicate(combined);
        stats.total_after_dedup = count(restaurants.len());
        rank(&mut restaurants);

        SearchOutcome::new(restaurants, stats)
    }
}
