use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::category::FoodCategory;

/// Marker stored in `photo_reference` when a venue should be rendered with the
/// generic placeholder instead of a paid photo fetch.
pub const GENERIC_PHOTO_REFERENCE: &str = "GENERIC";

/// A single food venue, normalized across providers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VenueRecord {
    pub name: String,

    /// Provider rating on a 1.0-5.0 scale, 0.0 when unknown.
    pub rating: f64,

    #[serde(default)]
    pub review_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,

    #[serde(default, rename = "type")]
    pub category: String,

    pub latitude: f64,

    pub longitude: f64,

    #[serde(default)]
    pub address: String,

    /// Great-circle distance from the query point in kilometers.
    pub distance_km: f64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub photo_reference: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_id: String,
}

impl VenueRecord {
    #[must_use]
    pub fn uses_generic_photo(&self) -> bool {
        self.photo_reference.is_empty() || self.photo_reference == GENERIC_PHOTO_REFERENCE
    }

    #[must_use]
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={:.6},{:.6}",
            self.latitude, self.longitude
        )
    }
}

/// Counters describing how a result set was produced.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub google_pages_searched: u32,

    pub google_search_queries: u32,

    pub google_results_raw: u32,

    pub google_results_filtered: u32,

    pub osm_results_total: u32,

    pub total_before_dedup: u32,

    pub total_after_dedup: u32,

    pub cached_result: bool,
}

impl SearchStats {
    /// Adds the per-call provider counters of `other` into `self`.
    ///
    /// Dedup totals and the cache flag are owned by whoever merges the
    /// records, so they are left untouched.
    pub fn absorb(&mut self, other: &Self) {
        self.google_pages_searched += other.google_pages_searched;
        self.google_search_queries += other.google_search_queries;
        self.google_results_raw += other.google_results_raw;
        self.google_results_filtered += other.google_results_filtered;
        self.osm_results_total += other.osm_results_total;
    }
}

/// A caller's request for venues around a point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub latitude: f64,

    pub longitude: f64,

    /// Empty means every known category.
    pub categories: Vec<FoodCategory>,

    pub keyword: Option<String>,

    /// Provider calls still running at this instant are abandoned.
    pub deadline: Option<Instant>,
}

impl SearchQuery {
    #[must_use]
    pub const fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            categories: Vec::new(),
            keyword: None,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The earlier of the query deadline and `now + budget`.
    #[must_use]
    pub fn deadline_within(&self, budget: std::time::Duration) -> Instant {
        let local = Instant::now() + budget;
        self.deadline.map_or(local, |d| d.min(local))
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Vec<FoodCategory>) -> Self {
        self.categories = categories
            .into_iter()
            .filter(|c| *c != FoodCategory::All)
            .collect();
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        let trimmed = keyword.trim();
        self.keyword = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    #[must_use]
    pub fn is_all_categories(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Records plus the statistics describing how they were produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchOutcome {
    pub restaurants: Vec<VenueRecord>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    #[must_use]
    pub const fn new(restaurants: Vec<VenueRecord>, stats: SearchStats) -> Self {
        Self { restaurants, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_is_trimmed_and_blank_dropped() {
        let query = SearchQuery::at(1.0, 2.0).with_keyword("  vegan ");
        assert_eq!(query.keyword(), Some("vegan"));

        let query = SearchQuery::at(1.0, 2.0).with_keyword("   ");
        assert_eq!(query.keyword(), None);
    }

    #[test]
    fn test_all_category_means_no_filter() {
        let query = SearchQuery::at(1.0, 2.0)
            .with_categories(vec![FoodCategory::All, FoodCategory::Cafe]);
        assert_eq!(query.categories, vec![FoodCategory::Cafe]);

        let query = SearchQuery::at(1.0, 2.0).with_categories(vec![FoodCategory::All]);
        assert!(query.is_all_categories());
    }

    #[test]
    fn test_stats_absorb_leaves_totals_alone() {
        let mut total = SearchStats {
            total_after_dedup: 3,
            ..SearchStats::default()
        };
        let call = SearchStats {
            google_pages_searched: 2,
            google_results_raw: 40,
            google_results_filtered: 38,
            total_after_dedup: 99,
            ..SearchStats::default()
        };

        total.absorb(&call);
        total.absorb(&call);

        assert_eq!(total.google_pages_searched, 4);
        assert_eq!(total.google_results_raw, 80);
        assert_eq!(total.google_results_filtered, 76);
        assert_eq!(total.total_after_dedup, 3);
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(SearchQuery::at(40.7128, -74.0060).has_valid_coordinates());
        assert!(!SearchQuery::at(91.0, 0.0).has_valid_coordinates());
        assert!(!SearchQuery::at(0.0, -180.5).has_valid_coordinates());
    }
}
