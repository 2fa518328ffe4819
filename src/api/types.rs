use serde::{Deserialize, Serialize};

use crate::models::{SearchStats, VenueRecord};
use crate::services::CacheStats;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Page numbers start at 1. Out-of-range pages are clamped to the last
    /// page; an empty result still has one (empty) page.
    #[must_use]
    pub fn new(requested_page: usize, limit: usize, total_items: usize) -> Self {
        let limit = limit.max(1);
        let total_pages = total_items.div_ceil(limit).max(1);
        let page = requested_page.clamp(1, total_pages);

        Self {
            page,
            limit,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }

    /// The slice of `items` belonging to this page.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = (start + self.limit).min(items.len());
        &items[start..end]
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedSearchResult {
    pub restaurants: Vec<VenueRecord>,
    pub stats: SearchStats,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub google_configured: bool,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub ttl_hours: u64,
    pub radius_meters: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(1, 20, 45);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_prev);

        let p = Pagination::new(3, 20, 45);
        assert_eq!(p.offset(), 40);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn test_pagination_clamps_page() {
        let p = Pagination::new(9, 20, 45);
        assert_eq!(p.page, 3);

        let p = Pagination::new(0, 20, 45);
        assert_eq!(p.page, 1);

        let p = Pagination::new(4, 20, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 1);
        assert!(!p.has_next && !p.has_prev);
    }

    #[test]
    fn test_pagination_slice() {
        let items: Vec<u32> = (0..45).collect();
        assert_eq!(Pagination::new(3, 20, 45).slice(&items), &items[40..45]);
        assert_eq!(Pagination::new(1, 20, 45).slice(&items).len(), 20);
        assert!(Pagination::new(1, 20, 0).slice(&[] as &[u32]).is_empty());
    }
}
