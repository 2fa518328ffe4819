//! In-memory result cache keyed by approximate location.
//!
//! A lookup hits when an unexpired entry was stored within `radius` of the
//! requested point. Expired entries stay in place until the background sweep
//! removes them, but are never returned.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::models::{SearchStats, VenueRecord};
use crate::scoring::distance_km;

#[derive(Debug, Clone)]
struct CacheEntry {
    latitude: f64,
    longitude: f64,
    restaurants: Vec<VenueRecord>,
    stats: SearchStats,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
}

struct Sweeper {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct ProximityCache {
    entries: RwLock<Vec<CacheEntry>>,
    ttl: Duration,
    radius_km: f64,
    sweep_interval: Duration,
    sweeper: Mutex<Option<Sweeper>>,
}

impl ProximityCache {
    #[must_use]
    pub fn new(ttl: Duration, radius_meters: f64, sweep_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            ttl,
            radius_km: radius_meters / 1000.0,
            sweep_interval,
            sweeper: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            Duration::from_secs(config.ttl_hours * 3600),
            config.radius_meters,
            Duration::from_secs(config.sweep_interval_minutes * 60),
        )
    }

    /// Returns a copy of the first live entry within the match radius.
    pub async fn get(&self, latitude: f64, longitude: f64) -> Option<(Vec<VenueRecord>, SearchStats)> {
        let now = Instant::now();
        let entries = self.entries.read().await;

        let entry = entries.iter().find(|e| {
            !e.is_expired(now)
                && distance_km(latitude, longitude, e.latitude, e.longitude) <= self.radius_km
        })?;

        debug!(
            latitude,
            longitude,
            results = entry.restaurants.len(),
            "Proximity cache hit"
        );

        let mut stats = entry.stats;
        stats.cached_result = true;
        Some((entry.restaurants.clone(), stats))
    }

    /// Stores results for a point, replacing the first entry within radius
    /// (live or expired) or appending a new one.
    pub async fn set(
        &self,
        latitude: f64,
        longitude: f64,
        restaurants: Vec<VenueRecord>,
        stats: SearchStats,
    ) {
        let entry = CacheEntry {
            latitude,
            longitude,
            restaurants,
            stats,
            expires_at: Instant::now() + self.ttl,
        };

        let mut entries = self.entries.write().await;
        match entries
            .iter_mut()
            .find(|e| distance_km(latitude, longitude, e.latitude, e.longitude) <= self.radius_km)
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }

        debug!(latitude, longitude, entries = entries.len(), "Proximity cache updated");
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| !e.is_expired(now));
        let removed = before - entries.len();

        if removed > 0 {
            info!(removed, remaining = entries.len(), "Swept expired cache entries");
        }
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let expired = entries.iter().filter(|e| e.is_expired(now)).count();

        CacheStats {
            total_entries: entries.len(),
            active_entries: entries.len() - expired,
            expired_entries: expired,
        }
    }

    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        info!(removed, "Proximity cache cleared");
        removed
    }

    /// Starts the periodic sweep. Calling it again while a sweeper is running
    /// does nothing.
    pub fn start(self: &Arc<Self>) {
        let Ok(mut slot) = self.sweeper.lock() else {
            warn!("Cache sweeper lock poisoned, sweep not started");
            return;
        };
        if slot.is_some() {
            return;
        }

        let (stop, mut stopped) = watch::channel(false);
        let cache: Weak<Self> = Arc::downgrade(self);
        let period = self.sweep_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(cache) = cache.upgrade() else { break };
                        cache.sweep().await;
                    }
                    _ = stopped.changed() => break,
                }
            }
            debug!("Cache sweeper stopped");
        });

        info!(interval_secs = period.as_secs(), "Cache sweeper started");
        *slot = Some(Sweeper { stop, handle });
    }

    /// Stops the sweeper and waits for it to finish.
    pub async fn shutdown(&self) {
        let sweeper = match self.sweeper.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };

        if let Some(Sweeper { stop, handle }) = sweeper {
            let _ = stop.send(true);
            if let Err(e) = handle.await {
                warn!(error = %e, "Cache sweeper task failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(name: &str) -> VenueRecord {
        VenueRecord {
            name: name.to_string(),
            rating: 4.0,
            review_count: 10,
            price_level: None,
            category: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            address: String::new(),
            distance_km: 0.0,
            photo_reference: String::new(),
            external_id: String::new(),
        }
    }

    fn cache() -> ProximityCache {
        ProximityCache::new(Duration::from_secs(48 * 3600), 20.0, Duration::from_secs(600))
    }

    #[tokio::test]
    async fn test_hit_within_radius() {
        let cache = cache();
        cache.set(40.7128, -74.0060, vec![venue("A")], SearchStats::default()).await;

        // ~11 m north
        let (records, stats) = cache.get(40.7129, -74.0060).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(stats.cached_result);

        // ~111 m north
        assert!(cache.get(40.7138, -74.0060).await.is_none());
    }

    #[tokio::test]
    async fn test_round_trip_marks_only_cached_flag() {
        let cache = cache();
        let mut second = venue("B");
        second.price_level = Some(3);
        second.photo_reference = "GENERIC".to_string();
        let records = vec![venue("A"), second];
        let stats = SearchStats {
            google_pages_searched: 4,
            google_search_queries: 2,
            google_results_raw: 31,
            google_results_filtered: 27,
            osm_results_total: 6,
            total_before_dedup: 33,
            total_after_dedup: 29,
            cached_result: false,
        };

        cache.set(12.5, -3.25, records.clone(), stats).await;
        let (got_records, got_stats) = cache.get(12.5, -3.25).await.unwrap();

        assert_eq!(got_records, records);
        assert_eq!(
            got_stats,
            SearchStats {
                cached_result: true,
                ..stats
            }
        );
    }

    #[tokio::test]
    async fn test_set_overwrites_entry_in_radius() {
        let cache = cache();
        cache.set(1.0, 1.0, vec![venue("old")], SearchStats::default()).await;
        cache.set(1.0001, 1.0, vec![venue("new")], SearchStats::default()).await;

        assert_eq!(cache.stats().await.total_entries, 1);
        let (records, _) = cache.get(1.0, 1.0).await.unwrap();
        assert_eq!(records[0].name, "new");
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_a_miss_until_swept() {
        let cache = cache();
        cache.set(1.0, 1.0, vec![venue("A")], SearchStats::default()).await;

        tokio::time::advance(Duration::from_secs(47 * 3600)).await;
        assert!(cache.get(1.0, 1.0).await.is_some());

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(cache.get(1.0, 1.0).await.is_none());

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 1);

        assert_eq!(cache.sweep().await, 1);
        assert_eq!(cache.stats().await, CacheStats::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_and_shutdown() {
        let cache = Arc::new(ProximityCache::new(
            Duration::from_secs(60),
            20.0,
            Duration::from_secs(600),
        ));
        cache.start();
        cache.set(1.0, 1.0, vec![venue("A")], SearchStats::default()).await;

        tokio::time::sleep(Duration::from_secs(601)).await;
        assert_eq!(cache.stats().await.total_entries, 0);

        cache.shutdown().await;
        assert!(cache.sweeper.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = cache();
        cache.set(1.0, 1.0, vec![venue("A")], SearchStats::default()).await;
        cache.set(2.0, 2.0, vec![venue("B")], SearchStats::default()).await;
        assert_eq!(cache.clear().await, 2);
        assert!(cache.get(1.0, 1.0).await.is_none());
    }
}
