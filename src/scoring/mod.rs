pub mod distance;
pub mod rating;

pub use distance::{distance_km, format_distance};
pub use rating::{format_type_label, weighted_score};

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::VenueRecord;

/// Grid step used to snap coordinates before comparing venues (~50 m).
pub const DEDUP_GRID_DEGREES: f64 = 0.0005;

/// Provenance markers prepended to names when providers are merged.
pub const PROVIDER_MARKERS: &[&str] = &["[google] ", "[osm] "];

/// Normalized name used for duplicate detection.
#[must_use]
pub fn normalized_name(name: &str) -> String {
    let mut normalized = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    for marker in PROVIDER_MARKERS {
        if let Some(stripped) = normalized.strip_prefix(marker) {
            normalized = stripped.to_string();
            break;
        }
    }
    normalized
}

fn snap(value: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let cell = (value / DEDUP_GRID_DEGREES).round() as i64;
    cell
}

fn dedup_key(record: &VenueRecord) -> (String, i64, i64) {
    (
        normalized_name(&record.name),
        snap(record.latitude),
        snap(record.longitude),
    )
}

/// Drops later records that share a normalized name and dedup grid cell with
/// an earlier one. Order of the survivors is preserved.
#[must_use]
pub fn deduplicate(records: Vec<VenueRecord>) -> Vec<VenueRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(dedup_key(r)))
        .collect()
}

/// Ranking order: weighted score descending, then distance ascending.
#[must_use]
pub fn compare_rank(a: &VenueRecord, b: &VenueRecord) -> Ordering {
    let score_a = weighted_score(a.rating, a.review_count);
    let score_b = weighted_score(b.rating, b.review_count);
    score_b
        .total_cmp(&score_a)
        .then_with(|| a.distance_km.total_cmp(&b.distance_km))
}

pub fn rank(records: &mut [VenueRecord]) {
    records.sort_by(compare_rank);
}
