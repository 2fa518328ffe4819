use anyhow::Context;

use crate::config::Config;
use crate::models::{FoodCategory, ProviderMode, SearchQuery, VenueRecord};
use crate::scoring::format_distance;
use crate::state::SharedState;

pub struct SearchArgs {
    pub lat: f64,
    pub lon: f64,
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub provider: Option<String>,
    pub limit: usize,
}

pub async fn cmd_search(mut config: Config, args: SearchArgs) -> anyhow::Result<()> {
    if let Some(provider) = args.provider.as_deref() {
        config.search.provider = provider.parse::<ProviderMode>()?;
    }
    config.validate()?;

    let categories = args
        .category
        .as_deref()
        .map(FoodCategory::parse_list)
        .transpose()?
        .unwrap_or_default();

    let query = SearchQuery::at(args.lat, args.lon)
        .with_categories(categories)
        .with_keyword(args.keyword.clone().unwrap_or_default());

    if !query.has_valid_coordinates() {
        anyhow::bail!(
            "Invalid coordinates {}, {}: latitude must be within ±90 and longitude within ±180",
            args.lat,
            args.lon
        );
    }

    println!(
        "Searching near {:.5}, {:.5} using {}...",
        args.lat, args.lon, config.search.provider
    );

    let state = SharedState::new(config)?;
    let outcome = state
        .search_service
        .search(&query)
        .await
        .context("Search failed")?;

    if outcome.restaurants.is_empty() {
        println!("No places to eat found nearby");
        return Ok(());
    }

    println!();
    println!(
        "Found {} places ({} shown):",
        outcome.restaurants.len(),
        args.limit.min(outcome.restaurants.len())
    );
    println!("{:-<60}", "");

    for (i, venue) in outcome.restaurants.iter().take(args.limit).enumerate() {
        print_venue(i + 1, venue);
    }

    let stats = outcome.stats;
    println!(
        "Google queries: {} | Google pages: {} | OSM results: {} | Before dedup: {} | After dedup: {}",
        stats.google_search_queries,
        stats.google_pages_searched,
        stats.osm_results_total,
        stats.total_before_dedup,
        stats.total_after_dedup
    );

    Ok(())
}

fn print_venue(position: usize, venue: &VenueRecord) {
    let rating = if venue.rating > 0.0 {
        format!("{:.1}★ ({} reviews)", venue.rating, venue.review_count)
    } else {
        "unrated".to_string()
    };

    println!("{position:>2}. {}", venue.name);
    println!(
        "    {} | {} | {}",
        rating,
        format_distance(venue.distance_km),
        venue.category
    );
    if !venue.address.is_empty() {
        println!("    {}", venue.address);
    }
    println!("    {}", venue.maps_url());
    println!();
}
