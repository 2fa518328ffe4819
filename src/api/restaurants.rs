//! Restaurant search endpoints.
//!
//! `GET /api/restaurants` takes query parameters, `POST /api/restaurants`
//! the same fields as JSON. Both return one page of the ranked result set.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::observability;
use super::validation::{parse_categories, parse_coordinate, validate_coordinate, validate_limit};
use super::{ApiError, ApiResponse, AppState, PaginatedSearchResult, Pagination};
use crate::constants::limits::DEFAULT_PAGE_SIZE;
use crate::models::SearchQuery;

/// Query-string form. Coordinates stay strings so bad input gets a JSON error.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub categories: Option<String>,
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchBody {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

pub async fn search_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<PaginatedSearchResult>>, ApiError> {
    let latitude = parse_coordinate("lat", params.lat.as_deref(), 90.0)?;
    let longitude = parse_coordinate("lon", params.lon.as_deref(), 180.0)?;
    let categories = parse_categories(params.categories.as_deref(), params.category.as_deref())?;

    let query = SearchQuery::at(latitude, longitude)
        .with_categories(categories)
        .with_keyword(params.keyword.unwrap_or_default());

    run_search(&state, &query, params.page, params.limit).await
}

pub async fn search_post(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchBody>,
) -> Result<Json<ApiResponse<PaginatedSearchResult>>, ApiError> {
    let latitude = body
        .lat
        .ok_or_else(|| ApiError::validation("Missing required field: lat"))
        .and_then(|v| validate_coordinate("lat", v, 90.0))?;
    let longitude = body
        .lon
        .ok_or_else(|| ApiError::validation("Missing required field: lon"))
        .and_then(|v| validate_coordinate("lon", v, 180.0))?;

    let joined = body.categories.join(",");
    let categories = parse_categories(Some(&joined), body.category.as_deref())?;

    let query = SearchQuery::at(latitude, longitude)
        .with_categories(categories)
        .with_keyword(body.keyword.unwrap_or_default());

    run_search(&state, &query, body.page, body.limit).await
}

async fn run_search(
    state: &AppState,
    query: &SearchQuery,
    page: Option<usize>,
    limit: Option<usize>,
) -> Result<Json<ApiResponse<PaginatedSearchResult>>, ApiError> {
    let limit = validate_limit(limit.unwrap_or(DEFAULT_PAGE_SIZE))?;

    let outcome = state.search_service().search(query).await?;
    observability::record_search(&outcome);

    let pagination = Pagination::new(page.unwrap_or(1), limit, outcome.restaurants.len());
    let restaurants = pagination.slice(&outcome.restaurants).to_vec();

    info!(
        latitude = query.latitude,
        longitude = query.longitude,
        keyword = query.keyword().unwrap_or(""),
        total = pagination.total_items,
        page = pagination.page,
        cached = outcome.stats.cached_result,
        "Restaurant search served"
    );

    Ok(Json(ApiResponse::success(PaginatedSearchResult {
        restaurants,
        stats: outcome.stats,
        pagination,
    })))
}
