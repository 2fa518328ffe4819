//! Health and cache maintenance endpoints.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CacheStatsResponse, HealthResponse};

/// `GET /api/health`
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let config = state.config();

    Ok(Json(ApiResponse::success(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.search_service().aggregator().mode().to_string(),
        google_configured: config.google.is_configured(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })))
}

/// `GET /api/cache/stats`
pub async fn cache_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CacheStatsResponse>>, ApiError> {
    let stats = state.cache().stats().await;
    let config = state.config();

    Ok(Json(ApiResponse::success(CacheStatsResponse {
        stats,
        ttl_hours: config.cache.ttl_hours,
        radius_meters: config.cache.radius_meters,
    })))
}

#[derive(Debug, Serialize)]
pub struct CacheClearedResponse {
    pub removed: usize,
}

/// `DELETE /api/cache`
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CacheClearedResponse>>, ApiError> {
    let removed = state.cache().clear().await;
    Ok(Json(ApiResponse::success(CacheClearedResponse { removed })))
}
