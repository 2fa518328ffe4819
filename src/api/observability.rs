use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span, field, info, info_span};
use uuid::Uuid;

use crate::api::AppState;
use crate::models::SearchOutcome;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// Fills the search fields of the enclosing request span.
pub fn record_search(outcome: &SearchOutcome) {
    let span = Span::current();
    span.record("cache_hit", outcome.stats.cached_result);
    span.record("results", outcome.restaurants.len());
}

/// Wraps each request in a span tagged with the active provider mode.
/// Search handlers add `cache_hit` and `results` through [`record_search`].
pub async fn request_span_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let mode = state.search_service().aggregator().mode().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());
    let method = req.method().to_string();

    let span = info_span!(
        "http",
        id = %Uuid::new_v4(),
        method = method.as_str(),
        route = route.as_str(),
        provider = mode.as_str(),
        cache_hit = field::Empty,
        results = field::Empty,
    );

    let response = next.run(req).instrument(span.clone()).await;
    let status = response.status();
    let elapsed = started.elapsed();

    let labels = [
        ("route", route),
        ("status", status.as_u16().to_string()),
        ("provider", mode),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());

    span.in_scope(|| {
        info!(
            status = status.as_u16(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            failed = status.is_server_error(),
            "{} served",
            method
        );
    });

    response
}
