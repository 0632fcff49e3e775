//! Caching proxy in front of the Query Service.
//!
//! Mirrors the data API's path shapes, memoizes the two slow-changing
//! responses for [`cache::CACHE_TTL`], forwards everything else with its
//! query parameters, and serves the consumer page at `/`.

pub mod cache;
pub mod upstream;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use garde::Validate;
use serde_json::Value;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::api::stocks::{StatsQuery, StockQuery};
use crate::error::ApiError;

use cache::{CacheKey, TtlCache};
use upstream::Upstream;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub struct ProxyState {
    pub upstream: Upstream,
    pub cache: TtlCache,
}

impl ProxyState {
    pub fn new(upstream: Upstream) -> Self {
        Self {
            upstream,
            cache: TtlCache::new(),
        }
    }
}

pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/date-range", get(date_range))
        .route("/api/symbols", get(symbols))
        .route("/api/stocks/{symbol}", get(stocks))
        .route("/api/stocks/{symbol}/stats", get(stats))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<Arc<ProxyState>>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.upstream.get_json("/api/health", &[]).await?))
}

async fn date_range(State(state): State<Arc<ProxyState>>) -> Result<Json<Value>, ApiError> {
    cached_fetch(&state, CacheKey::DateRange, "/api/date-range").await
}

async fn symbols(State(state): State<Arc<ProxyState>>) -> Result<Json<Value>, ApiError> {
    cached_fetch(&state, CacheKey::Symbols, "/api/symbols").await
}

/// Serve from cache when fresh, otherwise fetch and overwrite the entry.
async fn cached_fetch(
    state: &ProxyState,
    key: CacheKey,
    path: &str,
) -> Result<Json<Value>, ApiError> {
    if let Some(hit) = state.cache.get(key) {
        tracing::debug!(?key, "cache hit");
        return Ok(Json(hit));
    }
    let fresh = state.upstream.get_json(path, &[]).await?;
    state.cache.put(key, fresh.clone());
    Ok(Json(fresh))
}

async fn stocks(
    State(state): State<Arc<ProxyState>>,
    Path(symbol): Path<String>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Value>, ApiError> {
    query
        .validate()
        .map_err(|report| ApiError::InvalidInput(report.to_string()))?;

    let mut params: Vec<(&str, String)> = vec![
        ("limit", query.limit.to_string()),
        ("offset", query.offset.to_string()),
    ];
    if let Some(start) = query.start {
        params.push(("start", start.to_string()));
    }
    if let Some(end) = query.end {
        params.push(("end", end.to_string()));
    }
    let body = state
        .upstream
        .get_json(&format!("/api/stocks/{symbol}"), &params)
        .await?;
    Ok(Json(body))
}

async fn stats(
    State(state): State<Arc<ProxyState>>,
    Path(symbol): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut params: Vec<(&str, String)> = Vec::new();
    if let Some(start) = query.start {
        params.push(("start", start.to_string()));
    }
    if let Some(end) = query.end {
        params.push(("end", end.to_string()));
    }
    let body = state
        .upstream
        .get_json(&format!("/api/stocks/{symbol}/stats"), &params)
        .await?;
    Ok(Json(body))
}
