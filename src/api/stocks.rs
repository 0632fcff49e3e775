//! OHLCV rows and per-symbol stats.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use garde::Validate;
use serde::Deserialize;

use super::responses::{StatsResponse, StockResponse};
use super::AppState;
use crate::error::ApiError;
use crate::store::engine;
use crate::store::select::{normalize_symbol, select_target};

#[derive(Debug, Deserialize, Validate)]
pub struct StockQuery {
    #[garde(skip)]
    pub start: Option<NaiveDate>,
    #[garde(skip)]
    pub end: Option<NaiveDate>,
    /// Row cap per page. Out-of-range values are rejected, never clamped.
    #[garde(range(min = 1, max = 2_000_000))]
    #[serde(default = "default_limit")]
    pub limit: u32,
    // offset is unsigned, so "offset >= 0" is enforced at deserialization.
    #[garde(skip)]
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

fn default_limit() -> u32 {
    1000
}

pub async fn get_stocks(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<StockQuery>,
) -> Result<Json<StockResponse>, ApiError> {
    query
        .validate()
        .map_err(|report| ApiError::InvalidInput(report.to_string()))?;
    state.store.ensure_available()?;

    let symbol = normalize_symbol(&symbol);
    let desc = select_target(&state.store, &symbol, query.start, query.end);
    tracing::debug!(%symbol, glob = %desc.glob, predicate = %desc.predicate, "fetching rows");
    let data = engine::fetch_rows(&desc, query.limit, query.offset).await?;

    Ok(Json(StockResponse {
        symbol,
        count: data.len(),
        data,
    }))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, ApiError> {
    state.store.ensure_available()?;

    let symbol = normalize_symbol(&symbol);
    let desc = select_target(&state.store, &symbol, query.start, query.end);
    let stats = engine::fetch_stats(&desc)
        .await?
        .ok_or_else(|| ApiError::NotFound(symbol.clone()))?;

    Ok(Json(StatsResponse::from_summary(symbol, &stats)))
}
