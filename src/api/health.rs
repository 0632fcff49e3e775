//! Health check and global date range.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::responses::{format_datetime, DateRangeResponse, HealthResponse};
use super::AppState;
use crate::error::ApiError;
use crate::store::engine;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        parquet_available: state.store.available(),
    })
}

pub async fn date_range(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DateRangeResponse>, ApiError> {
    state.store.ensure_available()?;
    let (min, max) = engine::global_date_range(&state.store.full_scan_glob()).await?;
    Ok(Json(DateRangeResponse {
        min_date: format_datetime(min),
        max_date: format_datetime(max),
    }))
}
