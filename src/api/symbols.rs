//! Symbol listing.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::responses::SymbolsResponse;
use super::AppState;
use crate::error::ApiError;
use crate::store::engine;

pub async fn list_symbols(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SymbolsResponse>, ApiError> {
    state.store.ensure_available()?;
    let symbols = engine::list_symbols(&state.store.full_scan_glob()).await?;
    Ok(Json(SymbolsResponse {
        count: symbols.len(),
        symbols,
    }))
}
