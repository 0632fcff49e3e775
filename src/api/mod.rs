//! Query Service HTTP surface.
//!
//! Read-only endpoints over the Parquet store. State is one injected
//! [`Store`] handle; every data endpoint re-checks store availability before
//! touching the engine.

pub mod health;
pub mod responses;
pub mod stocks;
pub mod symbols;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::store::Store;

pub struct AppState {
    pub store: Store,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/date-range", get(health::date_range))
        .route("/api/symbols", get(symbols::list_symbols))
        .route("/api/stocks/{symbol}", get(stocks::get_stocks))
        .route("/api/stocks/{symbol}/stats", get(stocks::get_stats))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
