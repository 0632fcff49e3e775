//! Query Service — read-only OHLCV endpoints over the Parquet store.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use nifty_ohlcv::api::{self, AppState};
use nifty_ohlcv::config::QueryApiConfig;
use nifty_ohlcv::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = QueryApiConfig::from_env()?;
    let store = Store::new(&config.data_root);
    if !store.available() {
        tracing::warn!(
            root = %config.data_root.display(),
            "parquet store is empty; run convert-minute-csv before querying"
        );
    }

    let app = api::router(Arc::new(AppState { store }));
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting query API on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
