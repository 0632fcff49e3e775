//! Frontend — caching proxy over the Query Service plus the consumer page.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use nifty_ohlcv::config::FrontendConfig;
use nifty_ohlcv::proxy::{self, upstream::Upstream, ProxyState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = FrontendConfig::from_env()?;
    let upstream = Upstream::new(&config.data_api_url)?;
    let app = proxy::router(Arc::new(ProxyState::new(upstream)));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(upstream = %config.data_api_url, "starting frontend on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
