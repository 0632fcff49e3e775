//! Proxy tests against a stub data API: caching, parameter forwarding, and
//! failure translation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use nifty_ohlcv::proxy::{self, upstream::Upstream, ProxyState};

// ─── Stub upstream ───────────────────────────────────────────────────────────

#[derive(Default)]
struct Hits {
    symbols: AtomicUsize,
    health: AtomicUsize,
    stocks: AtomicUsize,
}

/// Serve a minimal data API on an ephemeral port, counting requests.
async fn spawn_upstream() -> (String, Arc<Hits>) {
    let hits = Arc::new(Hits::default());

    let symbols_hits = hits.clone();
    let health_hits = hits.clone();
    let stocks_hits = hits.clone();
    let app = Router::new()
        .route(
            "/api/symbols",
            get(move || {
                let hits = symbols_hits.clone();
                async move {
                    hits.symbols.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"symbols": ["TCS"], "count": 1}))
                }
            }),
        )
        .route(
            "/api/health",
            get(move || {
                let hits = health_hits.clone();
                async move {
                    hits.health.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"status": "ok", "parquet_available": true}))
                }
            }),
        )
        .route(
            "/api/date-range",
            get(|| async { Json(json!({"min_date": "2020-01-01 09:15:00", "max_date": "2021-01-01 15:29:00"})) }),
        )
        .route(
            "/api/stocks/{symbol}",
            get(move |Path(symbol): Path<String>, Query(params): Query<HashMap<String, String>>| {
                let hits = stocks_hits.clone();
                async move {
                    hits.stocks.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"symbol": symbol, "params": params}))
                }
            }),
        )
        .route(
            "/api/stocks/{symbol}/stats",
            get(|Path(symbol): Path<String>| async move {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"detail": format!("no data for symbol {symbol}")})),
                )
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), hits)
}

fn make_proxy(base_url: &str) -> Router {
    let upstream = Upstream::new(base_url).unwrap();
    proxy::router(Arc::new(ProxyState::new(upstream)))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ─── Caching ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn symbols_hit_upstream_once_within_ttl() {
    let (base, hits) = spawn_upstream().await;
    let app = make_proxy(&base);

    let (status, first) = get_json(&app, "/api/symbols").await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = get_json(&app, "/api/symbols").await;

    assert_eq!(first, second);
    assert_eq!(hits.symbols.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn health_is_never_cached() {
    let (base, hits) = spawn_upstream().await;
    let app = make_proxy(&base);

    get_json(&app, "/api/health").await;
    get_json(&app, "/api/health").await;
    assert_eq!(hits.health.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn date_range_is_served_from_cache() {
    let (base, _hits) = spawn_upstream().await;
    let app = make_proxy(&base);

    let (status, body) = get_json(&app, "/api/date-range").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["min_date"], "2020-01-01 09:15:00");
    let (_, again) = get_json(&app, "/api/date-range").await;
    assert_eq!(body, again);
}

// ─── Forwarding ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn stocks_forwards_pagination_and_date_params() {
    let (base, _hits) = spawn_upstream().await;
    let app = make_proxy(&base);

    let (status, body) = get_json(&app, "/api/stocks/tcs?start=2020-01-01&limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "tcs");
    assert_eq!(body["params"]["limit"], "5");
    assert_eq!(body["params"]["offset"], "0");
    assert_eq!(body["params"]["start"], "2020-01-01");
    assert!(body["params"].get("end").is_none());
}

#[tokio::test]
async fn proxy_validates_limit_before_forwarding() {
    let (base, hits) = spawn_upstream().await;
    let app = make_proxy(&base);

    let (status, _) = get_json(&app, "/api/stocks/tcs?limit=0").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(hits.stocks.load(Ordering::SeqCst), 0);
}

// ─── Failure translation ─────────────────────────────────────────────────────

#[tokio::test]
async fn upstream_error_status_passes_through_with_detail() {
    let (base, _hits) = spawn_upstream().await;
    let app = make_proxy(&base);

    let (status, body) = get_json(&app, "/api/stocks/XYZ/stats").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "no data for symbol XYZ");
}

#[tokio::test]
async fn unreachable_upstream_is_a_bad_gateway() {
    // Nothing listens here; connection is refused at the transport level.
    let app = make_proxy("http://127.0.0.1:9");

    let (status, body) = get_json(&app, "/api/health").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("unreachable"));
}

// ─── Static page ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn index_page_is_served_at_root() {
    let (base, _hits) = spawn_upstream().await;
    let app = make_proxy(&base);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<html"));
}
