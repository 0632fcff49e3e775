//! Error taxonomy shared by the Query Service and the proxy.
//!
//! Every failure is surfaced to the caller as `(status, {"detail": …})`;
//! nothing is retried and nothing is swallowed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Store root missing or holding no Parquet files yet.
    #[error("Parquet data is not available yet. Run: convert-minute-csv")]
    StoreNotReady,

    /// A stats query matched zero rows.
    #[error("no data for symbol {0}")]
    NotFound(String),

    /// Out-of-range limit/offset, rejected before any query executes.
    #[error("{0}")]
    InvalidInput(String),

    /// The proxy's upstream was unreachable at the transport level.
    #[error("data API unreachable: {0}")]
    BadGateway(String),

    /// The proxy's upstream returned a non-success status; passed through
    /// verbatim with the detail extracted from its body.
    #[error("{detail}")]
    Upstream { status: StatusCode, detail: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::StoreNotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Upstream { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
