//! HTTP surface for the validator.
//!
//! `GET /heartbeat`, `POST /api/latest/shipping/label/validate` and the
//! legacy verdict-only `POST /api/latest/shipping/label/check`.

pub mod handlers;

use crate::core::validator::LabelValidator;
use crate::utils::error::{LabelError, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpListener;

/// 各路由共用的狀態
#[derive(Clone)]
pub struct ServiceState {
    pub validator: LabelValidator,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for LabelError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(category = ?self.category(), "❌ Request failed: {}", self);
        } else {
            tracing::warn!(category = ?self.category(), "Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn build_router(state: ServiceState) -> Router {
    // label photos arrive base64-encoded inside the JSON body
    let shipping = Router::new()
        .route("/label/validate", post(handlers::validate))
        .route("/label/check", post(handlers::check_label))
        .layer(DefaultBodyLimit::max(state.max_body_bytes));

    Router::new()
        .route("/heartbeat", get(handlers::heartbeat))
        .nest("/api/latest/shipping", shipping)
        .with_state(state)
}

/// 啟動 HTTP 服務，收到 Ctrl-C 後結束
pub async fn start_server(listener: TcpListener, state: ServiceState) -> Result<()> {
    tracing::info!(
        policy = ?state.validator.policy(),
        max_body_bytes = state.max_body_bytes,
        "🚀 Listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
