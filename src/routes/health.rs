//! Health check endpoint
//!
//! Liveness probe: returns 200 whenever the service is running. The body
//! reports whether the document store still answers a ping so callers can
//! tell a healthy process from one with a dead store behind it.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;

use super::json_response;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    /// Cargo package version
    pub version: &'static str,
    /// "connected" or "unreachable"
    pub database: &'static str,
    pub timestamp: String,
}

/// Handle GET /health
pub async fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let database = if state.mongo.ping().await.is_ok() {
        "connected"
    } else {
        "unreachable"
    };

    json_response(
        StatusCode::OK,
        HealthResponse {
            healthy: true,
            version: env!("CARGO_PKG_VERSION"),
            database,
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    )
}
