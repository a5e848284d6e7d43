//! Liveness and readiness probes.
//!
//! - `/health` and `/health/live` answer as long as the process serves requests
//! - `/health/ready` additionally pings the database and answers 503 when it is unreachable

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::AppState;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<HealthStatus>,
}

impl HealthInfo {
    fn new(state: &AppState, status: HealthStatus, database: Option<HealthStatus>) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database,
        }
    }
}

pub async fn liveness(State(state): State<AppState>) -> Json<HealthInfo> {
    Json(HealthInfo::new(&state, HealthStatus::Up, None))
}

pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthInfo>) {
    match crate::db::check_connection(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthInfo::new(
                &state,
                HealthStatus::Up,
                Some(HealthStatus::Up),
            )),
        ),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthInfo::new(
                    &state,
                    HealthStatus::Down,
                    Some(HealthStatus::Down),
                )),
            )
        }
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
}
