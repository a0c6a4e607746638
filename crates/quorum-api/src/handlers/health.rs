//! Health check handlers
//!
//! Follows Kubernetes health check patterns:
//! - /health - comprehensive status
//! - /health/live - simple liveness (is the process running?)
//! - /health/ready - readiness (can it serve traffic?)

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::state::AppState;

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

/// Comprehensive health response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
}

/// Simple health response for liveness/readiness probes
#[derive(Serialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

/// Start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

fn get_uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(Instant::now);
    start.elapsed().as_secs()
}

/// Comprehensive health check. The directory and mail provider are deliberate
/// omissions: probing them costs remote calls and their failures already
/// surface as typed workflow errors.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_health = check_database(&state).await;
    let overall_status = db_health.status;

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: get_uptime_seconds(),
        components: vec![db_health],
    };

    let status_code = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Check database health
async fn check_database(state: &AppState) -> ComponentHealth {
    let start = Instant::now();

    match tokio::time::timeout(
        Duration::from_secs(5),
        sqlx::query("SELECT 1").fetch_one(&state.db_pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            debug!("Database health check passed");
            ComponentHealth {
                name: "database".to_string(),
                status: HealthStatus::Healthy,
                message: None,
                latency_ms: start.elapsed().as_millis() as u64,
            }
        }
        Ok(Err(e)) => {
            warn!("Database health check failed: {}", e);
            ComponentHealth {
                name: "database".to_string(),
                status: HealthStatus::Unhealthy,
                message: Some(format!("Query failed: {}", e)),
                latency_ms: start.elapsed().as_millis() as u64,
            }
        }
        Err(_) => {
            warn!("Database health check timed out");
            ComponentHealth {
                name: "database".to_string(),
                status: HealthStatus::Unhealthy,
                message: Some("Health check timed out after 5 seconds".to_string()),
                latency_ms: 5000,
            }
        }
    }
}

/// Kubernetes liveness probe
///
/// Returns 200 if the process is alive, without touching dependencies.
pub async fn liveness() -> (StatusCode, Json<SimpleHealthResponse>) {
    (
        StatusCode::OK,
        Json(SimpleHealthResponse {
            status: "alive".to_string(),
        }),
    )
}

/// Kubernetes readiness probe
///
/// Returns 200 if the service can handle traffic (database reachable).
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<SimpleHealthResponse>) {
    let db_ok = matches!(
        tokio::time::timeout(
            Duration::from_secs(2),
            sqlx::query("SELECT 1").fetch_one(&state.db_pool)
        )
        .await,
        Ok(Ok(_))
    );

    if db_ok {
        (
            StatusCode::OK,
            Json(SimpleHealthResponse {
                status: "ready".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(SimpleHealthResponse {
                status: "not ready: database unavailable".to_string(),
            }),
        )
    }
}
