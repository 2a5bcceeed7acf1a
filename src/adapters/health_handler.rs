use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::error::StoreError;
use crate::domain::presets::DEFAULT_FORM_ID;
use crate::domain::FormStorePort;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub store: String,
}

pub struct HealthHandler {
    store: Arc<dyn FormStorePort>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(store: Arc<dyn FormStorePort>) -> Self {
        Self {
            store,
            start_time: std::time::Instant::now(),
        }
    }

    /// A malformed entry still proves the store answered
    async fn store_reachable(&self) -> Result<(), StoreError> {
        match self.store.load(DEFAULT_FORM_ID).await {
            Ok(_) | Err(StoreError::Malformed { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let store = match self.store_reachable().await {
            Ok(()) => "ok".to_string(),
            Err(e) => format!("error: {}", e),
        };
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            checks: HealthChecks { store },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - returns 200 once the form store answers
    pub async fn ready(&self) -> impl IntoResponse {
        match self.store_reachable().await {
            Ok(()) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "ready",
                    "message": "Server is ready to accept requests"
                })),
            ),
            Err(e) => {
                tracing::warn!("Readiness check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({
                        "status": "not_ready",
                        "message": "Form store is unavailable"
                    })),
                )
            }
        }
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "alive",
                "message": "Server is alive"
            })),
        )
    }
}
