use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::swarm::manager::SwarmManager;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub agents: usize,
}

pub struct HealthHandler {
    manager: Arc<SwarmManager>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(manager: Arc<SwarmManager>) -> Self {
        Self {
            manager,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let agents = self.manager.list_agents(None, None).await.len();
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            agents,
        };
        (StatusCode::OK, Json(status))
    }

    /// Readiness check - the engine is ready once its agent pools exist
    pub async fn ready(&self) -> impl IntoResponse {
        let agents = self.manager.list_agents(None, None).await;
        if agents.is_empty() {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "message": "No agent pools initialized"
                })),
            )
        } else {
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "ready",
                    "message": "Server is ready to accept requests"
                })),
            )
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::config::SwarmSettings;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let manager = Arc::new(SwarmManager::new(&SwarmSettings::default()));
        let handler = HealthHandler::new(manager);

        let response = handler.health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_requires_agent_pools() {
        let empty = SwarmSettings {
            default_agent_types: vec![],
            ..SwarmSettings::default()
        };
        let manager = Arc::new(SwarmManager::new(&empty));
        let handler = HealthHandler::new(manager);
        let response = handler.ready().await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let manager = Arc::new(SwarmManager::new(&SwarmSettings::default()));
        let handler = HealthHandler::new(manager);
        let response = handler.ready().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn live_endpoint_reports_ok() {
        let manager = Arc::new(SwarmManager::new(&SwarmSettings::default()));
        let handler = HealthHandler::new(manager);
        let response = handler.live().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
