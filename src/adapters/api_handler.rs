//! REST API handlers for the swarm engine
//!
//! Thin HTTP surface over the tool-call boundary plus a few convenience
//! reads. Everything mutating goes through the same [`ToolPort`] dispatch
//! the tool transport uses, so the two surfaces cannot drift apart.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::adapters::tool_handler::SwarmToolHandler;
use crate::domain::ToolPort;
use crate::swarm::domain::{AgentStatus, AgentType, TaskStatus};
use crate::swarm::manager::SwarmManager;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<SwarmManager>,
    pub tools: Arc<SwarmToolHandler>,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AgentListQuery {
    #[serde(rename = "type")]
    pub agent_type: Option<AgentType>,
    pub status: Option<AgentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    #[serde(rename = "type")]
    pub agent_type: Option<AgentType>,
}

/// GET /api/agents
pub async fn list_agents(
    State(state): State<ApiState>,
    Query(query): Query<AgentListQuery>,
) -> impl IntoResponse {
    let agents = state
        .manager
        .list_agents(query.agent_type, query.status)
        .await;
    Json(ApiResponse::success(agents))
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<ApiState>,
    Query(query): Query<TaskListQuery>,
) -> impl IntoResponse {
    let tasks = state
        .manager
        .list_tasks(query.status, query.agent_type)
        .await;
    Json(ApiResponse::success(tasks))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<ApiState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.manager.stats().await))
}

/// GET /api/tools
pub async fn list_tools(State(state): State<ApiState>) -> impl IntoResponse {
    match state.tools.list_tools().await {
        Ok(tools) => (StatusCode::OK, Json(ApiResponse::success(tools))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

/// POST /api/tools/:name/invoke
pub async fn invoke_tool(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(args): Json<Value>,
) -> impl IntoResponse {
    match state.tools.execute_tool(&name, args).await {
        Ok(result) => (StatusCode::OK, Json(ApiResponse::success(result))),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}
