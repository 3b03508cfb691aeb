//! # Myrmidon - Agent Swarm Orchestration
//!
//! Myrmidon is an in-process orchestration engine that coordinates pools of
//! typed agents (research, architect, implementation, testing, review, ...)
//! executing units of work, and drives multi-phase SPARC workflows
//! (Specification -> Pseudocode -> Architecture -> Refinement -> Completion)
//! on top of the same primitives.
//!
//! ## Features
//!
//! - **Swarm manager**: agent/task registries with a strict task state
//!   machine and load-balanced assignment (round-robin, least-loaded, random)
//! - **SPARC workflows**: phase-sequenced execution with asynchronous
//!   completion monitoring and optional auto-advance
//! - **Boomerang refinement**: bounded iterative resubmission with history
//! - **Tool surface**: every operation exposed as a JSON-schema-described
//!   tool, plus a small REST/health HTTP surface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use myrmidon::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration from myrmidon.toml
//!     let settings = Settings::new()?;
//!
//!     // Server will start on configured host:port
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Myrmidon follows Hexagonal Architecture:
//! - **Domain**: boundary contracts (tools)
//! - **Swarm**: the coordination engine and its ports
//! - **Adapters**: HTTP and tool-call integrations
//! - **Config**: configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod swarm;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::tool_handler::SwarmToolHandler;
use crate::swarm::manager::SwarmManager;

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `manager` - the swarm manager owning agent/task state
/// * `tools` - tool-call dispatch adapter
/// * `health_handler` - health check handler
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(
    manager: Arc<SwarmManager>,
    tools: Arc<SwarmToolHandler>,
    health_handler: Arc<HealthHandler>,
) -> Router {
    let public_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    let api_state = ApiState { manager, tools };
    let api_router = Router::new()
        .route("/agents", get(api_handler::list_agents))
        .route("/tasks", get(api_handler::list_tasks))
        .route("/stats", get(api_handler::get_stats))
        .route("/tools", get(api_handler::list_tools))
        .route("/tools/:name/invoke", post(api_handler::invoke_tool))
        .with_state(api_state);

    let router = public_router.nest("/api", api_router);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
