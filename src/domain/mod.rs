//! Boundary contracts exposed by the engine
//!
//! Every public swarm operation is exposed as a named tool with a
//! JSON-schema-described input. The transport that carries tool calls is out
//! of scope; [`ToolPort`] is the seam a transport adapter programs against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A remotely invocable operation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments
    pub input_schema: Value,
}

/// Tool-call boundary implemented by the swarm adapter
#[async_trait]
pub trait ToolPort: Send + Sync {
    async fn execute_tool(&self, name: &str, args: Value) -> anyhow::Result<Value>;
    async fn list_tools(&self) -> anyhow::Result<Vec<Tool>>;
}
