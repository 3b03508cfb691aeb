//! Error types for the swarm subsystem

use thiserror::Error;

use super::domain::{AgentId, AgentType, TaskId, TaskStatus};

/// Errors that can occur during swarm operations
#[derive(Debug, Error)]
pub enum SwarmError {
    /// Agent id is not in the registry
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Task id is not in the registry
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Workflow id is not in the engine's registry
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    /// Operation attempted from the wrong task state
    #[error("Task {task} is {actual}, expected {expected}")]
    Precondition {
        task: TaskId,
        expected: TaskStatus,
        actual: TaskStatus,
    },

    /// Agent pool for the requested role is full
    #[error("Agent pool for '{agent_type}' is at capacity ({limit})")]
    PoolExhausted { agent_type: AgentType, limit: usize },

    /// Boomerang cycle has used up its iteration budget
    #[error("Iteration cap reached ({limit}) for task {task}")]
    IterationCapExceeded { task: TaskId, limit: u32 },

    /// Workflow operation attempted from the wrong workflow state
    #[error("Workflow {workflow} is {state}, cannot {operation}")]
    InvalidWorkflowState {
        workflow: String,
        state: String,
        operation: &'static str,
    },

    /// External generation provider error
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors specific to generation provider calls
#[derive(Debug, Error)]
pub enum GenerationError {
    /// API returned a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configured API key environment variable is unset
    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else if err.is_connect() {
            GenerationError::Network(format!("Connection error: {}", err))
        } else {
            GenerationError::Network(err.to_string())
        }
    }
}

/// Result type alias for swarm operations
pub type SwarmResult<T> = Result<T, SwarmError>;

/// Result type alias for generation calls
pub type GenerationResult<T> = Result<T, GenerationError>;
