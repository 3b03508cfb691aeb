//! Agent domain types
//!
//! An agent is a long-lived logical worker with a fixed role. Agents are
//! created by the swarm manager (a default set at startup, more on demand up
//! to a per-type cap) and are never deleted; an agent executes at most one
//! task at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an agent (UUID newtype)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    /// Generate a new random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Agent role enumeration (closed set)
///
/// The role fixes an agent's capabilities and the kind of tasks it may be
/// assigned. Kept as a closed enum so an invalid role can never enter the
/// registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Gathers information and produces analysis
    Research,
    /// Designs system structure and interfaces
    Architect,
    /// Writes code
    Implementation,
    /// Writes and runs tests
    Testing,
    /// Reviews and critiques produced work
    Review,
    /// Writes documentation
    Documentation,
    /// Diagnoses and fixes defects
    Debugger,
}

impl AgentType {
    /// All roles, in a stable order
    pub const ALL: [AgentType; 7] = [
        AgentType::Research,
        AgentType::Architect,
        AgentType::Implementation,
        AgentType::Testing,
        AgentType::Review,
        AgentType::Documentation,
        AgentType::Debugger,
    ];

    /// Capabilities associated with the role (fixed lookup)
    pub fn capabilities(&self) -> &'static [&'static str] {
        match self {
            AgentType::Research => &["web_search", "document_analysis", "summarization"],
            AgentType::Architect => &["system_design", "interface_design", "tradeoff_analysis"],
            AgentType::Implementation => &["code_generation", "refactoring", "integration"],
            AgentType::Testing => &["test_design", "test_execution", "coverage_analysis"],
            AgentType::Review => &["code_review", "quality_assessment", "feedback"],
            AgentType::Documentation => &["technical_writing", "api_documentation"],
            AgentType::Debugger => &["fault_isolation", "log_analysis", "patching"],
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentType::Research => write!(f, "research"),
            AgentType::Architect => write!(f, "architect"),
            AgentType::Implementation => write!(f, "implementation"),
            AgentType::Testing => write!(f, "testing"),
            AgentType::Review => write!(f, "review"),
            AgentType::Documentation => write!(f, "documentation"),
            AgentType::Debugger => write!(f, "debugger"),
        }
    }
}

/// Agent lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Available for assignment
    Idle,
    /// Executing its current task
    Busy,
    /// Absorbing feedback between iterations
    Learning,
    /// Last execution ended in an unrecovered error
    Error,
    /// Taken out of rotation by an operator
    Maintenance,
}

/// Rolling execution statistics for an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStats {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    /// Running mean of task durations in milliseconds
    pub average_duration_ms: f64,
    pub last_active: DateTime<Utc>,
}

impl AgentStats {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            tasks_completed: 0,
            tasks_failed: 0,
            average_duration_ms: 0.0,
            last_active: now,
        }
    }

    /// Fold a completed task's duration into the running mean
    pub fn record_completion(&mut self, duration_ms: f64, now: DateTime<Utc>) {
        self.tasks_completed += 1;
        let n = self.tasks_completed as f64;
        self.average_duration_ms = (self.average_duration_ms * (n - 1.0) + duration_ms) / n;
        self.last_active = now;
    }

    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.tasks_failed += 1;
        self.last_active = now;
    }
}

/// A registered agent
///
/// Invariant: `status == Busy` if and only if `current_task` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub agent_type: AgentType,
    pub status: AgentStatus,
    pub capabilities: Vec<String>,
    /// Task the agent is currently executing, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<super::task::TaskId>,
    pub stats: AgentStats,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(agent_type: AgentType) -> Self {
        let now = Utc::now();
        Self {
            id: AgentId::new(),
            agent_type,
            status: AgentStatus::Idle,
            capabilities: agent_type
                .capabilities()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            current_task: None,
            stats: AgentStats::new(now),
            created_at: now,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == AgentStatus::Idle
    }
}
