//! Configuration types for the swarm subsystem

use serde::{Deserialize, Serialize};

use super::balancer::LoadBalanceStrategy;
use super::domain::AgentType;

/// Configuration for the swarm manager
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwarmSettings {
    /// Upper bound on agents per role pool
    #[serde(default = "default_max_agents_per_type")]
    pub max_agents_per_type: usize,
    /// Roles that get one agent created at startup
    #[serde(default = "default_agent_types")]
    pub default_agent_types: Vec<AgentType>,
    /// Policy for picking an idle agent at assignment time
    #[serde(default)]
    pub load_balance_strategy: LoadBalanceStrategy,
}

impl Default for SwarmSettings {
    fn default() -> Self {
        Self {
            max_agents_per_type: default_max_agents_per_type(),
            default_agent_types: default_agent_types(),
            load_balance_strategy: LoadBalanceStrategy::default(),
        }
    }
}

fn default_max_agents_per_type() -> usize {
    10
}

fn default_agent_types() -> Vec<AgentType> {
    vec![
        AgentType::Research,
        AgentType::Architect,
        AgentType::Implementation,
        AgentType::Testing,
        AgentType::Review,
    ]
}

/// Configuration for the SPARC workflow engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SparcSettings {
    /// Whether SPARC workflow tools are exposed
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Include the Pseudocode phase
    #[serde(default = "default_true")]
    pub pseudocode_phase: bool,
    /// Include the Architecture phase
    #[serde(default = "default_true")]
    pub architecture_phase: bool,
    /// Include the Refinement phase
    #[serde(default = "default_true")]
    pub refinement_phase: bool,
    /// Iteration budget for in-phase refinement
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Advance to the next phase automatically when one completes
    #[serde(default = "default_true")]
    pub auto_advance: bool,
}

impl Default for SparcSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            pseudocode_phase: true,
            architecture_phase: true,
            refinement_phase: true,
            max_iterations: default_max_iterations(),
            auto_advance: true,
        }
    }
}

/// Configuration for boomerang refinement cycles
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoomerangSettings {
    /// Whether boomerang tools are exposed
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Resubmission budget per original task
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for BoomerangSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_iterations() -> u32 {
    3
}

/// Configuration for the external generation provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Provider type
    pub provider: GenerationProviderType,
    /// Model name/identifier
    pub model: String,
    /// Custom base URL (for self-hosted or proxied endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Environment variable containing the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Sampling temperature for agent executions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Completion token budget for agent executions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Supported generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProviderType {
    /// OpenAI-compatible chat completions endpoint
    #[default]
    OpenAI,
    /// Ollama (local models)
    Ollama,
}

impl std::fmt::Display for GenerationProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationProviderType::OpenAI => write!(f, "openai"),
            GenerationProviderType::Ollama => write!(f, "ollama"),
        }
    }
}
