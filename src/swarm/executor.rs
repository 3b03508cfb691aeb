//! Task execution through the generation provider
//!
//! [`TaskRunner`] is the seam between the coordination layer (SPARC engine,
//! boomerang coordinator) and whatever actually produces a task's result.
//! The production implementation, [`RolePromptExecutor`], composes a
//! role-specific instruction with the task description and sends it to the
//! configured generation provider.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::domain::{Agent, AgentType, Task};
use super::generate::{GenerationProvider, GenerationRequest};
use super::error::SwarmResult;

/// Executes a task on behalf of an agent and returns the textual result
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(&self, agent: &Agent, task: &Task) -> SwarmResult<String>;
}

/// Instruction prefix for each agent role
fn role_instruction(agent_type: AgentType) -> &'static str {
    match agent_type {
        AgentType::Research => {
            "You are a research agent. Investigate the following and report \
             your findings with sources and caveats."
        }
        AgentType::Architect => {
            "You are a software architect. Produce a design for the following, \
             covering components, interfaces, and tradeoffs."
        }
        AgentType::Implementation => {
            "You are an implementation agent. Write the code required by the \
             following, with brief notes on usage."
        }
        AgentType::Testing => {
            "You are a testing agent. Design and describe tests for the \
             following, covering normal and edge cases."
        }
        AgentType::Review => {
            "You are a review agent. Critique the following work and list \
             concrete improvements in priority order."
        }
        AgentType::Documentation => {
            "You are a documentation agent. Write clear documentation for the \
             following."
        }
        AgentType::Debugger => {
            "You are a debugging agent. Diagnose the following problem and \
             propose a fix."
        }
    }
}

/// Runs tasks by prompting the generation provider with a role instruction
pub struct RolePromptExecutor {
    provider: Arc<dyn GenerationProvider>,
}

impl RolePromptExecutor {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TaskRunner for RolePromptExecutor {
    async fn run(&self, agent: &Agent, task: &Task) -> SwarmResult<String> {
        let request = GenerationRequest {
            prompt: task.description.clone(),
            system: Some(role_instruction(agent.agent_type).to_string()),
            model: None,
            temperature: None,
            max_tokens: None,
        };
        debug!(
            task = %task.id,
            agent = %agent.id,
            provider = self.provider.name(),
            "executing task"
        );
        let response = self.provider.generate(request).await?;
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_an_instruction() {
        for agent_type in AgentType::ALL {
            assert!(!role_instruction(agent_type).is_empty());
        }
    }
}
