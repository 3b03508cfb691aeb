//! Boomerang refinement cycles
//!
//! A boomerang resubmits an existing task's work with accumulated feedback:
//! each send creates a fresh swarm task whose description is the original
//! description plus the feedback text, runs it, and appends the outcome to
//! the cycle's history. Cycles are bounded by an iteration cap; whether a
//! result is finally acceptable is for the caller to judge from the history.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::config::BoomerangSettings;
use super::domain::{AgentId, AgentStatus, AgentType, TaskId};
use super::error::{SwarmError, SwarmResult};
use super::executor::TaskRunner;
use super::manager::{AssignOutcome, SwarmManager};

/// Priority given to tasks created for refinement iterations
const REFINEMENT_TASK_PRIORITY: i32 = 5;

/// One completed boomerang iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoomerangIteration {
    /// 1-based iteration number within the cycle
    pub iteration: u32,
    pub task_id: TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Refinement state for one original task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoomerangCycle {
    pub original_task_id: TaskId,
    /// Feedback text of the most recent send
    pub feedback: String,
    pub target_agent_type: AgentType,
    /// Priority given to refinement tasks
    pub priority: i32,
    pub iterations: u32,
    pub max_iterations: u32,
    pub history: Vec<BoomerangIteration>,
}

/// Coordinates boomerang cycles on top of the swarm manager
pub struct BoomerangCoordinator {
    manager: Arc<SwarmManager>,
    runner: Arc<dyn TaskRunner>,
    max_iterations: u32,
    cycles: RwLock<HashMap<TaskId, BoomerangCycle>>,
}

impl BoomerangCoordinator {
    pub fn new(
        manager: Arc<SwarmManager>,
        runner: Arc<dyn TaskRunner>,
        settings: &BoomerangSettings,
    ) -> Self {
        Self {
            manager,
            runner,
            max_iterations: settings.max_iterations,
            cycles: RwLock::new(HashMap::new()),
        }
    }

    /// Resubmit a task's work with feedback
    ///
    /// Fails with [`SwarmError::TaskNotFound`] when the original task is
    /// unknown and with [`SwarmError::IterationCapExceeded`] once the cycle
    /// has used its budget. The returned iteration is also appended to the
    /// cycle's history; an execution error is recorded in the history rather
    /// than dropped.
    pub async fn send_boomerang(
        &self,
        original_task_id: TaskId,
        feedback: &str,
        target_agent_type: AgentType,
    ) -> SwarmResult<BoomerangIteration> {
        let original = self.manager.get_task(original_task_id).await?;

        // Reserve the iteration under the cycles lock so concurrent sends
        // cannot overrun the cap.
        let iteration = {
            let mut cycles = self.cycles.write().await;
            let cycle = cycles
                .entry(original_task_id)
                .or_insert_with(|| BoomerangCycle {
                    original_task_id,
                    feedback: String::new(),
                    target_agent_type,
                    priority: REFINEMENT_TASK_PRIORITY,
                    iterations: 0,
                    max_iterations: self.max_iterations,
                    history: Vec::new(),
                });
            if cycle.iterations >= cycle.max_iterations {
                return Err(SwarmError::IterationCapExceeded {
                    task: original_task_id,
                    limit: cycle.max_iterations,
                });
            }
            cycle.feedback = feedback.to_string();
            cycle.iterations += 1;
            cycle.iterations
        };
        debug!(
            task = %original_task_id,
            iteration,
            "boomerang iteration starting"
        );

        let description = format!(
            "{}\n\nRefinement feedback (iteration {}):\n{}",
            original.description, iteration, feedback
        );
        let outcome = self
            .run_iteration(&description, target_agent_type, iteration)
            .await;

        let entry = match outcome {
            Ok(entry) => entry,
            Err(e) => {
                // The swarm-level failure still consumes the iteration; it
                // is visible in the history like an execution failure.
                warn!(task = %original_task_id, error = %e, "boomerang iteration failed to launch");
                BoomerangIteration {
                    iteration,
                    task_id: original_task_id,
                    agent_id: None,
                    result: None,
                    error: Some(e.to_string()),
                    timestamp: Utc::now(),
                }
            }
        };

        let mut cycles = self.cycles.write().await;
        let cycle = cycles
            .get_mut(&original_task_id)
            .expect("cycle created above");
        cycle.history.push(entry.clone());
        info!(
            task = %original_task_id,
            iteration,
            ok = entry.error.is_none(),
            "boomerang iteration recorded"
        );
        Ok(entry)
    }

    /// Iteration history for an original task
    pub async fn history(&self, original_task_id: TaskId) -> SwarmResult<BoomerangCycle> {
        self.cycles
            .read()
            .await
            .get(&original_task_id)
            .cloned()
            .ok_or(SwarmError::TaskNotFound(original_task_id))
    }

    /// Create, assign, start and execute one refinement task
    async fn run_iteration(
        &self,
        description: &str,
        agent_type: AgentType,
        iteration: u32,
    ) -> SwarmResult<BoomerangIteration> {
        let idle = self
            .manager
            .list_agents(Some(agent_type), Some(AgentStatus::Idle))
            .await;
        if idle.is_empty() {
            self.manager.create_agent(agent_type).await?;
        }

        let task = self
            .manager
            .create_task(description, agent_type, REFINEMENT_TASK_PRIORITY, vec![])
            .await;
        match self.manager.assign_task(task.id).await? {
            AssignOutcome::Assigned => {}
            outcome => {
                return Err(SwarmError::Internal(format!(
                    "could not assign boomerang task: {:?}",
                    outcome
                )))
            }
        }
        self.manager.start_task(task.id).await?;

        let task = self.manager.get_task(task.id).await?;
        let agent_id = task
            .agent_id
            .ok_or_else(|| SwarmError::Internal("assigned task has no agent".to_string()))?;
        let agent = self.manager.get_agent(agent_id).await?;

        match self.runner.run(&agent, &task).await {
            Ok(text) => {
                self.manager.complete_task(task.id, json!(text)).await?;
                Ok(BoomerangIteration {
                    iteration,
                    task_id: task.id,
                    agent_id: Some(agent_id),
                    result: Some(text),
                    error: None,
                    timestamp: Utc::now(),
                })
            }
            Err(e) => {
                self.manager.fail_task(task.id, e.to_string()).await?;
                Ok(BoomerangIteration {
                    iteration,
                    task_id: task.id,
                    agent_id: Some(agent_id),
                    result: None,
                    error: Some(e.to_string()),
                    timestamp: Utc::now(),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "boomerang_test.rs"]
mod tests;
