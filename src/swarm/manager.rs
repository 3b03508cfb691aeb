//! Swarm manager: the single owner of agent and task state
//!
//! All agent and task records live behind one `RwLock`. Every public
//! operation acquires the lock once for its full duration and internal
//! helpers operate on the already-locked state, so no operation ever
//! re-enters the lock. Other components (the SPARC engine, boomerang
//! coordinator, tool and API adapters) hold only ids and go through these
//! operations; nothing else mutates an agent or task.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::balancer::LoadBalanceStrategy;
use super::config::SwarmSettings;
use super::domain::{
    Agent, AgentId, AgentStatus, AgentType, Task, TaskId, TaskStatus,
};
use super::error::{SwarmError, SwarmResult};

/// Shared handle to a swarm manager
pub type SharedSwarmManager = Arc<SwarmManager>;

/// Registries and the pending queue, guarded as one unit
struct SwarmState {
    agents: HashMap<AgentId, Agent>,
    /// Per-role agent ids in creation order; the balancer iterates these
    pools: HashMap<AgentType, Vec<AgentId>>,
    tasks: HashMap<TaskId, Task>,
    /// Tasks awaiting assignment, in creation order
    queue: VecDeque<TaskId>,
}

impl SwarmState {
    fn new() -> Self {
        Self {
            agents: HashMap::new(),
            pools: HashMap::new(),
            tasks: HashMap::new(),
            queue: VecDeque::new(),
        }
    }
}

/// Counts of tasks by status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskCounts {
    pub pending: usize,
    pub assigned: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// Counts of agents by status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentCounts {
    pub idle: usize,
    pub busy: usize,
    pub learning: usize,
    pub error: usize,
    pub maintenance: usize,
}

/// Snapshot of swarm occupancy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmStats {
    pub tasks: TaskCounts,
    pub agents: AgentCounts,
    pub queue_depth: usize,
}

/// Outcome of a single assignment attempt
///
/// "No idle agent" and "dependencies not ready" leave the task pending and
/// are soft outcomes rather than errors, so queue sweeps can retry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Task was handed to an agent
    Assigned,
    /// No idle agent of the required role; task stays pending
    NoAgentAvailable,
    /// At least one dependency has not completed yet; task stays pending
    WaitingOnDependencies,
    /// A dependency failed or was cancelled; the task was failed
    DependencyFailed,
}

pub struct SwarmManager {
    max_agents_per_type: usize,
    strategy: LoadBalanceStrategy,
    state: RwLock<SwarmState>,
}

impl SwarmManager {
    /// Create a manager and populate the default agent pools
    pub fn new(settings: &SwarmSettings) -> Self {
        let mut state = SwarmState::new();
        for agent_type in &settings.default_agent_types {
            let agent = Agent::new(*agent_type);
            state.pools.entry(*agent_type).or_default().push(agent.id);
            state.agents.insert(agent.id, agent);
        }
        debug!(
            agents = state.agents.len(),
            strategy = %settings.load_balance_strategy,
            "swarm manager initialized"
        );
        Self {
            max_agents_per_type: settings.max_agents_per_type,
            strategy: settings.load_balance_strategy,
            state: RwLock::new(state),
        }
    }

    // ------------------------------------------------------------------
    // Agents
    // ------------------------------------------------------------------

    /// Register a new agent of the given role
    ///
    /// Fails with [`SwarmError::PoolExhausted`] when the role's pool is
    /// already at `max_agents_per_type`.
    pub async fn create_agent(&self, agent_type: AgentType) -> SwarmResult<Agent> {
        let mut state = self.state.write().await;
        let pool = state.pools.entry(agent_type).or_default();
        if pool.len() >= self.max_agents_per_type {
            return Err(SwarmError::PoolExhausted {
                agent_type,
                limit: self.max_agents_per_type,
            });
        }
        let agent = Agent::new(agent_type);
        pool.push(agent.id);
        state.agents.insert(agent.id, agent.clone());
        debug!(agent = %agent.id, role = %agent_type, "agent created");
        Ok(agent)
    }

    pub async fn get_agent(&self, id: AgentId) -> SwarmResult<Agent> {
        let state = self.state.read().await;
        state
            .agents
            .get(&id)
            .cloned()
            .ok_or(SwarmError::AgentNotFound(id))
    }

    /// List agents, optionally filtered by role and/or status
    pub async fn list_agents(
        &self,
        type_filter: Option<AgentType>,
        status_filter: Option<AgentStatus>,
    ) -> Vec<Agent> {
        let state = self.state.read().await;
        let mut agents: Vec<Agent> = state
            .agents
            .values()
            .filter(|a| type_filter.map_or(true, |t| a.agent_type == t))
            .filter(|a| status_filter.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        agents.sort_by_key(|a| a.created_at);
        agents
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// Create a task and enqueue it for assignment
    pub async fn create_task(
        &self,
        description: impl Into<String>,
        agent_type: AgentType,
        priority: i32,
        dependencies: Vec<TaskId>,
    ) -> Task {
        let task = Task::new(description, agent_type, priority, dependencies);
        let mut state = self.state.write().await;
        state.queue.push_back(task.id);
        state.tasks.insert(task.id, task.clone());
        debug!(task = %task.id, role = %agent_type, "task created");
        task
    }

    pub async fn get_task(&self, id: TaskId) -> SwarmResult<Task> {
        let state = self.state.read().await;
        state
            .tasks
            .get(&id)
            .cloned()
            .ok_or(SwarmError::TaskNotFound(id))
    }

    /// List tasks, optionally filtered by status and/or required role
    pub async fn list_tasks(
        &self,
        status_filter: Option<TaskStatus>,
        type_filter: Option<AgentType>,
    ) -> Vec<Task> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| status_filter.map_or(true, |s| t.status == s))
            .filter(|t| type_filter.map_or(true, |ty| t.agent_type == ty))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    /// Attempt to hand a pending task to an idle agent of its role
    pub async fn assign_task(&self, id: TaskId) -> SwarmResult<AssignOutcome> {
        let mut state = self.state.write().await;
        Self::assign_locked(&mut state, self.strategy, id)
    }

    /// Move an assigned task to running
    pub async fn start_task(&self, id: TaskId) -> SwarmResult<()> {
        let mut state = self.state.write().await;
        let task = state.tasks.get_mut(&id).ok_or(SwarmError::TaskNotFound(id))?;
        if task.status != TaskStatus::Assigned {
            return Err(SwarmError::Precondition {
                task: id,
                expected: TaskStatus::Assigned,
                actual: task.status,
            });
        }
        task.status = TaskStatus::Running;
        task.started_at = Some(Utc::now());
        debug!(task = %id, "task started");
        Ok(())
    }

    /// Record a running task's result and release its agent
    pub async fn complete_task(&self, id: TaskId, result: Value) -> SwarmResult<()> {
        let mut state = self.state.write().await;
        let task = state.tasks.get_mut(&id).ok_or(SwarmError::TaskNotFound(id))?;
        if task.status != TaskStatus::Running {
            return Err(SwarmError::Precondition {
                task: id,
                expected: TaskStatus::Running,
                actual: task.status,
            });
        }
        let now = Utc::now();
        task.status = TaskStatus::Completed;
        task.result = Some(result);
        task.completed_at = Some(now);
        let duration_ms = task
            .started_at
            .map(|s| (now - s).num_milliseconds() as f64)
            .unwrap_or(0.0);
        let agent_id = task.agent_id;

        if let Some(agent_id) = agent_id {
            if let Some(agent) = state.agents.get_mut(&agent_id) {
                agent.stats.record_completion(duration_ms, now);
                agent.status = AgentStatus::Idle;
                agent.current_task = None;
            }
        }
        debug!(task = %id, "task completed");
        Ok(())
    }

    /// Record a task failure and release its agent
    ///
    /// Accepted from any non-terminal status; the usual caller is an
    /// executor that hit an error while the task was running.
    pub async fn fail_task(&self, id: TaskId, error: impl Into<String>) -> SwarmResult<()> {
        let mut state = self.state.write().await;
        Self::fail_locked(&mut state, id, error.into())
    }

    /// Cancel a non-terminal task, releasing its agent if one was held
    pub async fn cancel_task(&self, id: TaskId) -> SwarmResult<()> {
        let mut state = self.state.write().await;
        let task = state.tasks.get_mut(&id).ok_or(SwarmError::TaskNotFound(id))?;
        if task.status.is_terminal() {
            return Err(SwarmError::Precondition {
                task: id,
                expected: TaskStatus::Running,
                actual: task.status,
            });
        }
        task.status = TaskStatus::Cancelled;
        task.completed_at = Some(Utc::now());
        let agent_id = task.agent_id;
        state.queue.retain(|qid| *qid != id);
        if let Some(agent_id) = agent_id {
            Self::release_agent(&mut state, agent_id);
        }
        debug!(task = %id, "task cancelled");
        Ok(())
    }

    /// Sweep the pending queue, attempting assignment for every entry
    ///
    /// Returns the number of tasks assigned. Tasks that still have no idle
    /// agent or unfinished dependencies remain queued; running this twice
    /// with no capacity change assigns nothing the second time.
    pub async fn process_queue(&self) -> usize {
        let mut state = self.state.write().await;
        let snapshot: Vec<TaskId> = state.queue.iter().copied().collect();
        let mut assigned = 0;
        for id in snapshot {
            match Self::assign_locked(&mut state, self.strategy, id) {
                Ok(AssignOutcome::Assigned) => assigned += 1,
                Ok(_) => {}
                Err(e) => warn!(task = %id, error = %e, "queued task could not be assigned"),
            }
        }
        assigned
    }

    /// Counts of tasks and agents by status
    pub async fn stats(&self) -> SwarmStats {
        let state = self.state.read().await;
        let mut tasks = TaskCounts::default();
        for task in state.tasks.values() {
            match task.status {
                TaskStatus::Pending => tasks.pending += 1,
                TaskStatus::Assigned => tasks.assigned += 1,
                TaskStatus::Running => tasks.running += 1,
                TaskStatus::Completed => tasks.completed += 1,
                TaskStatus::Failed => tasks.failed += 1,
                TaskStatus::Cancelled => tasks.cancelled += 1,
            }
        }
        let mut agents = AgentCounts::default();
        for agent in state.agents.values() {
            match agent.status {
                AgentStatus::Idle => agents.idle += 1,
                AgentStatus::Busy => agents.busy += 1,
                AgentStatus::Learning => agents.learning += 1,
                AgentStatus::Error => agents.error += 1,
                AgentStatus::Maintenance => agents.maintenance += 1,
            }
        }
        SwarmStats {
            tasks,
            agents,
            queue_depth: state.queue.len(),
        }
    }

    // ------------------------------------------------------------------
    // Locked helpers (take the state, never the lock)
    // ------------------------------------------------------------------

    fn assign_locked(
        state: &mut SwarmState,
        strategy: LoadBalanceStrategy,
        id: TaskId,
    ) -> SwarmResult<AssignOutcome> {
        let task = state.tasks.get(&id).ok_or(SwarmError::TaskNotFound(id))?;
        if task.status != TaskStatus::Pending {
            return Err(SwarmError::Precondition {
                task: id,
                expected: TaskStatus::Pending,
                actual: task.status,
            });
        }
        let agent_type = task.agent_type;

        // Dependency gate: assignment waits for every dependency to
        // complete; a failed or cancelled dependency fails this task.
        let mut blocked = false;
        let mut broken_dep: Option<TaskId> = None;
        for dep in &task.dependencies {
            match state.tasks.get(dep) {
                None => return Err(SwarmError::TaskNotFound(*dep)),
                Some(d) => match d.status {
                    TaskStatus::Completed => {}
                    TaskStatus::Failed | TaskStatus::Cancelled => {
                        broken_dep = Some(*dep);
                        break;
                    }
                    _ => blocked = true,
                },
            }
        }
        if let Some(dep) = broken_dep {
            warn!(task = %id, dependency = %dep, "dependency failed, failing task");
            Self::fail_locked(state, id, format!("dependency {} did not complete", dep))?;
            return Ok(AssignOutcome::DependencyFailed);
        }
        if blocked {
            return Ok(AssignOutcome::WaitingOnDependencies);
        }

        let Some(pool) = state.pools.get(&agent_type) else {
            return Ok(AssignOutcome::NoAgentAvailable);
        };
        let Some(agent_id) = strategy.select(pool, &state.agents) else {
            return Ok(AssignOutcome::NoAgentAvailable);
        };

        let now = Utc::now();
        let task = state
            .tasks
            .get_mut(&id)
            .expect("task presence checked above");
        task.status = TaskStatus::Assigned;
        task.agent_id = Some(agent_id);
        let agent = state
            .agents
            .get_mut(&agent_id)
            .expect("balancer returned a registered agent");
        agent.status = AgentStatus::Busy;
        agent.current_task = Some(id);
        agent.stats.last_active = now;
        state.queue.retain(|qid| *qid != id);
        debug!(task = %id, agent = %agent_id, "task assigned");
        Ok(AssignOutcome::Assigned)
    }

    fn fail_locked(state: &mut SwarmState, id: TaskId, error: String) -> SwarmResult<()> {
        let task = state.tasks.get_mut(&id).ok_or(SwarmError::TaskNotFound(id))?;
        if task.status.is_terminal() {
            return Err(SwarmError::Precondition {
                task: id,
                expected: TaskStatus::Running,
                actual: task.status,
            });
        }
        let now = Utc::now();
        task.status = TaskStatus::Failed;
        task.error = Some(error);
        task.completed_at = Some(now);
        let agent_id = task.agent_id;
        state.queue.retain(|qid| *qid != id);
        if let Some(agent_id) = agent_id {
            if let Some(agent) = state.agents.get_mut(&agent_id) {
                agent.stats.record_failure(now);
                agent.status = AgentStatus::Idle;
                agent.current_task = None;
            }
        }
        debug!(task = %id, "task failed");
        Ok(())
    }

    fn release_agent(state: &mut SwarmState, agent_id: AgentId) {
        if let Some(agent) = state.agents.get_mut(&agent_id) {
            agent.status = AgentStatus::Idle;
            agent.current_task = None;
            agent.stats.last_active = Utc::now();
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
