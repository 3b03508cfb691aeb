//! SPARC workflow engine
//!
//! Drives a task through the phase sequence Specification -> Pseudocode ->
//! Architecture -> Refinement -> Completion, where the middle three phases
//! are individually configurable. Each phase is executed as a regular swarm
//! task assigned to an agent of the phase's role; phase completion runs in a
//! detached monitor so starting a workflow returns as soon as its first
//! phase's task is running.
//!
//! Callers observe progress either by polling [`SparcEngine::workflow_status`]
//! or by awaiting [`SparcEngine::wait_for_terminal`], which is backed by a
//! `watch` channel updated on every workflow status change.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};

use super::config::SparcSettings;
use super::domain::{AgentStatus, AgentType, TaskId};
use super::error::{SwarmError, SwarmResult};
use super::executor::TaskRunner;
use super::manager::{AssignOutcome, SwarmManager};

/// Priority given to tasks created for workflow phases
const PHASE_TASK_PRIORITY: i32 = 5;

/// A phase of the SPARC sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SparcPhase {
    Specification,
    Pseudocode,
    Architecture,
    Refinement,
    Completion,
}

impl SparcPhase {
    /// Execution order; disabled phases are skipped but never reordered
    pub const ORDER: [SparcPhase; 5] = [
        SparcPhase::Specification,
        SparcPhase::Pseudocode,
        SparcPhase::Architecture,
        SparcPhase::Refinement,
        SparcPhase::Completion,
    ];

    /// Role that executes this phase
    pub fn agent_type(&self) -> AgentType {
        match self {
            SparcPhase::Specification => AgentType::Research,
            SparcPhase::Pseudocode | SparcPhase::Architecture => AgentType::Architect,
            SparcPhase::Refinement => AgentType::Review,
            SparcPhase::Completion => AgentType::Implementation,
        }
    }
}

impl std::fmt::Display for SparcPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SparcPhase::Specification => write!(f, "specification"),
            SparcPhase::Pseudocode => write!(f, "pseudocode"),
            SparcPhase::Architecture => write!(f, "architecture"),
            SparcPhase::Refinement => write!(f, "refinement"),
            SparcPhase::Completion => write!(f, "completion"),
        }
    }
}

/// Status of a single phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Per-phase execution record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseState {
    pub status: PhaseStatus,
    pub agent_type: AgentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Context handed to the phase's task (description, carried results)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub inputs: HashMap<String, Value>,
    /// What the phase produced, keyed for downstream phases
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub outputs: HashMap<String, Value>,
}

impl PhaseState {
    fn pending(agent_type: AgentType) -> Self {
        Self {
            status: PhaseStatus::Pending,
            agent_type,
            task_id: None,
            result: None,
            error: None,
            started_at: None,
            completed_at: None,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
        }
    }
}

/// Workflow lifecycle status
///
/// `Refining` is reserved for in-phase iterative refinement and is not
/// produced by the current transition logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Refining,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }
}

/// A SPARC workflow instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparcWorkflow {
    pub id: String,
    pub original_task_id: TaskId,
    pub description: String,
    pub phases: HashMap<SparcPhase, PhaseState>,
    pub current_phase: SparcPhase,
    pub status: WorkflowStatus,
    pub iteration_count: u32,
    pub max_iterations: u32,
    /// Aggregate of all phase results, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_result: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Pure-read snapshot of workflow progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStatusReport {
    pub id: String,
    pub status: WorkflowStatus,
    pub current_phase: SparcPhase,
    pub iteration_count: u32,
    /// Phase statuses in execution order
    pub phases: Vec<PhaseStatusEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseStatusEntry {
    pub phase: SparcPhase,
    pub status: PhaseStatus,
}

/// Engine coordinating SPARC workflows on top of the swarm manager
///
/// The engine owns only workflow bookkeeping; agents and tasks stay in the
/// manager's registries and are touched exclusively through its operations.
#[derive(Clone)]
pub struct SparcEngine {
    manager: Arc<SwarmManager>,
    runner: Arc<dyn TaskRunner>,
    settings: SparcSettings,
    workflows: Arc<RwLock<HashMap<String, SparcWorkflow>>>,
    notifiers: Arc<RwLock<HashMap<String, watch::Sender<WorkflowStatus>>>>,
}

impl SparcEngine {
    pub fn new(
        manager: Arc<SwarmManager>,
        runner: Arc<dyn TaskRunner>,
        settings: SparcSettings,
    ) -> Self {
        Self {
            manager,
            runner,
            settings,
            workflows: Arc::new(RwLock::new(HashMap::new())),
            notifiers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Phases enabled by the engine's configuration, in execution order
    fn enabled_phases(&self) -> Vec<SparcPhase> {
        SparcPhase::ORDER
            .into_iter()
            .filter(|phase| match phase {
                SparcPhase::Specification | SparcPhase::Completion => true,
                SparcPhase::Pseudocode => self.settings.pseudocode_phase,
                SparcPhase::Architecture => self.settings.architecture_phase,
                SparcPhase::Refinement => self.settings.refinement_phase,
            })
            .collect()
    }

    /// Register a workflow for the given originating task
    ///
    /// Creation is idempotent per originating task: a second call returns the
    /// workflow already registered for that task.
    pub async fn create_workflow(
        &self,
        original_task_id: TaskId,
        description: impl Into<String>,
    ) -> SparcWorkflow {
        let id = format!("sparc-{}", original_task_id);
        let mut workflows = self.workflows.write().await;
        if let Some(existing) = workflows.get(&id) {
            return existing.clone();
        }

        let phases = self
            .enabled_phases()
            .into_iter()
            .map(|phase| (phase, PhaseState::pending(phase.agent_type())))
            .collect();
        let workflow = SparcWorkflow {
            id: id.clone(),
            original_task_id,
            description: description.into(),
            phases,
            current_phase: SparcPhase::Specification,
            status: WorkflowStatus::Pending,
            iteration_count: 0,
            max_iterations: self.settings.max_iterations,
            final_result: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        workflows.insert(id.clone(), workflow.clone());

        let (tx, _rx) = watch::channel(WorkflowStatus::Pending);
        self.notifiers.write().await.insert(id.clone(), tx);
        info!(workflow = %id, "sparc workflow created");
        workflow
    }

    pub async fn get_workflow(&self, id: &str) -> SwarmResult<SparcWorkflow> {
        self.workflows
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SwarmError::WorkflowNotFound(id.to_string()))
    }

    /// Begin executing a pending workflow
    ///
    /// Returns once the Specification phase's task is running; completion of
    /// the workflow is observed via [`workflow_status`](Self::workflow_status)
    /// or [`wait_for_terminal`](Self::wait_for_terminal).
    pub async fn start_workflow(&self, id: &str) -> SwarmResult<()> {
        {
            let mut workflows = self.workflows.write().await;
            let workflow = workflows
                .get_mut(id)
                .ok_or_else(|| SwarmError::WorkflowNotFound(id.to_string()))?;
            if workflow.status != WorkflowStatus::Pending {
                return Err(SwarmError::InvalidWorkflowState {
                    workflow: id.to_string(),
                    state: format!("{:?}", workflow.status),
                    operation: "start",
                });
            }
            workflow.status = WorkflowStatus::InProgress;
            workflow.current_phase = SparcPhase::Specification;
        }
        self.notify(id, WorkflowStatus::InProgress).await;
        info!(workflow = %id, "sparc workflow started");
        self.execute_phase(id.to_string(), SparcPhase::Specification)
            .await
    }

    /// Pure read of workflow progress
    pub async fn workflow_status(&self, id: &str) -> SwarmResult<WorkflowStatusReport> {
        let workflows = self.workflows.read().await;
        let workflow = workflows
            .get(id)
            .ok_or_else(|| SwarmError::WorkflowNotFound(id.to_string()))?;
        let phases = SparcPhase::ORDER
            .into_iter()
            .filter_map(|phase| {
                workflow.phases.get(&phase).map(|state| PhaseStatusEntry {
                    phase,
                    status: state.status,
                })
            })
            .collect();
        Ok(WorkflowStatusReport {
            id: workflow.id.clone(),
            status: workflow.status,
            current_phase: workflow.current_phase,
            iteration_count: workflow.iteration_count,
            phases,
        })
    }

    /// Await the workflow reaching `Completed` or `Failed`
    pub async fn wait_for_terminal(&self, id: &str) -> SwarmResult<WorkflowStatus> {
        let mut rx = {
            let notifiers = self.notifiers.read().await;
            notifiers
                .get(id)
                .ok_or_else(|| SwarmError::WorkflowNotFound(id.to_string()))?
                .subscribe()
        };
        loop {
            let status = *rx.borrow();
            if status.is_terminal() {
                return Ok(status);
            }
            if rx.changed().await.is_err() {
                return Err(SwarmError::Internal(
                    "workflow notifier dropped before completion".to_string(),
                ));
            }
        }
    }

    // ------------------------------------------------------------------
    // Phase execution
    // ------------------------------------------------------------------

    /// Start one phase: acquire an agent, create/assign/start its task, and
    /// detach a monitor that records the outcome and advances the workflow.
    ///
    /// Errors while starting the phase mark both the phase and the workflow
    /// failed and are also returned to the caller.
    async fn execute_phase(&self, workflow_id: String, phase: SparcPhase) -> SwarmResult<()> {
        let (description, spec_context) = {
            let workflows = self.workflows.read().await;
            let workflow = workflows
                .get(&workflow_id)
                .ok_or_else(|| SwarmError::WorkflowNotFound(workflow_id.clone()))?;
            let context = workflow
                .phases
                .get(&SparcPhase::Specification)
                .and_then(|p| p.result.clone());
            (workflow.description.clone(), context)
        };

        match self
            .launch_phase_task(phase, &description, &spec_context)
            .await
        {
            Ok(task_id) => {
                {
                    let mut workflows = self.workflows.write().await;
                    if let Some(workflow) = workflows.get_mut(&workflow_id) {
                        if let Some(state) = workflow.phases.get_mut(&phase) {
                            state.status = PhaseStatus::InProgress;
                            state.task_id = Some(task_id);
                            state.started_at = Some(Utc::now());
                            state.inputs.insert("description".to_string(), json!(description));
                            if let Some(context) = &spec_context {
                                state
                                    .inputs
                                    .insert("specification_context".to_string(), json!(context));
                            }
                        }
                    }
                }
                debug!(workflow = %workflow_id, phase = %phase, task = %task_id, "phase running");

                let engine = self.clone();
                tokio::spawn(async move {
                    engine.monitor_phase(workflow_id, phase, task_id).await;
                });
                Ok(())
            }
            Err(e) => {
                error!(workflow = %workflow_id, phase = %phase, error = %e, "phase start failed");
                self.record_phase_failure(&workflow_id, phase, e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    /// Acquire an agent and drive the phase's task to running
    async fn launch_phase_task(
        &self,
        phase: SparcPhase,
        description: &str,
        spec_context: &Option<String>,
    ) -> SwarmResult<TaskId> {
        let agent_type = phase.agent_type();

        // Never wait for capacity: grow the pool when no agent of the role
        // is idle. Pool exhaustion surfaces as a phase failure.
        let idle = self
            .manager
            .list_agents(Some(agent_type), Some(AgentStatus::Idle))
            .await;
        if idle.is_empty() {
            self.manager.create_agent(agent_type).await?;
        }

        let task_description = match spec_context {
            Some(context) if phase != SparcPhase::Specification => format!(
                "{} phase for: {}\n\nSpecification context:\n{}",
                phase, description, context
            ),
            _ => format!("{} phase for: {}", phase, description),
        };
        let task = self
            .manager
            .create_task(task_description, agent_type, PHASE_TASK_PRIORITY, vec![])
            .await;

        match self.manager.assign_task(task.id).await? {
            AssignOutcome::Assigned => {}
            outcome => {
                return Err(SwarmError::Internal(format!(
                    "could not assign {} phase task: {:?}",
                    phase, outcome
                )))
            }
        }
        self.manager.start_task(task.id).await?;
        Ok(task.id)
    }

    /// Detached monitor: execute the phase task, record the outcome, advance
    async fn monitor_phase(&self, workflow_id: String, phase: SparcPhase, task_id: TaskId) {
        let run = async {
            let task = self.manager.get_task(task_id).await?;
            let agent_id = task
                .agent_id
                .ok_or_else(|| SwarmError::Internal("phase task lost its agent".to_string()))?;
            let agent = self.manager.get_agent(agent_id).await?;
            self.runner.run(&agent, &task).await
        };

        match run.await {
            Ok(text) => {
                if let Err(e) = self.manager.complete_task(task_id, json!(text)).await {
                    warn!(task = %task_id, error = %e, "could not record phase task completion");
                }
                {
                    let mut workflows = self.workflows.write().await;
                    if let Some(workflow) = workflows.get_mut(&workflow_id) {
                        if let Some(state) = workflow.phases.get_mut(&phase) {
                            state.status = PhaseStatus::Completed;
                            state.outputs.insert("result".to_string(), json!(text));
                            state.result = Some(text);
                            state.completed_at = Some(Utc::now());
                        }
                    }
                }
                debug!(workflow = %workflow_id, phase = %phase, "phase completed");
                if self.settings.auto_advance {
                    self.advance(workflow_id, phase).await;
                }
            }
            Err(e) => {
                if let Err(fail_err) = self.manager.fail_task(task_id, e.to_string()).await {
                    warn!(task = %task_id, error = %fail_err, "could not record phase task failure");
                }
                error!(workflow = %workflow_id, phase = %phase, error = %e, "phase failed");
                self.record_phase_failure(&workflow_id, phase, e.to_string())
                    .await;
            }
        }
    }

    /// Move to the next enabled phase, or finalize the workflow
    async fn advance(&self, workflow_id: String, completed: SparcPhase) {
        let next = {
            let mut workflows = self.workflows.write().await;
            let Some(workflow) = workflows.get_mut(&workflow_id) else {
                return;
            };
            let next = SparcPhase::ORDER
                .into_iter()
                .skip_while(|p| *p != completed)
                .skip(1)
                .find(|p| workflow.phases.contains_key(p));
            if let Some(next) = next {
                workflow.current_phase = next;
            }
            next
        };

        match next {
            Some(phase) => {
                // Boxed to break the execute -> monitor -> advance cycle
                let fut: Pin<Box<dyn Future<Output = SwarmResult<()>> + Send + '_>> =
                    Box::pin(self.execute_phase(workflow_id, phase));
                if let Err(e) = fut.await {
                    // failure already recorded by execute_phase
                    debug!(error = %e, "advance halted");
                }
            }
            None => self.complete_workflow(&workflow_id).await,
        }
    }

    /// Mark the workflow completed and synthesize the aggregate result
    async fn complete_workflow(&self, workflow_id: &str) {
        {
            let mut workflows = self.workflows.write().await;
            let Some(workflow) = workflows.get_mut(workflow_id) else {
                return;
            };
            let mut sections = Vec::new();
            for phase in SparcPhase::ORDER {
                if let Some(state) = workflow.phases.get(&phase) {
                    if let Some(result) = &state.result {
                        sections.push(format!("## {}\n{}", phase, result));
                    }
                }
            }
            workflow.status = WorkflowStatus::Completed;
            workflow.final_result = Some(sections.join("\n\n"));
            workflow.completed_at = Some(Utc::now());
        }
        info!(workflow = %workflow_id, "sparc workflow completed");
        self.notify(workflow_id, WorkflowStatus::Completed).await;
    }

    /// Record a phase failure and fail the whole workflow
    ///
    /// Completed phases keep their results for inspection; the workflow does
    /// not advance past the failed phase.
    async fn record_phase_failure(&self, workflow_id: &str, phase: SparcPhase, error: String) {
        {
            let mut workflows = self.workflows.write().await;
            let Some(workflow) = workflows.get_mut(workflow_id) else {
                return;
            };
            if let Some(state) = workflow.phases.get_mut(&phase) {
                state.status = PhaseStatus::Failed;
                state.error = Some(error);
                state.completed_at = Some(Utc::now());
            }
            workflow.status = WorkflowStatus::Failed;
            workflow.completed_at = Some(Utc::now());
        }
        self.notify(workflow_id, WorkflowStatus::Failed).await;
    }

    async fn notify(&self, workflow_id: &str, status: WorkflowStatus) {
        let notifiers = self.notifiers.read().await;
        if let Some(tx) = notifiers.get(workflow_id) {
            let _ = tx.send(status);
        }
    }
}

#[cfg(test)]
#[path = "sparc_test.rs"]
mod tests;
