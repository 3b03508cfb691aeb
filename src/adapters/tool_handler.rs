//! Tool-call adapter for the swarm engine
//!
//! Maps every public swarm, SPARC, and boomerang operation onto a named tool
//! with a JSON-schema-described input, and dispatches incoming calls onto the
//! engine. Tools for subsystems disabled in configuration are neither listed
//! nor dispatchable.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::{Tool, ToolPort};
use crate::swarm::boomerang::BoomerangCoordinator;
use crate::swarm::domain::{AgentId, AgentStatus, AgentType, TaskId, TaskStatus};
use crate::swarm::manager::SwarmManager;
use crate::swarm::sparc::SparcEngine;

pub struct SwarmToolHandler {
    manager: Arc<SwarmManager>,
    sparc: Option<Arc<SparcEngine>>,
    boomerang: Option<Arc<BoomerangCoordinator>>,
}

impl SwarmToolHandler {
    pub fn new(
        manager: Arc<SwarmManager>,
        sparc: Option<Arc<SparcEngine>>,
        boomerang: Option<Arc<BoomerangCoordinator>>,
    ) -> Self {
        Self {
            manager,
            sparc,
            boomerang,
        }
    }

    fn swarm_tools() -> Vec<Tool> {
        let agent_type_schema = json!({
            "type": "string",
            "enum": ["research", "architect", "implementation", "testing",
                     "review", "documentation", "debugger"]
        });
        vec![
            Tool {
                name: "agent_create".to_string(),
                description: "Create a new agent of the given role".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "type": agent_type_schema.clone() },
                    "required": ["type"]
                }),
            },
            Tool {
                name: "agent_get".to_string(),
                description: "Fetch an agent by id".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "id": { "type": "string" } },
                    "required": ["id"]
                }),
            },
            Tool {
                name: "agent_list".to_string(),
                description: "List agents, optionally filtered by role and status".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "type": agent_type_schema.clone(),
                        "status": {
                            "type": "string",
                            "enum": ["idle", "busy", "learning", "error", "maintenance"]
                        }
                    }
                }),
            },
            Tool {
                name: "task_create".to_string(),
                description: "Create a task and enqueue it for assignment".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "description": { "type": "string" },
                        "type": agent_type_schema.clone(),
                        "priority": { "type": "integer", "default": 0 },
                        "dependencies": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["description", "type"]
                }),
            },
            Tool {
                name: "task_get".to_string(),
                description: "Fetch a task by id".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "id": { "type": "string" } },
                    "required": ["id"]
                }),
            },
            Tool {
                name: "task_list".to_string(),
                description: "List tasks, optionally filtered by status and role".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "status": {
                            "type": "string",
                            "enum": ["pending", "assigned", "running",
                                     "completed", "failed", "cancelled"]
                        },
                        "type": agent_type_schema
                    }
                }),
            },
            Tool {
                name: "task_assign".to_string(),
                description: "Assign a pending task to an idle agent of its role".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "id": { "type": "string" } },
                    "required": ["id"]
                }),
            },
            Tool {
                name: "task_start".to_string(),
                description: "Move an assigned task to running".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "id": { "type": "string" } },
                    "required": ["id"]
                }),
            },
            Tool {
                name: "task_complete".to_string(),
                description: "Record a running task's result".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "result": { "description": "Arbitrary result payload" }
                    },
                    "required": ["id"]
                }),
            },
            Tool {
                name: "task_fail".to_string(),
                description: "Record a task failure".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "error": { "type": "string" }
                    },
                    "required": ["id", "error"]
                }),
            },
            Tool {
                name: "task_cancel".to_string(),
                description: "Cancel a non-terminal task".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "id": { "type": "string" } },
                    "required": ["id"]
                }),
            },
            Tool {
                name: "queue_process".to_string(),
                description: "Retry assignment for every queued task".to_string(),
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            Tool {
                name: "swarm_stats".to_string(),
                description: "Counts of tasks and agents by status".to_string(),
                input_schema: json!({ "type": "object", "properties": {} }),
            },
        ]
    }

    fn sparc_tools() -> Vec<Tool> {
        vec![
            Tool {
                name: "sparc_create".to_string(),
                description: "Create a SPARC workflow for an existing task".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "task_id": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["task_id", "description"]
                }),
            },
            Tool {
                name: "sparc_start".to_string(),
                description: "Start a pending SPARC workflow".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "workflow_id": { "type": "string" } },
                    "required": ["workflow_id"]
                }),
            },
            Tool {
                name: "sparc_status".to_string(),
                description: "Current phase and per-phase statuses of a workflow".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "workflow_id": { "type": "string" } },
                    "required": ["workflow_id"]
                }),
            },
        ]
    }

    fn boomerang_tools() -> Vec<Tool> {
        let agent_type_schema = json!({
            "type": "string",
            "enum": ["research", "architect", "implementation", "testing",
                     "review", "documentation", "debugger"]
        });
        vec![
            Tool {
                name: "boomerang_send".to_string(),
                description: "Resubmit a task's work with refinement feedback".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "task_id": { "type": "string" },
                        "feedback": { "type": "string" },
                        "type": agent_type_schema
                    },
                    "required": ["task_id", "feedback", "type"]
                }),
            },
            Tool {
                name: "boomerang_history".to_string(),
                description: "Iteration history of a boomerang cycle".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "task_id": { "type": "string" } },
                    "required": ["task_id"]
                }),
            },
        ]
    }
}

#[async_trait]
impl ToolPort for SwarmToolHandler {
    async fn list_tools(&self) -> anyhow::Result<Vec<Tool>> {
        let mut tools = Self::swarm_tools();
        if self.sparc.is_some() {
            tools.extend(Self::sparc_tools());
        }
        if self.boomerang.is_some() {
            tools.extend(Self::boomerang_tools());
        }
        Ok(tools)
    }

    async fn execute_tool(&self, name: &str, args: Value) -> anyhow::Result<Value> {
        match name {
            "agent_create" => {
                let agent_type = parse_agent_type(&args, "type")?;
                let agent = self.manager.create_agent(agent_type).await?;
                Ok(serde_json::to_value(agent)?)
            }
            "agent_get" => {
                let id = AgentId::parse(require_str(&args, "id")?)?;
                let agent = self.manager.get_agent(id).await?;
                Ok(serde_json::to_value(agent)?)
            }
            "agent_list" => {
                let type_filter = parse_optional::<AgentType>(&args, "type")?;
                let status_filter = parse_optional::<AgentStatus>(&args, "status")?;
                let agents = self.manager.list_agents(type_filter, status_filter).await;
                Ok(serde_json::to_value(agents)?)
            }
            "task_create" => {
                let description = require_str(&args, "description")?;
                let agent_type = parse_agent_type(&args, "type")?;
                let priority = args
                    .get("priority")
                    .and_then(Value::as_i64)
                    .unwrap_or(0) as i32;
                let dependencies = match args.get("dependencies") {
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|v| {
                            v.as_str()
                                .ok_or_else(|| anyhow::anyhow!("dependency ids must be strings"))
                                .and_then(|s| Ok(TaskId::parse(s)?))
                        })
                        .collect::<anyhow::Result<Vec<_>>>()?,
                    _ => Vec::new(),
                };
                let task = self
                    .manager
                    .create_task(description, agent_type, priority, dependencies)
                    .await;
                Ok(serde_json::to_value(task)?)
            }
            "task_get" => {
                let id = TaskId::parse(require_str(&args, "id")?)?;
                let task = self.manager.get_task(id).await?;
                Ok(serde_json::to_value(task)?)
            }
            "task_list" => {
                let status_filter = parse_optional::<TaskStatus>(&args, "status")?;
                let type_filter = parse_optional::<AgentType>(&args, "type")?;
                let tasks = self.manager.list_tasks(status_filter, type_filter).await;
                Ok(serde_json::to_value(tasks)?)
            }
            "task_assign" => {
                let id = TaskId::parse(require_str(&args, "id")?)?;
                let outcome = self.manager.assign_task(id).await?;
                Ok(json!({ "outcome": format!("{:?}", outcome) }))
            }
            "task_start" => {
                let id = TaskId::parse(require_str(&args, "id")?)?;
                self.manager.start_task(id).await?;
                Ok(json!({ "started": true }))
            }
            "task_complete" => {
                let id = TaskId::parse(require_str(&args, "id")?)?;
                let result = args.get("result").cloned().unwrap_or(Value::Null);
                self.manager.complete_task(id, result).await?;
                Ok(json!({ "completed": true }))
            }
            "task_fail" => {
                let id = TaskId::parse(require_str(&args, "id")?)?;
                let error = require_str(&args, "error")?;
                self.manager.fail_task(id, error).await?;
                Ok(json!({ "failed": true }))
            }
            "task_cancel" => {
                let id = TaskId::parse(require_str(&args, "id")?)?;
                self.manager.cancel_task(id).await?;
                Ok(json!({ "cancelled": true }))
            }
            "queue_process" => {
                let assigned = self.manager.process_queue().await;
                Ok(json!({ "assigned": assigned }))
            }
            "swarm_stats" => {
                let stats = self.manager.stats().await;
                Ok(serde_json::to_value(stats)?)
            }
            "sparc_create" => {
                let engine = self
                    .sparc
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("SPARC workflows are disabled"))?;
                let task_id = TaskId::parse(require_str(&args, "task_id")?)?;
                let description = require_str(&args, "description")?;
                // the originating task must exist before a workflow wraps it
                self.manager.get_task(task_id).await?;
                let workflow = engine.create_workflow(task_id, description).await;
                Ok(serde_json::to_value(workflow)?)
            }
            "sparc_start" => {
                let engine = self
                    .sparc
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("SPARC workflows are disabled"))?;
                let workflow_id = require_str(&args, "workflow_id")?;
                engine.start_workflow(workflow_id).await?;
                Ok(json!({ "started": true }))
            }
            "sparc_status" => {
                let engine = self
                    .sparc
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("SPARC workflows are disabled"))?;
                let workflow_id = require_str(&args, "workflow_id")?;
                let report = engine.workflow_status(workflow_id).await?;
                Ok(serde_json::to_value(report)?)
            }
            "boomerang_send" => {
                let coordinator = self
                    .boomerang
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("Boomerang refinement is disabled"))?;
                let task_id = TaskId::parse(require_str(&args, "task_id")?)?;
                let feedback = require_str(&args, "feedback")?;
                let agent_type = parse_agent_type(&args, "type")?;
                let iteration = coordinator
                    .send_boomerang(task_id, feedback, agent_type)
                    .await?;
                Ok(serde_json::to_value(iteration)?)
            }
            "boomerang_history" => {
                let coordinator = self
                    .boomerang
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("Boomerang refinement is disabled"))?;
                let task_id = TaskId::parse(require_str(&args, "task_id")?)?;
                let cycle = coordinator.history(task_id).await?;
                Ok(serde_json::to_value(cycle)?)
            }
            _ => Err(anyhow::anyhow!("Tool not found: {}", name)),
        }
    }
}

fn require_str<'a>(args: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("missing required string argument '{}'", key))
}

fn parse_agent_type(args: &Value, key: &str) -> anyhow::Result<AgentType> {
    let value = args
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("missing required argument '{}'", key))?;
    Ok(serde_json::from_value(value.clone())?)
}

fn parse_optional<T: serde::de::DeserializeOwned>(
    args: &Value,
    key: &str,
) -> anyhow::Result<Option<T>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
    }
}

#[cfg(test)]
#[path = "tool_handler_test.rs"]
mod tests;
