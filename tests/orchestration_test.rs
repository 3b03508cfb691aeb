//! End-to-end orchestration: tasks, workflows and boomerang cycles driven
//! through the public engine API with a stub runner in place of the
//! generation provider.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use myrmidon::adapters::tool_handler::SwarmToolHandler;
use myrmidon::domain::ToolPort;
use myrmidon::swarm::boomerang::BoomerangCoordinator;
use myrmidon::swarm::config::{BoomerangSettings, SparcSettings, SwarmSettings};
use myrmidon::swarm::domain::{Agent, AgentType, Task, TaskStatus};
use myrmidon::swarm::error::SwarmResult;
use myrmidon::swarm::executor::TaskRunner;
use myrmidon::swarm::manager::SwarmManager;
use myrmidon::swarm::sparc::{SparcEngine, WorkflowStatus};

struct StubRunner;

#[async_trait]
impl TaskRunner for StubRunner {
    async fn run(&self, agent: &Agent, task: &Task) -> SwarmResult<String> {
        Ok(format!(
            "[{}] {}",
            agent.agent_type,
            task.description.lines().next().unwrap_or("")
        ))
    }
}

fn stack() -> (
    Arc<SwarmManager>,
    Arc<SparcEngine>,
    Arc<BoomerangCoordinator>,
) {
    let manager = Arc::new(SwarmManager::new(&SwarmSettings::default()));
    let runner: Arc<dyn TaskRunner> = Arc::new(StubRunner);
    let sparc = Arc::new(SparcEngine::new(
        manager.clone(),
        runner.clone(),
        SparcSettings::default(),
    ));
    let boomerang = Arc::new(BoomerangCoordinator::new(
        manager.clone(),
        runner,
        &BoomerangSettings::default(),
    ));
    (manager, sparc, boomerang)
}

#[tokio::test]
async fn workflow_then_boomerang_refinement() {
    let (manager, sparc, boomerang) = stack();

    let origin = manager
        .create_task(
            "implement rate limiting middleware",
            AgentType::Implementation,
            7,
            vec![],
        )
        .await;

    let workflow = sparc
        .create_workflow(origin.id, "implement rate limiting middleware")
        .await;
    sparc.start_workflow(&workflow.id).await.unwrap();
    assert_eq!(
        sparc.wait_for_terminal(&workflow.id).await.unwrap(),
        WorkflowStatus::Completed
    );

    let workflow = sparc.get_workflow(&workflow.id).await.unwrap();
    let aggregate = workflow.final_result.unwrap();
    assert!(aggregate.contains("## specification"));
    assert!(aggregate.contains("## completion"));

    // refine the original work with feedback
    let iteration = boomerang
        .send_boomerang(origin.id, "handle burst traffic", AgentType::Implementation)
        .await
        .unwrap();
    assert_eq!(iteration.iteration, 1);
    assert!(iteration.result.unwrap().starts_with("[implementation]"));

    // the refinement ran as a real swarm task
    let refinement_task = manager.get_task(iteration.task_id).await.unwrap();
    assert_eq!(refinement_task.status, TaskStatus::Completed);

    // every agent is back to idle once the dust settles
    let stats = manager.stats().await;
    assert_eq!(stats.agents.busy, 0);
}

#[tokio::test]
async fn two_workflows_share_agent_pools_independently() {
    let (manager, sparc, _boomerang) = stack();

    let first_task = manager
        .create_task("service A", AgentType::Implementation, 5, vec![])
        .await;
    let second_task = manager
        .create_task("service B", AgentType::Implementation, 5, vec![])
        .await;

    let first = sparc.create_workflow(first_task.id, "service A").await;
    let second = sparc.create_workflow(second_task.id, "service B").await;

    sparc.start_workflow(&first.id).await.unwrap();
    sparc.start_workflow(&second.id).await.unwrap();

    assert_eq!(
        sparc.wait_for_terminal(&first.id).await.unwrap(),
        WorkflowStatus::Completed
    );
    assert_eq!(
        sparc.wait_for_terminal(&second.id).await.unwrap(),
        WorkflowStatus::Completed
    );

    // both origin tasks are still pending; the workflows ran their own tasks
    assert_eq!(
        manager.get_task(first_task.id).await.unwrap().status,
        TaskStatus::Pending
    );
}

#[tokio::test]
async fn tool_surface_drives_a_full_workflow() {
    let (manager, sparc, boomerang) = stack();
    let tools = SwarmToolHandler::new(manager.clone(), Some(sparc.clone()), Some(boomerang));

    let created = tools
        .execute_tool(
            "task_create",
            json!({"description": "ship the feature", "type": "implementation"}),
        )
        .await
        .unwrap();
    let task_id = created["id"].as_str().unwrap();

    let workflow = tools
        .execute_tool(
            "sparc_create",
            json!({"task_id": task_id, "description": "ship the feature"}),
        )
        .await
        .unwrap();
    let workflow_id = workflow["id"].as_str().unwrap().to_string();

    tools
        .execute_tool("sparc_start", json!({"workflow_id": workflow_id}))
        .await
        .unwrap();
    sparc.wait_for_terminal(&workflow_id).await.unwrap();

    let report = tools
        .execute_tool("sparc_status", json!({"workflow_id": workflow_id}))
        .await
        .unwrap();
    assert_eq!(report["status"], "completed");
    assert!(report["phases"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["status"] == "completed"));
}
