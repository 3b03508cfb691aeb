use super::*;
use crate::swarm::config::{BoomerangSettings, SparcSettings, SwarmSettings};
use crate::swarm::domain::{Agent, Task};
use crate::swarm::error::SwarmResult;
use crate::swarm::executor::TaskRunner;

struct EchoRunner;

#[async_trait]
impl TaskRunner for EchoRunner {
    async fn run(&self, _agent: &Agent, task: &Task) -> SwarmResult<String> {
        Ok(format!("echo: {}", task.description))
    }
}

fn handler() -> SwarmToolHandler {
    let manager = Arc::new(SwarmManager::new(&SwarmSettings::default()));
    let runner: Arc<dyn TaskRunner> = Arc::new(EchoRunner);
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
    SwarmToolHandler::new(manager, Some(sparc), Some(boomerang))
}

#[tokio::test]
async fn catalog_lists_every_operation() {
    let handler = handler();
    let tools = handler.list_tools().await.unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();

    for expected in [
        "agent_create",
        "agent_list",
        "task_create",
        "task_assign",
        "task_complete",
        "queue_process",
        "swarm_stats",
        "sparc_create",
        "sparc_start",
        "sparc_status",
        "boomerang_send",
        "boomerang_history",
    ] {
        assert!(names.contains(&expected), "missing tool {}", expected);
    }
}

#[tokio::test]
async fn disabled_subsystems_hide_their_tools() {
    let manager = Arc::new(SwarmManager::new(&SwarmSettings::default()));
    let handler = SwarmToolHandler::new(manager, None, None);

    let tools = handler.list_tools().await.unwrap();
    assert!(tools.iter().all(|t| !t.name.starts_with("sparc_")));
    assert!(tools.iter().all(|t| !t.name.starts_with("boomerang_")));

    let err = handler
        .execute_tool("sparc_start", json!({"workflow_id": "sparc-x"}))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("disabled"));
}

#[tokio::test]
async fn task_lifecycle_through_tools() {
    let handler = handler();

    let created = handler
        .execute_tool(
            "task_create",
            json!({"description": "index the corpus", "type": "research", "priority": 2}),
        )
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let assigned = handler
        .execute_tool("task_assign", json!({ "id": id }))
        .await
        .unwrap();
    assert_eq!(assigned["outcome"], "Assigned");

    handler
        .execute_tool("task_start", json!({ "id": id }))
        .await
        .unwrap();
    handler
        .execute_tool("task_complete", json!({ "id": id, "result": "indexed" }))
        .await
        .unwrap();

    let fetched = handler
        .execute_tool("task_get", json!({ "id": id }))
        .await
        .unwrap();
    assert_eq!(fetched["status"], "completed");
    assert_eq!(fetched["result"], "indexed");
}

#[tokio::test]
async fn invalid_arguments_are_rejected() {
    let handler = handler();

    let err = handler
        .execute_tool("task_create", json!({"description": "missing role"}))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("type"));

    let err = handler
        .execute_tool("task_get", json!({"id": "not-a-uuid"}))
        .await
        .unwrap_err();
    assert!(!err.to_string().is_empty());

    let err = handler
        .execute_tool("unknown_tool", json!({}))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Tool not found"));
}

#[tokio::test]
async fn stats_tool_reports_counts() {
    let handler = handler();
    handler
        .execute_tool(
            "task_create",
            json!({"description": "count me", "type": "testing"}),
        )
        .await
        .unwrap();

    let stats = handler.execute_tool("swarm_stats", json!({})).await.unwrap();
    assert_eq!(stats["tasks"]["pending"], 1);
    assert_eq!(stats["queue_depth"], 1);
}
