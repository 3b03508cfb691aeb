use super::*;
use crate::swarm::config::SwarmSettings;
use serde_json::json;

fn settings_with(types: Vec<AgentType>, cap: usize) -> SwarmSettings {
    SwarmSettings {
        max_agents_per_type: cap,
        default_agent_types: types,
        load_balance_strategy: LoadBalanceStrategy::LeastLoaded,
    }
}

fn manager() -> SwarmManager {
    SwarmManager::new(&settings_with(vec![AgentType::Research], 3))
}

#[tokio::test]
async fn default_agents_are_created_idle() {
    let manager = SwarmManager::new(&settings_with(
        vec![AgentType::Research, AgentType::Testing],
        10,
    ));
    let agents = manager.list_agents(None, None).await;
    assert_eq!(agents.len(), 2);
    assert!(agents.iter().all(|a| a.status == AgentStatus::Idle));
    assert!(agents.iter().all(|a| a.current_task.is_none()));
}

#[tokio::test]
async fn pool_capacity_is_enforced() {
    let manager = SwarmManager::new(&settings_with(vec![], 2));
    manager.create_agent(AgentType::Review).await.unwrap();
    manager.create_agent(AgentType::Review).await.unwrap();

    let err = manager.create_agent(AgentType::Review).await.unwrap_err();
    assert!(matches!(err, SwarmError::PoolExhausted { limit: 2, .. }));
    assert_eq!(
        manager.list_agents(Some(AgentType::Review), None).await.len(),
        2
    );
}

#[tokio::test]
async fn task_round_trip_updates_agent_stats() {
    let manager = manager();
    let task = manager
        .create_task("summarize findings", AgentType::Research, 5, vec![])
        .await;

    assert_eq!(
        manager.assign_task(task.id).await.unwrap(),
        AssignOutcome::Assigned
    );
    manager.start_task(task.id).await.unwrap();
    manager
        .complete_task(task.id, json!("done"))
        .await
        .unwrap();

    let task = manager.get_task(task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result, Some(json!("done")));
    assert!(task.completed_at.is_some());

    let agent = manager.get_agent(task.agent_id.unwrap()).await.unwrap();
    assert_eq!(agent.status, AgentStatus::Idle);
    assert!(agent.current_task.is_none());
    assert_eq!(agent.stats.tasks_completed, 1);
}

#[tokio::test]
async fn out_of_order_transitions_are_rejected() {
    let manager = manager();
    let task = manager
        .create_task("early start", AgentType::Research, 1, vec![])
        .await;

    // running before assigned
    let err = manager.start_task(task.id).await.unwrap_err();
    assert!(matches!(
        err,
        SwarmError::Precondition {
            expected: TaskStatus::Assigned,
            actual: TaskStatus::Pending,
            ..
        }
    ));

    // completing before running
    let err = manager.complete_task(task.id, json!(null)).await.unwrap_err();
    assert!(matches!(
        err,
        SwarmError::Precondition {
            expected: TaskStatus::Running,
            ..
        }
    ));

    // state unchanged by the rejected calls
    let task = manager.get_task(task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
}

#[tokio::test]
async fn assigning_twice_is_a_precondition_error() {
    let manager = manager();
    let task = manager
        .create_task("one shot", AgentType::Research, 1, vec![])
        .await;
    manager.assign_task(task.id).await.unwrap();

    let err = manager.assign_task(task.id).await.unwrap_err();
    assert!(matches!(
        err,
        SwarmError::Precondition {
            expected: TaskStatus::Pending,
            actual: TaskStatus::Assigned,
            ..
        }
    ));
}

#[tokio::test]
async fn busy_iff_current_task_is_set() {
    let manager = manager();
    let task = manager
        .create_task("invariant check", AgentType::Research, 1, vec![])
        .await;
    manager.assign_task(task.id).await.unwrap();

    for agent in manager.list_agents(None, None).await {
        assert_eq!(agent.status == AgentStatus::Busy, agent.current_task.is_some());
    }

    manager.start_task(task.id).await.unwrap();
    manager.fail_task(task.id, "boom").await.unwrap();

    for agent in manager.list_agents(None, None).await {
        assert_eq!(agent.status == AgentStatus::Busy, agent.current_task.is_some());
    }
}

#[tokio::test]
async fn no_idle_agent_leaves_task_pending() {
    let manager = manager();
    let first = manager
        .create_task("takes the only agent", AgentType::Research, 1, vec![])
        .await;
    manager.assign_task(first.id).await.unwrap();

    let second = manager
        .create_task("has to wait", AgentType::Research, 1, vec![])
        .await;
    assert_eq!(
        manager.assign_task(second.id).await.unwrap(),
        AssignOutcome::NoAgentAvailable
    );
    let second = manager.get_task(second.id).await.unwrap();
    assert_eq!(second.status, TaskStatus::Pending);
}

#[tokio::test]
async fn fail_task_records_error_and_counts() {
    let manager = manager();
    let task = manager
        .create_task("doomed", AgentType::Research, 1, vec![])
        .await;
    manager.assign_task(task.id).await.unwrap();
    manager.start_task(task.id).await.unwrap();
    manager.fail_task(task.id, "provider unreachable").await.unwrap();

    let task = manager.get_task(task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("provider unreachable"));

    let agent = manager.get_agent(task.agent_id.unwrap()).await.unwrap();
    assert_eq!(agent.stats.tasks_failed, 1);
    assert_eq!(agent.status, AgentStatus::Idle);

    // failing a terminal task is rejected
    let err = manager.fail_task(task.id, "again").await.unwrap_err();
    assert!(matches!(err, SwarmError::Precondition { .. }));
}

#[tokio::test]
async fn cancel_releases_held_agent() {
    let manager = manager();
    let task = manager
        .create_task("cancelled mid-flight", AgentType::Research, 1, vec![])
        .await;
    manager.assign_task(task.id).await.unwrap();
    let agent_id = manager.get_task(task.id).await.unwrap().agent_id.unwrap();

    manager.cancel_task(task.id).await.unwrap();

    let task = manager.get_task(task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert!(task.completed_at.is_some());
    let agent = manager.get_agent(agent_id).await.unwrap();
    assert_eq!(agent.status, AgentStatus::Idle);
    assert!(agent.current_task.is_none());
}

#[tokio::test]
async fn process_queue_assigns_waiting_tasks_and_is_idempotent() {
    let manager = manager();
    let first = manager
        .create_task("holds the agent", AgentType::Research, 1, vec![])
        .await;
    manager.assign_task(first.id).await.unwrap();
    manager.start_task(first.id).await.unwrap();

    let waiting = manager
        .create_task("queued behind", AgentType::Research, 1, vec![])
        .await;
    assert_eq!(manager.process_queue().await, 0);

    manager.complete_task(first.id, json!("ok")).await.unwrap();
    assert_eq!(manager.process_queue().await, 1);
    assert_eq!(
        manager.get_task(waiting.id).await.unwrap().status,
        TaskStatus::Assigned
    );

    // second sweep with no new capacity assigns nothing
    assert_eq!(manager.process_queue().await, 0);
}

#[tokio::test]
async fn dependencies_gate_assignment() {
    let manager = SwarmManager::new(&settings_with(
        vec![AgentType::Research, AgentType::Implementation],
        10,
    ));
    let dep = manager
        .create_task("produce analysis", AgentType::Research, 1, vec![])
        .await;
    let dependent = manager
        .create_task("build on analysis", AgentType::Implementation, 1, vec![dep.id])
        .await;

    assert_eq!(
        manager.assign_task(dependent.id).await.unwrap(),
        AssignOutcome::WaitingOnDependencies
    );
    assert_eq!(
        manager.get_task(dependent.id).await.unwrap().status,
        TaskStatus::Pending
    );

    manager.assign_task(dep.id).await.unwrap();
    manager.start_task(dep.id).await.unwrap();
    manager.complete_task(dep.id, json!("analysis")).await.unwrap();

    assert_eq!(
        manager.assign_task(dependent.id).await.unwrap(),
        AssignOutcome::Assigned
    );
}

#[tokio::test]
async fn failed_dependency_fails_dependent_task() {
    let manager = SwarmManager::new(&settings_with(
        vec![AgentType::Research, AgentType::Implementation],
        10,
    ));
    let dep = manager
        .create_task("will fail", AgentType::Research, 1, vec![])
        .await;
    let dependent = manager
        .create_task("never runs", AgentType::Implementation, 1, vec![dep.id])
        .await;

    manager.assign_task(dep.id).await.unwrap();
    manager.start_task(dep.id).await.unwrap();
    manager.fail_task(dep.id, "bad input").await.unwrap();

    assert_eq!(
        manager.assign_task(dependent.id).await.unwrap(),
        AssignOutcome::DependencyFailed
    );
    let dependent = manager.get_task(dependent.id).await.unwrap();
    assert_eq!(dependent.status, TaskStatus::Failed);
    assert!(dependent.error.unwrap().contains("dependency"));
}

#[tokio::test]
async fn least_loaded_prefers_fresh_agent() {
    let manager = SwarmManager::new(&settings_with(vec![], 10));
    let veteran = manager.create_agent(AgentType::Research).await.unwrap();

    // give the veteran two completions while it is the only agent
    for _ in 0..2 {
        let task = manager
            .create_task("warm up", AgentType::Research, 1, vec![])
            .await;
        manager.assign_task(task.id).await.unwrap();
        manager.start_task(task.id).await.unwrap();
        manager.complete_task(task.id, json!("ok")).await.unwrap();
    }
    assert_eq!(
        manager.get_agent(veteran.id).await.unwrap().stats.tasks_completed,
        2
    );

    let fresh = manager.create_agent(AgentType::Research).await.unwrap();
    let task = manager
        .create_task("goes to the least loaded", AgentType::Research, 1, vec![])
        .await;
    manager.assign_task(task.id).await.unwrap();
    assert_eq!(
        manager.get_task(task.id).await.unwrap().agent_id,
        Some(fresh.id)
    );
}

#[tokio::test]
async fn stats_reflect_registries() {
    let manager = manager();
    let task = manager
        .create_task("counted", AgentType::Research, 1, vec![])
        .await;
    manager.assign_task(task.id).await.unwrap();

    let stats = manager.stats().await;
    assert_eq!(stats.tasks.assigned, 1);
    assert_eq!(stats.agents.busy, 1);
    assert_eq!(stats.queue_depth, 0);
}
