//! Idle-agent selection strategies
//!
//! When a pending task is assigned, the manager asks the balancer for an idle
//! agent from the pool matching the task's role. If the pool has no idle
//! member the balancer returns `None` and the task stays pending; that is a
//! soft condition, not an error.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::domain::{Agent, AgentId};

/// Policy used to pick an idle agent from a role's pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalanceStrategy {
    /// First idle agent in pool order
    RoundRobin,
    /// Idle agent with the fewest completed tasks; ties broken by pool order
    #[default]
    LeastLoaded,
    /// Uniformly random idle agent
    Random,
}

impl std::fmt::Display for LoadBalanceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadBalanceStrategy::RoundRobin => write!(f, "round_robin"),
            LoadBalanceStrategy::LeastLoaded => write!(f, "least_loaded"),
            LoadBalanceStrategy::Random => write!(f, "random"),
        }
    }
}

impl LoadBalanceStrategy {
    /// Select an idle agent from `pool` (ids in creation order)
    ///
    /// Returns `None` when no pool member is idle.
    pub fn select(
        &self,
        pool: &[AgentId],
        agents: &HashMap<AgentId, Agent>,
    ) -> Option<AgentId> {
        let idle: Vec<&Agent> = pool
            .iter()
            .filter_map(|id| agents.get(id))
            .filter(|a| a.is_idle())
            .collect();

        match self {
            LoadBalanceStrategy::RoundRobin => idle.first().map(|a| a.id),
            LoadBalanceStrategy::LeastLoaded => idle
                .iter()
                .min_by_key(|a| a.stats.tasks_completed)
                .map(|a| a.id),
            LoadBalanceStrategy::Random => {
                idle.choose(&mut rand::thread_rng()).map(|a| a.id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::domain::{AgentStatus, AgentType};

    fn pool_of(agents: Vec<Agent>) -> (Vec<AgentId>, HashMap<AgentId, Agent>) {
        let ids = agents.iter().map(|a| a.id).collect();
        let map = agents.into_iter().map(|a| (a.id, a)).collect();
        (ids, map)
    }

    #[test]
    fn least_loaded_picks_fewest_completions() {
        let mut a = Agent::new(AgentType::Research);
        let mut b = Agent::new(AgentType::Research);
        let mut c = Agent::new(AgentType::Research);
        a.stats.tasks_completed = 2;
        b.stats.tasks_completed = 0;
        c.stats.tasks_completed = 5;
        let expected = b.id;
        let (ids, map) = pool_of(vec![a, b, c]);

        let picked = LoadBalanceStrategy::LeastLoaded.select(&ids, &map);
        assert_eq!(picked, Some(expected));
    }

    #[test]
    fn round_robin_picks_first_idle() {
        let mut a = Agent::new(AgentType::Testing);
        a.status = AgentStatus::Busy;
        let b = Agent::new(AgentType::Testing);
        let c = Agent::new(AgentType::Testing);
        let expected = b.id;
        let (ids, map) = pool_of(vec![a, b, c]);

        let picked = LoadBalanceStrategy::RoundRobin.select(&ids, &map);
        assert_eq!(picked, Some(expected));
    }

    #[test]
    fn no_idle_agent_yields_none() {
        let mut a = Agent::new(AgentType::Review);
        a.status = AgentStatus::Busy;
        let mut b = Agent::new(AgentType::Review);
        b.status = AgentStatus::Maintenance;
        let (ids, map) = pool_of(vec![a, b]);

        for strategy in [
            LoadBalanceStrategy::RoundRobin,
            LoadBalanceStrategy::LeastLoaded,
            LoadBalanceStrategy::Random,
        ] {
            assert_eq!(strategy.select(&ids, &map), None);
        }
    }

    #[test]
    fn random_only_returns_idle_members() {
        let mut a = Agent::new(AgentType::Architect);
        a.status = AgentStatus::Busy;
        let b = Agent::new(AgentType::Architect);
        let expected = b.id;
        let (ids, map) = pool_of(vec![a, b]);

        for _ in 0..16 {
            assert_eq!(
                LoadBalanceStrategy::Random.select(&ids, &map),
                Some(expected)
            );
        }
    }
}
