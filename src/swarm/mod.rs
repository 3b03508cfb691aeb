//! Agent swarm coordination
//!
//! This is the core of the crate: typed agent pools, a task registry with a
//! strict lifecycle state machine, load-balanced assignment, SPARC workflow
//! sequencing, and boomerang refinement cycles. The [`manager::SwarmManager`]
//! owns all mutable agent/task state; every other component here operates
//! through it by id.

pub mod balancer;
pub mod boomerang;
pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod generate;
pub mod manager;
pub mod sparc;

pub use balancer::LoadBalanceStrategy;
pub use boomerang::{BoomerangCoordinator, BoomerangCycle, BoomerangIteration};
pub use config::{BoomerangSettings, GenerationConfig, SparcSettings, SwarmSettings};
pub use domain::{Agent, AgentId, AgentStatus, AgentType, Task, TaskId, TaskStatus};
pub use error::{GenerationError, SwarmError, SwarmResult};
pub use executor::{RolePromptExecutor, TaskRunner};
pub use manager::{AssignOutcome, SwarmManager, SwarmStats};
pub use sparc::{SparcEngine, SparcPhase, SparcWorkflow, WorkflowStatus};
