//! bqp-core - Core library for bqport
//!
//! This crate provides resource identifiers and the path mapping, project
//! configuration, SQL file discovery, the dependency DAG with deterministic
//! topological sorting, the task primitive, the deployment planner, and the
//! task scheduler used across all bqport components.

pub mod config;
pub mod dag;
pub mod error;
pub mod plan;
pub mod project;
pub mod resource;
pub mod schedule;
pub mod task;

pub use config::Config;
pub use dag::ResourceDag;
pub use error::{CoreError, CoreResult};
pub use plan::{DeployPlan, FileAnalysis, FileJob, PlanNode, StatementCategory};
pub use project::LocalFile;
pub use resource::{ResourceId, ResourceKind};
pub use task::{Task, TaskStatus};
