//! Orchestrator - dependency-ordered execution of a decomposed objective.
//!
//! A run has two phases. First the objective is decomposed into a
//! [`WorkflowPlan`]: a list of [`Task`]s, each naming the tasks it depends on.
//! Then the plan is executed in scans. A scan runs every task that was
//! eligible when it began, and scans repeat until every task is completed.
//! Results are collected per task id into a [`WorkflowResult`].
//!
//! Both decomposition and task execution are delegated through
//! [`WorkflowCapability`], so the orchestrator can be driven by a real model
//! (via [`AgentCapability`]) or by a deterministic fake.
//!
//! # Failure handling
//!
//! Nothing is retried. The first failure ends the run, and
//! [`WorkflowOrchestrator::run`] reports it as a failed result without any
//! partial output. A plan whose remaining tasks can never become eligible
//! (a cycle, or a dependency naming no task) fails with
//! [`OrchestratorError::DependencyCycle`] instead of looping.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use llm_workflow::orchestrator::{
//!     AgentCapability, ExecutionMode, OrchestratorConfig, WorkflowOrchestrator,
//! };
//!
//! let orchestrator = WorkflowOrchestrator::new(Arc::new(AgentCapability::new(my_agent)))
//!     .with_config(OrchestratorConfig::new().with_mode(ExecutionMode::Concurrent));
//!
//! let result = orchestrator.run("Write a blog post about Rust").await;
//! println!("{:#?}", result.results);
//! ```

pub mod capability;
pub mod config;
pub mod dependency_graph;
pub mod error;
pub mod observer;
pub mod plan;
mod prompts;
pub mod result;
pub mod workflow_orchestrator;

pub use capability::{AgentCapability, WorkflowCapability};
pub use config::{ExecutionMode, OrchestratorConfig};
pub use dependency_graph::DependencyGraph;
pub use error::OrchestratorError;
pub use observer::{
    EventLevel, NoopObserver, RecordingObserver, TracingObserver, WorkflowEvent, WorkflowObserver,
};
pub use plan::{Task, TaskStatus, WorkflowPlan, WorkflowStage};
pub use result::{FAILED_WORKFLOW_ID, WorkflowResult};
pub use workflow_orchestrator::WorkflowOrchestrator;
