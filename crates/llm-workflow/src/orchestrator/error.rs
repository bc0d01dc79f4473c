//! Error types for orchestrator operations.

use crate::agent::AgentError;
use thiserror::Error;

/// Errors that can occur while planning or executing a workflow.
///
/// [`WorkflowOrchestrator::run`](super::WorkflowOrchestrator::run) never
/// returns these; it folds them into a failed
/// [`WorkflowResult`](super::WorkflowResult).
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The objective was empty or whitespace.
    #[error("Objective must not be empty")]
    EmptyObjective,

    /// Decomposing the objective into tasks failed.
    #[error("Decomposition failed: {0}")]
    Decomposition(#[source] AgentError),

    /// A task's delegated execution failed.
    #[error("Task '{task_id}' failed: {source}")]
    Execution {
        task_id: String,
        #[source]
        source: AgentError,
    },

    /// A full scan made no progress while tasks were still pending.
    ///
    /// Raised for cyclic plans and for dependencies naming a task that will
    /// never complete.
    #[error("Dependency cycle: no progress possible for pending tasks {pending:?}")]
    DependencyCycle { pending: Vec<String> },

    /// Up-front plan validation failed.
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// A concurrently executing task panicked or was cancelled.
    #[error("Task join error: {0}")]
    TaskJoin(String),
}

impl OrchestratorError {
    /// The task that triggered this error, if any.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            OrchestratorError::Execution { task_id, .. } => Some(task_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_message_names_task() {
        let err = OrchestratorError::Execution {
            task_id: "summarize".to_string(),
            source: AgentError::RateLimited("429 Too Many Requests".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Task 'summarize' failed: Rate limited: 429 Too Many Requests"
        );
        assert_eq!(err.task_id(), Some("summarize"));
    }

    #[test]
    fn test_cycle_error_lists_pending() {
        let err = OrchestratorError::DependencyCycle {
            pending: vec!["a".to_string(), "b".to_string()],
        };
        assert!(err.to_string().contains(r#"["a", "b"]"#));
        assert_eq!(err.task_id(), None);
    }
}
