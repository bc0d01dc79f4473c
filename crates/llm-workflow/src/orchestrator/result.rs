use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Id reported when no plan could be created.
pub const FAILED_WORKFLOW_ID: &str = "failed";

/// Outcome of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    /// Plan id, or [`FAILED_WORKFLOW_ID`] when planning failed
    pub workflow_id: String,
    /// Final execution status
    pub success: bool,
    /// Output per task id; empty on failure
    pub results: HashMap<String, String>,
    /// Wall-clock time of the run including planning; 0 on failure
    pub execution_time_ms: u64,
    /// Error message if failed
    pub error_message: Option<String>,
}

impl WorkflowResult {
    /// Creates a successful result
    pub fn success(
        workflow_id: impl Into<String>,
        results: HashMap<String, String>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            success: true,
            results,
            execution_time_ms,
            error_message: None,
        }
    }

    /// Creates a failed result. Partial results are never carried.
    pub fn failure(workflow_id: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            workflow_id: workflow_id.into(),
            success: false,
            results: HashMap::new(),
            execution_time_ms: 0,
            error_message: Some(if error.trim().is_empty() {
                "Workflow failed".to_string()
            } else {
                error
            }),
        }
    }

    pub fn result(&self, task_id: &str) -> Option<&str> {
        self.results.get(task_id).map(String::as_str)
    }
}
