//! Configuration for orchestrator execution behavior.

use serde::{Deserialize, Serialize};

/// How eligible tasks are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Repeated scans over the task list; one task in flight at a time.
    #[default]
    Sequential,
    /// Every newly eligible task is launched immediately; the loop waits for
    /// any in-flight task to finish before looking for more work.
    Concurrent,
}

/// Configuration for [`WorkflowOrchestrator`](super::WorkflowOrchestrator).
///
/// # Examples
///
/// ```
/// use llm_workflow::orchestrator::{ExecutionMode, OrchestratorConfig};
///
/// let config = OrchestratorConfig::new()
///     .with_mode(ExecutionMode::Concurrent)
///     .with_max_concurrent_tasks(4)
///     .with_dependency_validation();
///
/// assert_eq!(config.max_concurrent_tasks, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Dispatch strategy.
    ///
    /// **Default:** `Sequential`
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Upper bound on in-flight tasks in `Concurrent` mode.
    ///
    /// `None` launches every eligible task at once. Ignored in `Sequential`
    /// mode. A value of `0` is treated as `1`.
    #[serde(default)]
    pub max_concurrent_tasks: Option<usize>,

    /// Validate the plan (unique ids, known dependencies, no cycles) before
    /// executing anything.
    ///
    /// Without it, an unrunnable plan is still caught, but only once a scan
    /// completes without progress, and possibly after some tasks have run.
    ///
    /// **Default:** `false`
    #[serde(default)]
    pub validate_dependencies: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            max_concurrent_tasks: None,
            validate_dependencies: false,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_concurrent_tasks(mut self, max: usize) -> Self {
        self.max_concurrent_tasks = Some(max);
        self
    }

    pub fn with_unlimited_concurrency(mut self) -> Self {
        self.max_concurrent_tasks = None;
        self
    }

    pub fn with_dependency_validation(mut self) -> Self {
        self.validate_dependencies = true;
        self
    }

    /// Effective in-flight limit for concurrent dispatch.
    pub(crate) fn concurrency_limit(&self) -> usize {
        self.max_concurrent_tasks.map_or(usize::MAX, |max| max.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert_eq!(config.max_concurrent_tasks, None);
        assert!(!config.validate_dependencies);
        assert_eq!(config.concurrency_limit(), usize::MAX);
    }

    #[test]
    fn test_zero_limit_means_one() {
        let config = OrchestratorConfig::new().with_max_concurrent_tasks(0);
        assert_eq!(config.concurrency_limit(), 1);
    }

    #[test]
    fn test_unlimited_clears_limit() {
        let config = OrchestratorConfig::new()
            .with_max_concurrent_tasks(3)
            .with_unlimited_concurrency();
        assert_eq!(config.max_concurrent_tasks, None);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: OrchestratorConfig =
            serde_json::from_str(r#"{"mode": "concurrent", "max_concurrent_tasks": 2}"#).unwrap();
        assert_eq!(config.mode, ExecutionMode::Concurrent);
        assert_eq!(config.max_concurrent_tasks, Some(2));
        assert!(!config.validate_dependencies);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = OrchestratorConfig::new()
            .with_mode(ExecutionMode::Concurrent)
            .with_dependency_validation();
        let json = serde_json::to_string(&config).unwrap();
        let back: OrchestratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
