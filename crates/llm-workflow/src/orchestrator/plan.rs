//! Tasks and workflow plans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::dependency_graph::DependencyGraph;
use super::error::OrchestratorError;

/// Lifecycle of a single task. The only transition is `Pending -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

/// One unit of work produced by decomposing an objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within its plan.
    pub task_id: String,
    /// What the executor should do.
    pub description: String,
    /// Ids of tasks that must complete first.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Executor output; present iff `status` is `Completed`.
    #[serde(default)]
    pub result: Option<String>,
}

impl Task {
    /// Creates a pending task without dependencies.
    pub fn new(task_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            description: description.into(),
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
            result: None,
        }
    }

    /// Adds dependencies to the task.
    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Records the executor output and marks the task completed.
    pub fn complete(&mut self, output: impl Into<String>) {
        self.result = Some(output.into());
        self.status = TaskStatus::Completed;
    }

    /// Drops any status or result a planner may have filled in.
    pub(crate) fn reset(&mut self) {
        self.status = TaskStatus::Pending;
        self.result = None;
    }
}

/// Where a plan currently is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Planned,
    Executing,
    Completed,
    Failed,
}

/// The decomposed form of an objective.
///
/// Task order reflects creation order, not execution order. A plan is built
/// once per run and never re-planned; only task status and the stage marker
/// change while it executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowPlan {
    pub workflow_id: String,
    pub objective: String,
    pub tasks: Vec<Task>,
    pub stage: WorkflowStage,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowPlan {
    /// Creates a plan with a freshly generated id. All tasks are reset to pending.
    pub fn new(objective: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self::with_id(
            format!("wf-{}", uuid::Uuid::new_v4()),
            objective,
            tasks,
        )
    }

    /// Creates a plan with an explicit id. All tasks are reset to pending.
    pub fn with_id(
        workflow_id: impl Into<String>,
        objective: impl Into<String>,
        mut tasks: Vec<Task>,
    ) -> Self {
        for task in &mut tasks {
            task.reset();
        }

        Self {
            workflow_id: workflow_id.into(),
            objective: objective.into(),
            tasks,
            stage: WorkflowStage::Planned,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn all_completed(&self) -> bool {
        self.tasks.iter().all(Task::is_completed)
    }

    /// Ids of tasks not yet completed, in plan order.
    pub fn pending_task_ids(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| !t.is_completed())
            .map(|t| t.task_id.clone())
            .collect()
    }

    pub(crate) fn mark_completed(&mut self) {
        self.stage = WorkflowStage::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Builds the dependency graph of this plan.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for task in &self.tasks {
            graph.add_node(&task.task_id);
            for dep in &task.dependencies {
                graph.add_dependency(&task.task_id, dep);
            }
        }
        graph
    }

    /// Checks the plan is executable: unique ids, no self-reference, every
    /// dependency names a task in the plan, and no cycles.
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.task_id.as_str()) {
                return Err(OrchestratorError::InvalidPlan(format!(
                    "duplicate task id '{}'",
                    task.task_id
                )));
            }
        }

        for task in &self.tasks {
            for dep in &task.dependencies {
                if dep == &task.task_id {
                    return Err(OrchestratorError::InvalidPlan(format!(
                        "task '{}' depends on itself",
                        task.task_id
                    )));
                }
                if !seen.contains(dep.as_str()) {
                    return Err(OrchestratorError::InvalidPlan(format!(
                        "task '{}' depends on unknown task '{}'",
                        task.task_id, dep
                    )));
                }
            }
        }

        if let Some(cycle) = self.dependency_graph().find_cycle() {
            return Err(OrchestratorError::InvalidPlan(format!(
                "dependency cycle: {}",
                cycle.join(" -> ")
            )));
        }

        Ok(())
    }
}
