//! Prompt templates for decomposition and task execution.

use minijinja::{Environment, context};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::agent::AgentError;

/// Shape the planner is asked to return.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[allow(dead_code)] // only its schema is used
pub(crate) struct PlanSchema {
    /// Tasks in the order they were created.
    pub tasks: Vec<TaskSchema>,
}

/// One task in the planner reply.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[allow(dead_code)]
pub(crate) struct TaskSchema {
    /// Unique identifier for the task.
    pub task_id: String,
    /// Description of what needs to be done.
    pub description: String,
    /// IDs of tasks that must complete first.
    pub dependencies: Vec<String>,
}

pub(crate) const PLANNER_TEMPLATE: &str = r#"Break down this objective into a series of discrete tasks.
Identify dependencies between tasks and create a workflow plan.
Every dependency must be the task_id of another task in the plan, and the plan must not contain cycles.

Objective:
{{ objective }}

Respond with JSON matching this schema:
```json
{{ schema }}
```"#;

pub(crate) const EXECUTOR_TEMPLATE: &str = r#"Execute the following task:
{{ description }}"#;

fn render(template: &str, ctx: minijinja::Value) -> Result<String, AgentError> {
    let env = Environment::new();
    env.template_from_str(template)
        .and_then(|tmpl| tmpl.render(ctx))
        .map_err(|e| AgentError::Other(format!("Prompt rendering failed: {}", e)))
}

/// Renders the decomposition prompt for `objective`.
pub(crate) fn planner_prompt(objective: &str) -> Result<String, AgentError> {
    let schema = schemars::schema_for!(PlanSchema);
    let schema = serde_json::to_string_pretty(&schema)?;
    render(
        PLANNER_TEMPLATE,
        context! { objective => objective.trim(), schema => schema },
    )
}

/// Renders the execution prompt for one task description.
pub(crate) fn executor_prompt(description: &str) -> Result<String, AgentError> {
    render(
        EXECUTOR_TEMPLATE,
        context! { description => description.trim() },
    )
}
