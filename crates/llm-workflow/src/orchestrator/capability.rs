//! The two delegated calls the orchestrator depends on.

use async_trait::async_trait;
use serde::Deserialize;

use super::plan::Task;
use super::prompts::{executor_prompt, planner_prompt};
use crate::agent::{Agent, AgentError, json::parse_json_output};

/// Remote capability behind a workflow: turning an objective into tasks, and
/// turning one task description into output text.
///
/// Implement this directly for full control over prompting, or wrap any text
/// [`Agent`] in [`AgentCapability`].
#[async_trait]
pub trait WorkflowCapability: Send + Sync {
    /// Splits an objective into tasks with declared dependencies.
    ///
    /// The returned graph is not validated by the caller's `plan()` step.
    async fn decompose(&self, objective: &str) -> Result<Vec<Task>, AgentError>;

    /// Produces output text for a single task description.
    async fn execute(&self, description: &str) -> Result<String, AgentError>;
}

/// Accepted planner replies: `{"tasks": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlanReply {
    Plan { tasks: Vec<TaskReply> },
    Tasks(Vec<TaskReply>),
}

#[derive(Debug, Deserialize)]
struct TaskReply {
    #[serde(alias = "id")]
    task_id: String,
    description: String,
    #[serde(default)]
    dependencies: Vec<String>,
}

impl PlanReply {
    fn into_tasks(self) -> Vec<Task> {
        let replies = match self {
            PlanReply::Plan { tasks } => tasks,
            PlanReply::Tasks(tasks) => tasks,
        };

        replies
            .into_iter()
            .map(|reply| Task::new(reply.task_id, reply.description).depends_on(reply.dependencies))
            .collect()
    }
}

/// [`WorkflowCapability`] backed by a text agent.
///
/// Decomposition prompts the agent for a JSON plan and parses it; execution
/// prompts the agent with the task description and returns the trimmed reply.
pub struct AgentCapability<A> {
    agent: A,
}

impl<A> AgentCapability<A>
where
    A: Agent<Output = String>,
{
    pub fn new(agent: A) -> Self {
        Self { agent }
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }
}

#[async_trait]
impl<A> WorkflowCapability for AgentCapability<A>
where
    A: Agent<Output = String>,
{
    async fn decompose(&self, objective: &str) -> Result<Vec<Task>, AgentError> {
        let prompt = planner_prompt(objective)?;
        let raw_output = self.agent.execute(prompt).await?;

        let tasks = parse_json_output::<PlanReply>(&raw_output)?.into_tasks();
        if tasks.is_empty() {
            return Err(AgentError::ParseError(
                "Planner returned a plan with no tasks".to_string(),
            ));
        }

        tracing::debug!(
            agent = %self.agent.name(),
            task_count = tasks.len(),
            "Parsed plan from agent output"
        );
        Ok(tasks)
    }

    async fn execute(&self, description: &str) -> Result<String, AgentError> {
        let prompt = executor_prompt(description)?;
        let output = self.agent.execute(prompt).await?;

        let output = output.trim();
        if output.is_empty() {
            return Err(AgentError::ExecutionFailed(
                "Agent returned an empty response".to_string(),
            ));
        }

        Ok(output.to_string())
    }
}
