//! Tool calling: the model picks a tool, the tool runs locally, and its
//! output goes back to the model for a typed final answer.
//!
//! There is no provider-side function calling here. The tool list is part of
//! the prompt and the model replies with a JSON call object:
//!
//! ```json
//! {"tool": "search_knowledge_base", "arguments": {"query": "return policy"}}
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::typed;
use crate::agent::{Agent, AgentError};

/// What the model is shown about a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// A call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub tool: String,
    /// Arguments matching the tool's parameter schema
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool: tool.into(),
            arguments,
        }
    }
}

/// A function the model may ask to have called.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Schema of the arguments object, usually `schemars::schema_for!(Args)`.
    fn parameters(&self) -> RootSchema;

    async fn call(&self, arguments: Value) -> Result<Value, AgentError>;

    fn definition(&self) -> Result<ToolDefinition, AgentError> {
        Ok(ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: serde_json::to_value(self.parameters())?,
        })
    }
}

/// Runs one tool round trip over a text agent.
pub struct ToolRunner<A> {
    agent: Arc<A>,
    instructions: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl<A> ToolRunner<A>
where
    A: Agent<Output = String>,
{
    pub fn new(agent: A) -> Self {
        Self::from_shared(Arc::new(agent))
    }

    pub fn from_shared(agent: Arc<A>) -> Self {
        Self {
            agent,
            instructions: "You are a helpful assistant.".to_string(),
            tools: Vec::new(),
        }
    }

    /// Replaces the leading instructions of every prompt.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_tool(self, tool: impl Tool + 'static) -> Self {
        self.with_shared_tool(Arc::new(tool))
    }

    pub fn with_shared_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn definitions(&self) -> Result<Vec<ToolDefinition>, AgentError> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Asks the model which tool to call for `question`.
    pub async fn request_tool_call(&self, question: &str) -> Result<ToolCall, AgentError> {
        if self.tools.is_empty() {
            return Err(AgentError::ExecutionFailed("No tools registered".to_string()));
        }

        let tools = serde_json::to_string_pretty(&self.definitions()?)?;
        let intent = format!(
            "{}\n\nQuestion: {}\n\nYou can call one of these tools:\n{}\n\nPick the tool that helps answer the question and reply with the call as {{\"tool\": <name>, \"arguments\": {{...}}}}.",
            self.instructions, question, tools
        );

        let call = typed::<A, ToolCall>(&self.agent)?.execute(intent).await?;
        debug!(tool = %call.tool, arguments = %call.arguments, "Model requested tool call");
        Ok(call)
    }

    /// Runs `call` against the registered tool of the same name.
    pub async fn dispatch(&self, call: &ToolCall) -> Result<Value, AgentError> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == call.tool)
            .ok_or_else(|| AgentError::ExecutionFailed(format!("Unknown tool '{}'", call.tool)))?;

        info!(tool = %call.tool, "Dispatching tool call");
        tool.call(call.arguments.clone()).await
    }

    /// Full round trip: pick a tool, run it, then answer `question` from the
    /// tool output as a `T`.
    pub async fn answer<T>(&self, question: &str) -> Result<T, AgentError>
    where
        T: Serialize + DeserializeOwned + JsonSchema + Send + Sync,
    {
        let call = self.request_tool_call(question).await?;
        let output = self.dispatch(&call).await?;

        let intent = format!(
            "{}\n\nQuestion: {}\n\nYou called `{}` with {} and it returned:\n{}\n\nAnswer the question using this result.",
            self.instructions, question, call.tool, call.arguments, output
        );
        typed::<A, T>(&self.agent)?.execute(intent).await
    }
}

/// One entry of a question/answer knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeRecord {
    pub id: u32,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeBaseQuery {
    /// The query to search the knowledge base with
    pub query: String,
}

/// Typed final answer for knowledge base questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeBaseAnswer {
    /// The answer to the user's question
    pub answer: String,
    /// The record id of the answer
    pub source: u32,
}

/// In-memory knowledge base exposed as `search_knowledge_base`.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBaseSearch {
    records: Vec<KnowledgeRecord>,
}

impl KnowledgeBaseSearch {
    pub fn new(records: Vec<KnowledgeRecord>) -> Self {
        Self { records }
    }

    /// Loads records from a JSON array.
    pub fn from_json(json: &str) -> Result<Self, AgentError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Records sharing at least one word with `query`, most shared words
    /// first. Returns every record when nothing matches.
    pub fn search(&self, query: &str) -> Vec<&KnowledgeRecord> {
        let terms: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|term| term.len() > 2)
            .map(str::to_lowercase)
            .collect();

        let mut scored: Vec<(usize, &KnowledgeRecord)> = self
            .records
            .iter()
            .map(|record| {
                let text = format!("{} {}", record.question, record.answer).to_lowercase();
                let score = terms.iter().filter(|term| text.contains(term.as_str())).count();
                (score, record)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        if scored.is_empty() {
            return self.records.iter().collect();
        }

        // Stable sort keeps record order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, record)| record).collect()
    }
}

#[async_trait]
impl Tool for KnowledgeBaseSearch {
    fn name(&self) -> &str {
        "search_knowledge_base"
    }

    fn description(&self) -> &str {
        "Get the answer to the user's question from the knowledge base."
    }

    fn parameters(&self) -> RootSchema {
        schemars::schema_for!(KnowledgeBaseQuery)
    }

    async fn call(&self, arguments: Value) -> Result<Value, AgentError> {
        let query: KnowledgeBaseQuery = serde_json::from_value(arguments)?;
        Ok(serde_json::to_value(self.search(&query.query))?)
    }
}
