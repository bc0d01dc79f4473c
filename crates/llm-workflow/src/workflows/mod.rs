//! Typed workflow patterns over a text [`Agent`](crate::agent::Agent).
//!
//! - [`chaining`]: sequential calls where each step feeds the next, with a
//!   gate after the first step.
//! - [`routing`]: one classification call picks the handler for the input.
//! - [`parallel`]: independent calls fanned out and reduced into one result.
//! - [`tools`]: the model picks a local tool, and its output feeds a typed
//!   final answer.
//!
//! Every step asks the model for JSON matching a schema derived with
//! `schemars`, and parses it with [`JsonAgent`](crate::agent::JsonAgent).

pub mod chaining;
pub mod parallel;
pub mod routing;
pub mod tools;

pub use chaining::{CalendarChain, EventConfirmation, EventDetails, EventExtraction};
pub use parallel::{
    AgentDocumentAnalyzer, BatchAnalysisResult, DocumentAnalysis, DocumentAnalyzer, analyze_batch,
};
pub use routing::{
    CalendarRequestType, CalendarResponse, CalendarRouter, Change, ModifyEventDetails,
    NewEventDetails, RequestType,
};
pub use tools::{
    KnowledgeBaseAnswer, KnowledgeBaseQuery, KnowledgeBaseSearch, KnowledgeRecord, Tool, ToolCall,
    ToolDefinition, ToolRunner,
};

use schemars::JsonSchema;
use std::sync::Arc;

use crate::agent::{Agent, AgentError, JsonAgent};

/// Confidence below which gated and routed workflows stop.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Format instruction carrying the JSON schema of `T`.
pub(crate) fn schema_hint<T: JsonSchema>() -> Result<String, AgentError> {
    let schema = schemars::schema_for!(T);
    let schema = serde_json::to_string_pretty(&schema)?;
    Ok(format!(
        "The JSON must match this schema:\n```json\n{}\n```",
        schema
    ))
}

/// A [`JsonAgent`] producing `T` over a shared text agent.
pub(crate) fn typed<A, T>(agent: &Arc<A>) -> Result<JsonAgent<Arc<A>, T>, AgentError>
where
    A: Agent<Output = String>,
    T: serde::Serialize + serde::de::DeserializeOwned + JsonSchema,
{
    Ok(JsonAgent::new(Arc::clone(agent)).with_format_hint(schema_hint::<T>()?))
}
