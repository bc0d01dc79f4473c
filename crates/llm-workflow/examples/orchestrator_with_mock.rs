//! Runs the orchestrator and the workflow patterns against a scripted
//! agent. No network access is needed.
//!
//! ```sh
//! cargo run --example orchestrator_with_mock
//! RUST_LOG=llm_workflow=debug cargo run --example orchestrator_with_mock
//! ```

use async_trait::async_trait;
use llm_workflow::agent::{Agent, AgentError};
use llm_workflow::observability::{self, ObservabilityConfig};
use llm_workflow::orchestrator::{
    AgentCapability, ExecutionMode, OrchestratorConfig, WorkflowOrchestrator,
};
use llm_workflow::workflows::{
    AgentDocumentAnalyzer, CalendarChain, CalendarRouter, KnowledgeBaseAnswer,
    KnowledgeBaseSearch, KnowledgeRecord, ToolRunner, analyze_batch,
};
use std::sync::Arc;

/// Answers by looking at what the prompt asks for.
struct ScriptedAgent;

#[async_trait]
impl Agent for ScriptedAgent {
    type Output = String;

    fn expertise(&self) -> &str {
        "Scripted stand-in for a hosted model"
    }

    async fn execute(&self, intent: String) -> Result<String, AgentError> {
        let reply = if intent.starts_with("Break down this objective") {
            r#"```json
{"tasks": [
  {"task_id": "research", "description": "Collect facts about Rust ownership", "dependencies": []},
  {"task_id": "outline", "description": "Outline the post", "dependencies": ["research"]},
  {"task_id": "examples", "description": "Write code examples", "dependencies": ["research"]},
  {"task_id": "draft", "description": "Draft the post", "dependencies": ["outline", "examples"]}
]}
```"#
            .to_string()
        } else if intent.starts_with("Execute the following task:") {
            let description = intent.lines().nth(1).unwrap_or_default();
            format!("[{}] done", description)
        } else if intent.contains("Analyze if the text describes a calendar event") {
            r#"{"description": "1h team meeting next Tuesday at 2pm with Alice and Bob", "is_calendar_event": true, "confidence_score": 0.92}"#.to_string()
        } else if intent.contains("Extract detailed event information") {
            r#"{"name": "Team meeting", "date": "2025-03-11T14:00:00", "duration_minutes": 60, "participants": ["Alice", "Bob"]}"#.to_string()
        } else if intent.contains("Generate a natural confirmation message") {
            r#"{"confirmation_message": "Team meeting with Alice and Bob is set for Tuesday 2pm. Susie", "calendar_link": null}"#.to_string()
        } else if intent.contains("create a new calendar event or modify") {
            r#"{"request_type": "modify_event", "confidence_score": 0.88, "description": "Move the team meeting to Wednesday 3pm"}"#.to_string()
        } else if intent.contains("modifying an existing calendar event") {
            r#"{"event_identifier": "Team meeting", "changes": [{"field": "date", "new_value": "Wednesday 3pm"}]}"#.to_string()
        } else if intent.starts_with("Analyze the following document") {
            r#"{"document_id": "?", "sentiment_score": 0.4, "key_topics": ["AI", "Rust"], "summary": "A short piece about AI in Rust.", "language": "en"}"#.to_string()
        } else if intent.contains("You can call one of these tools") {
            r#"{"tool": "search_knowledge_base", "arguments": {"query": "return policy"}}"#.to_string()
        } else if intent.contains("and it returned:") {
            r#"{"answer": "Items can be returned within 30 days of purchase.", "source": 1}"#.to_string()
        } else {
            return Err(AgentError::ExecutionFailed(format!(
                "No scripted reply for: {}",
                intent.lines().next().unwrap_or_default()
            )));
        };

        Ok(reply)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init(ObservabilityConfig::default())?;

    let agent = Arc::new(ScriptedAgent);

    // Orchestrator/worker
    let orchestrator = WorkflowOrchestrator::new(Arc::new(AgentCapability::new(agent.clone())))
        .with_config(OrchestratorConfig::new().with_mode(ExecutionMode::Concurrent));
    let result = orchestrator
        .run("Write a blog post about Rust ownership")
        .await;

    println!("workflow {} success={}", result.workflow_id, result.success);
    let mut task_ids: Vec<_> = result.results.keys().collect();
    task_ids.sort();
    for task_id in task_ids {
        println!("  {} -> {}", task_id, result.results[task_id]);
    }

    // Prompt chaining
    let chain = CalendarChain::from_shared(agent.clone());
    match chain
        .process("Let's schedule a 1h team meeting next Tuesday at 2pm with Alice and Bob")
        .await?
    {
        Some(confirmation) => println!("Confirmation: {}", confirmation.confirmation_message),
        None => println!("This doesn't appear to be a calendar event request."),
    }

    // Routing
    let router = CalendarRouter::from_shared(agent.clone());
    if let Some(response) = router
        .process("Can you move the team meeting with Alice and Bob to Wednesday at 3pm instead?")
        .await?
    {
        println!("Response: {}", response.message);
    }

    // Parallelization
    let documents = [
        "The latest trends in AI and machine learning",
        "The impact of AI on modern society",
    ];
    let analyzer = Arc::new(AgentDocumentAnalyzer::from_shared(agent.clone()));
    let batch = analyze_batch(analyzer, &documents[..]).await?;
    println!(
        "Analyzed {} documents, average sentiment {:.2}, common topics: {}",
        batch.total_documents,
        batch.average_sentiment,
        batch.common_topics.join(", ")
    );

    // Tool calling
    let knowledge_base = KnowledgeBaseSearch::new(vec![KnowledgeRecord {
        id: 1,
        question: "What is the return policy?".to_string(),
        answer: "Items can be returned within 30 days of purchase.".to_string(),
    }]);
    let runner = ToolRunner::from_shared(agent)
        .with_instructions("You answer questions about our e-commerce store.")
        .with_tool(knowledge_base);
    let answer: KnowledgeBaseAnswer = runner.answer("What is the return policy?").await?;
    println!("Answer: {} (record {})", answer.answer, answer.source);

    Ok(())
}
