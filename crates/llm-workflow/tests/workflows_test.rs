//! Integration tests for the workflow patterns driven by a text agent.

use async_trait::async_trait;
use llm_workflow::agent::{Agent, AgentError};
use llm_workflow::workflows::{
    AgentDocumentAnalyzer, CalendarRouter, KnowledgeBaseAnswer, KnowledgeBaseSearch, RequestType,
    Tool, ToolCall, ToolRunner, analyze_batch,
};
use schemars::schema::RootSchema;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::Mutex;

/// Replies per document based on the text embedded in the prompt.
struct TopicAgent {
    prompts: Mutex<Vec<String>>,
}

impl TopicAgent {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Agent for TopicAgent {
    type Output = String;

    fn expertise(&self) -> &str {
        "Document analysis"
    }

    async fn execute(&self, intent: String) -> Result<String, AgentError> {
        self.prompts.lock().unwrap().push(intent.clone());

        let reply = if intent.contains("Blockchain") {
            r#"Analysis:
```json
{"document_id": "doc-b", "sentiment_score": -0.2, "key_topics": ["Blockchain", "AI"], "summary": "Ledgers.", "language": "en"}
```"#
        } else {
            r#"{"document_id": "doc-a", "sentiment_score": 0.6, "key_topics": ["AI", "Machine Learning"], "summary": "Trends.", "language": "en",}"#
        };
        Ok(reply.to_string())
    }
}

#[tokio::test]
async fn test_agent_document_analyzer_batch() {
    let agent = TopicAgent::new();
    let analyzer = Arc::new(AgentDocumentAnalyzer::from_shared(agent.clone()));

    let documents = vec![
        "The latest trends in AI and machine learning".to_string(),
        "Blockchain technology: Past, present, and future".to_string(),
    ];
    let result = analyze_batch(analyzer, &documents).await.unwrap();

    assert_eq!(result.total_documents, 2);
    assert_eq!(result.results[0].document_id, "0");
    assert_eq!(result.results[1].document_id, "1");
    assert_eq!(result.results[1].summary, "Ledgers.");
    assert!((result.average_sentiment - 0.2).abs() < 1e-9);
    assert_eq!(result.common_topics, vec!["AI"]);

    let prompts = agent.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts.iter().all(|p| p.contains("\"sentiment_score\"")));
}

/// Always routes with the given reply.
struct RouteAgent(&'static str);

#[async_trait]
impl Agent for RouteAgent {
    type Output = String;

    fn expertise(&self) -> &str {
        "Routing"
    }

    async fn execute(&self, _intent: String) -> Result<String, AgentError> {
        Ok(self.0.to_string())
    }
}

#[tokio::test]
async fn test_router_exposes_route_decision() {
    let router = CalendarRouter::new(RouteAgent(
        r#"<answer>{"request_type": "other", "confidence_score": 0.99, "description": "weather"}</answer>"#,
    ));

    let route = router.route("What's the weather like today?").await.unwrap();
    assert_eq!(route.request_type, RequestType::Other);
    assert!(router.process("What's the weather like today?").await.unwrap().is_none());
}

#[tokio::test]
async fn test_router_agent_failure_propagates() {
    struct DownAgent;

    #[async_trait]
    impl Agent for DownAgent {
        type Output = String;

        fn expertise(&self) -> &str {
            "Unavailable"
        }

        async fn execute(&self, _intent: String) -> Result<String, AgentError> {
            Err(AgentError::RateLimited("429".to_string()))
        }
    }

    let router = CalendarRouter::new(DownAgent);
    let err = router.process("Book a meeting").await.unwrap_err();
    assert!(err.is_retryable());
}

/// Reports a fixed temperature for any coordinates.
struct WeatherTool;

#[derive(serde::Deserialize, schemars::JsonSchema)]
#[allow(dead_code)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the weather for a given location"
    }

    fn parameters(&self) -> RootSchema {
        schemars::schema_for!(Coordinates)
    }

    async fn call(&self, arguments: Value) -> Result<Value, AgentError> {
        let _: Coordinates = serde_json::from_value(arguments)?;
        Ok(json!({"temperature_2m": 24.5, "wind_speed_10m": 8.1}))
    }
}

/// Picks the knowledge base for store questions, then answers from the
/// record the tool returned.
struct StoreAgent;

#[async_trait]
impl Agent for StoreAgent {
    type Output = String;

    fn expertise(&self) -> &str {
        "Store assistant"
    }

    async fn execute(&self, intent: String) -> Result<String, AgentError> {
        let reply = if intent.contains("You can call one of these tools") {
            assert!(intent.contains("\"get_weather\""));
            assert!(intent.contains("\"search_knowledge_base\""));
            r#"I'll look that up: {"tool": "search_knowledge_base", "arguments": {"query": "shipping countries"}}"#
        } else if intent.contains("over 50 countries") {
            r#"```json
{"answer": "Yes, to over 50 countries.", "source": 2}
```"#
        } else {
            return Err(AgentError::ExecutionFailed("unexpected prompt".to_string()));
        };
        Ok(reply.to_string())
    }
}

fn store_knowledge_base() -> KnowledgeBaseSearch {
    KnowledgeBaseSearch::from_json(
        r#"[
            {"id": 1, "question": "What is the return policy?", "answer": "Items can be returned within 30 days."},
            {"id": 2, "question": "Do you ship internationally?", "answer": "Yes, we ship to over 50 countries."}
        ]"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_tool_runner_answers_from_knowledge_base() {
    let runner = ToolRunner::new(StoreAgent)
        .with_instructions(
            "You are a helpful assistant that answers questions from the knowledge base about our e-commerce store.",
        )
        .with_tool(WeatherTool)
        .with_tool(store_knowledge_base());

    assert_eq!(runner.definitions().unwrap().len(), 2);

    let answer: KnowledgeBaseAnswer = runner
        .answer("Do you ship outside the country?")
        .await
        .unwrap();
    assert_eq!(answer.source, 2);
    assert_eq!(answer.answer, "Yes, to over 50 countries.");
}

#[tokio::test]
async fn test_tool_runner_dispatches_by_name() {
    let runner = ToolRunner::new(StoreAgent)
        .with_tool(WeatherTool)
        .with_tool(store_knowledge_base());

    let weather = runner
        .dispatch(&ToolCall::new("get_weather", json!({"latitude": -1.15, "longitude": 36.96})))
        .await
        .unwrap();
    assert_eq!(weather["temperature_2m"], 24.5);

    let records = runner
        .dispatch(&ToolCall::new("search_knowledge_base", json!({"query": "return policy"})))
        .await
        .unwrap();
    assert_eq!(records[0]["id"], 1);
}
