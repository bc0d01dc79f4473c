//! Tracing tests for WorkflowOrchestrator
//!
//! These tests verify that the default observer emits structured events and
//! that runs are wrapped in spans.

use async_trait::async_trait;
use llm_workflow::agent::AgentError;
use llm_workflow::orchestrator::{
    ExecutionMode, OrchestratorConfig, Task, WorkflowCapability, WorkflowOrchestrator,
};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::FmtSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// Captures tracing output to a string for verification
#[derive(Clone)]
struct TestWriter {
    output: Arc<std::sync::Mutex<Vec<u8>>>,
}

impl TestWriter {
    fn new() -> Self {
        Self {
            output: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    fn get_output(&self) -> String {
        let bytes = self.output.lock().unwrap();
        String::from_utf8_lossy(&bytes).to_string()
    }
}

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.output.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.output.lock().unwrap().flush()
    }
}

impl<'a> MakeWriter<'a> for TestWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture() -> (TestWriter, tracing::subscriber::DefaultGuard) {
    let writer = TestWriter::new();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_ansi(false)
        .with_writer(writer.clone())
        .finish();

    let guard = tracing::subscriber::set_default(subscriber);
    (writer, guard)
}

// ============================================================================
// Mock Capability
// ============================================================================

struct PlanCapability {
    tasks: Vec<Task>,
}

#[async_trait]
impl WorkflowCapability for PlanCapability {
    async fn decompose(&self, _objective: &str) -> Result<Vec<Task>, AgentError> {
        Ok(self.tasks.clone())
    }

    async fn execute(&self, description: &str) -> Result<String, AgentError> {
        if description == "explode" {
            return Err(AgentError::ProcessError("exit status 1".to_string()));
        }
        Ok(format!("done {}", description))
    }
}

fn orchestrator(tasks: Vec<Task>) -> WorkflowOrchestrator {
    WorkflowOrchestrator::new(Arc::new(PlanCapability { tasks }))
}

// ============================================================================
// Tracing Tests
// ============================================================================

#[tokio::test]
async fn test_run_span_and_task_events() {
    let (writer, _guard) = capture();

    let result = orchestrator(vec![
        Task::new("outline", "outline"),
        Task::new("draft", "draft").depends_on(["outline"]),
    ])
    .run("Write a post")
    .await;
    assert!(result.success);

    let output = writer.get_output();
    assert!(output.contains("workflow_run"), "output: {output}");
    assert!(output.contains("workflow_execute"));
    assert!(output.contains("Creating workflow plan"));
    assert!(output.contains("Executing task"));
    assert!(output.contains("task_id=outline"));
    assert!(output.contains("task_id=draft"));
    assert!(output.contains("scan=2"));
    assert!(output.contains("Workflow completed"));
}

#[tokio::test]
async fn test_failure_is_logged_at_error_level() {
    let (writer, _guard) = capture();

    let result = orchestrator(vec![Task::new("boom", "explode")])
        .run("objective")
        .await;
    assert!(!result.success);

    let output = writer.get_output();
    assert!(output.contains("ERROR"), "output: {output}");
    assert!(output.contains("Workflow failed"));
    assert!(output.contains("exit status 1"));
}

#[tokio::test]
async fn test_cycle_is_logged_as_warning() {
    let (writer, _guard) = capture();

    let result = orchestrator(vec![
        Task::new("a", "a").depends_on(["b"]),
        Task::new("b", "b").depends_on(["a"]),
    ])
    .run("objective")
    .await;
    assert!(!result.success);

    let output = writer.get_output();
    assert!(output.contains("WARN"), "output: {output}");
    assert!(output.contains("pending tasks can never run"));
}

#[tokio::test]
async fn test_concurrent_task_spans() {
    let (writer, _guard) = capture();

    let result = orchestrator(vec![Task::new("left", "left"), Task::new("right", "right")])
        .with_config(OrchestratorConfig::new().with_mode(ExecutionMode::Concurrent))
        .run("objective")
        .await;
    assert!(result.success);

    let output = writer.get_output();
    assert!(output.contains("workflow_task"), "output: {output}");
    assert!(output.contains("Delegating task execution"));
}
