//! Parallelization: analyze documents concurrently, then reduce.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{Instrument, info, info_span};

use super::typed;
use crate::agent::{Agent, AgentError};

/// Analysis of a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentAnalysis {
    /// Unique identifier for the document
    pub document_id: String,
    /// Sentiment score from -1 to 1
    pub sentiment_score: f64,
    /// Main topics identified
    #[serde(default)]
    pub key_topics: Vec<String>,
    /// Brief summary of the document
    pub summary: String,
    /// Detected language of the document
    pub language: String,
}

/// Combined results of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysisResult {
    pub total_documents: usize,
    /// Mean sentiment; 0.0 for an empty batch
    pub average_sentiment: f64,
    /// Topics present in every document, sorted
    pub common_topics: Vec<String>,
    pub analysis_duration_ms: u64,
    /// Per-document results in input order
    pub results: Vec<DocumentAnalysis>,
}

/// Analyzes one document.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, document_id: &str, text: &str) -> Result<DocumentAnalysis, AgentError>;
}

/// [`DocumentAnalyzer`] backed by a text agent.
pub struct AgentDocumentAnalyzer<A> {
    agent: Arc<A>,
}

impl<A> AgentDocumentAnalyzer<A>
where
    A: Agent<Output = String>,
{
    pub fn new(agent: A) -> Self {
        Self::from_shared(Arc::new(agent))
    }

    pub fn from_shared(agent: Arc<A>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl<A> DocumentAnalyzer for AgentDocumentAnalyzer<A>
where
    A: Agent<Output = String>,
{
    async fn analyze(&self, document_id: &str, text: &str) -> Result<DocumentAnalysis, AgentError> {
        info!(document_id = %document_id, "Analyzing document");

        let intent = format!(
            "Analyze the following document. Give a sentiment score from -1 to 1, the main topics, a brief summary and the detected language.\n\nDocument {}:\n{}",
            document_id, text
        );
        let mut analysis = typed::<A, DocumentAnalysis>(&self.agent)?
            .execute(intent)
            .await?;

        // The batch id wins over whatever the model echoed back.
        analysis.document_id = document_id.to_string();
        Ok(analysis)
    }
}

/// Analyzes every document concurrently and reduces the results.
///
/// Document ids are the input positions (`"0"`, `"1"`, ...). The first
/// failure aborts the remaining analyses and fails the batch.
pub async fn analyze_batch<D, S>(
    analyzer: Arc<D>,
    documents: &[S],
) -> Result<BatchAnalysisResult, AgentError>
where
    D: DocumentAnalyzer + ?Sized + 'static,
    S: AsRef<str>,
{
    let started = Instant::now();
    info!(documents = documents.len(), "Starting batch analysis");

    let mut join_set = JoinSet::new();
    for (index, document) in documents.iter().enumerate() {
        let analyzer = Arc::clone(&analyzer);
        let document_id = index.to_string();
        let text = document.as_ref().to_string();
        let span = info_span!("analyze_document", document_id = %document_id);

        join_set.spawn(
            async move { (index, analyzer.analyze(&document_id, &text).await) }.instrument(span),
        );
    }

    let mut slots: Vec<Option<DocumentAnalysis>> = vec![None; documents.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, Ok(analysis))) => slots[index] = Some(analysis),
            Ok((_, Err(e))) => {
                join_set.abort_all();
                return Err(e);
            }
            Err(join_error) => {
                join_set.abort_all();
                return Err(AgentError::Other(format!(
                    "Document analysis task failed: {}",
                    join_error
                )));
            }
        }
    }

    let results: Vec<DocumentAnalysis> = slots.into_iter().flatten().collect();
    let result = reduce(results, started.elapsed().as_millis() as u64);

    info!(
        total_documents = result.total_documents,
        average_sentiment = result.average_sentiment,
        common_topics = %result.common_topics.join(", "),
        analysis_duration_ms = result.analysis_duration_ms,
        "Batch analysis completed"
    );
    Ok(result)
}

fn reduce(results: Vec<DocumentAnalysis>, analysis_duration_ms: u64) -> BatchAnalysisResult {
    let total_documents = results.len();

    let average_sentiment = if total_documents == 0 {
        0.0
    } else {
        results.iter().map(|r| r.sentiment_score).sum::<f64>() / total_documents as f64
    };

    let mut topic_sets = results
        .iter()
        .map(|r| r.key_topics.iter().cloned().collect::<BTreeSet<_>>());
    let common_topics = match topic_sets.next() {
        Some(first) => topic_sets
            .fold(first, |acc, topics| acc.intersection(&topics).cloned().collect())
            .into_iter()
            .collect(),
        None => Vec::new(),
    };

    BatchAnalysisResult {
        total_documents,
        average_sentiment,
        common_topics,
        analysis_duration_ms,
        results,
    }
}
