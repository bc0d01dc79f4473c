//! Typed-output adapter over a text agent.

use super::{Agent, AgentError};
use crate::extract::sanitize_json;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

/// Wraps an `Agent<Output = String>` and deserializes its reply into `T`.
///
/// The reply may wrap the JSON in prose or a Markdown fence; the JSON is
/// located with [`crate::extract_json`]. If the first parse fails, the text is
/// repaired with [`sanitize_json`] (trailing commas, unclosed brackets) and
/// parsed once more.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Deserialize, Serialize)]
/// struct Analysis {
///     summary: String,
///     key_points: Vec<String>,
/// }
///
/// let agent = JsonAgent::<_, Analysis>::new(my_text_agent);
/// let result = agent.execute("Analyze Rust's ownership model".to_string()).await?;
/// ```
pub struct JsonAgent<A, T> {
    inner: A,
    format_hint: Option<String>,
    _phantom: PhantomData<fn() -> T>,
}

impl<A, T> JsonAgent<A, T>
where
    A: Agent<Output = String>,
    T: Serialize + DeserializeOwned,
{
    /// Creates a new adapter around `inner`.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            format_hint: None,
            _phantom: PhantomData,
        }
    }

    /// Appends an output-format instruction to every intent.
    ///
    /// Typically a JSON schema or a short field list for `T`.
    pub fn with_format_hint(mut self, hint: impl Into<String>) -> Self {
        self.format_hint = Some(hint.into());
        self
    }

    /// Returns the wrapped agent.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn build_intent(&self, intent: String) -> String {
        match &self.format_hint {
            Some(hint) => format!(
                "{}\n\nRespond with a single JSON value only.\n{}",
                intent, hint
            ),
            None => intent,
        }
    }
}

/// Parses a typed value out of free-form model text.
///
/// Candidates from [`crate::extract_json_candidates`] are tried in order; the
/// first one that deserializes into `T`, directly or after
/// [`sanitize_json`], wins.
pub fn parse_json_output<T: DeserializeOwned>(raw_output: &str) -> Result<T, AgentError> {
    let candidates = crate::extract_json_candidates(raw_output).map_err(|e| {
        AgentError::ParseError(format!(
            "Failed to extract JSON from output: {}. Raw output: {}",
            e, raw_output
        ))
    })?;

    let mut first_error = None;
    for candidate in &candidates {
        match parse_candidate::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => {
                log::debug!("Candidate rejected ({}): {}", e, candidate);
                first_error.get_or_insert(e);
            }
        }
    }

    Err(AgentError::ParseError(format!(
        "Failed to parse {}: {}",
        std::any::type_name::<T>(),
        first_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

fn parse_candidate<T: DeserializeOwned>(json_str: &str) -> Result<T, serde_json::Error> {
    match serde_json::from_str::<T>(json_str) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            log::debug!("Direct parse failed ({}), retrying on sanitized JSON", first_err);
            serde_json::from_str::<T>(&sanitize_json(json_str))
        }
    }
}

#[async_trait]
impl<A, T> Agent for JsonAgent<A, T>
where
    A: Agent<Output = String>,
    T: Serialize + DeserializeOwned + Send + Sync,
{
    type Output = T;

    fn expertise(&self) -> &str {
        self.inner.expertise()
    }

    async fn execute(&self, intent: String) -> Result<Self::Output, AgentError> {
        tracing::debug!(
            agent = %self.inner.name(),
            output_type = std::any::type_name::<T>(),
            "JsonAgent executing"
        );

        let raw_output = self.inner.execute(self.build_intent(intent)).await?;
        parse_json_output(&raw_output)
    }

    fn name(&self) -> String {
        self.inner.name()
    }
}
