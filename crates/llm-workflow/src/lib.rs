//! 'llm-workflow' - Dependency-ordered workflows over an injected language model.
//!
//! The core is the [`orchestrator`]: an objective is decomposed into tasks
//! with declared dependencies, and the tasks are executed once everything
//! they depend on has completed. Around it sit smaller [`workflows`]
//! (prompt chaining with a gate, routing, parallel fan-out with reduction,
//! a tool-calling round trip) and the structured-output plumbing every
//! pattern needs ([`extract`], [`agent::JsonAgent`]).
//!
//! No model client ships with this crate. The model is an opaque capability
//! that callers provide by implementing [`Agent`] (or
//! [`orchestrator::WorkflowCapability`] directly).

pub mod agent;
pub mod extract;
pub mod orchestrator;
pub mod workflows;

#[cfg(feature = "observability")]
pub mod observability;

pub use agent::{Agent, AgentError, JsonAgent};
pub use extract::{FlexibleExtractor, MarkdownCodeBlockExtractor};
pub use orchestrator::{
    AgentCapability, OrchestratorConfig, OrchestratorError, Task, WorkflowCapability,
    WorkflowOrchestrator, WorkflowPlan, WorkflowResult,
};

use extract::{ContentExtractor, ParseError};
use std::collections::HashSet;

/// Extracts a JSON string from a raw model response.
///
/// Tries, in order: a fenced ```json block, any fenced block that contains
/// JSON, then the standard [`FlexibleExtractor`] strategies (an
/// `<answer>` tag, then the first balanced object or array in the text).
pub fn extract_json(text: &str) -> Result<String, ParseError> {
    if let Ok(content) = extract_markdown_block_with_lang(text, "json") {
        return Ok(content);
    }

    let extractor = FlexibleExtractor::new();

    // An unlabelled fence only counts if there is JSON inside it.
    if let Ok(content) = extract_markdown_block(text) {
        if let Ok(json) = extractor.extract(&content) {
            return Ok(json);
        }
    }

    extractor.extract(text)
}

/// Every plausible JSON payload in a raw model response, best first.
///
/// Starts with the same candidates [`extract_json`] prefers (fenced blocks,
/// an `<answer>` tag) and continues with each further balanced object or
/// array in the text, so a caller can skip over bracketed prose that is not
/// the payload. Duplicates are dropped.
pub fn extract_json_candidates(text: &str) -> Result<Vec<String>, ParseError> {
    let extractor = FlexibleExtractor::new();
    let mut candidates = Vec::new();

    if let Ok(content) = extract_markdown_block_with_lang(text, "json") {
        candidates.push(content);
    }
    if let Ok(content) = extract_markdown_block(text) {
        candidates.extend(extractor.extract_all_json_like(&content)?);
    }
    if let Some(content) = extractor.extract_tagged(text, "answer") {
        candidates.push(content);
    }
    candidates.extend(extractor.extract_all_json_like(text)?);

    let mut seen = HashSet::new();
    candidates.retain(|candidate| seen.insert(candidate.clone()));

    if candidates.is_empty() {
        return Err(ParseError::AllStrategiesFailed(vec![
            "No JSON object or array found".to_string(),
        ]));
    }
    Ok(candidates)
}

/// Extracts the content of the first Markdown code block, whatever its language.
pub fn extract_markdown_block(text: &str) -> Result<String, ParseError> {
    MarkdownCodeBlockExtractor::new().extract(text)
}

/// Extracts the content of the first Markdown code block labelled `lang`.
pub fn extract_markdown_block_with_lang(text: &str, lang: &str) -> Result<String, ParseError> {
    MarkdownCodeBlockExtractor::with_language(lang).extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_extraction() {
        let input = "Some text before {\"key\": \"value\"} and after.";
        assert_eq!(extract_json(input).unwrap(), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extraction_from_answer_tag() {
        let text = "<answer>{\"type\": \"success\"}</answer>";
        assert_eq!(extract_json(text).unwrap(), "{\"type\": \"success\"}");
    }

    #[test]
    fn test_bare_array_extraction() {
        let text = "The plan is [{\"task_id\": \"a\"}] as requested.";
        assert_eq!(extract_json(text).unwrap(), "[{\"task_id\": \"a\"}]");
    }

    #[test]
    fn test_markdown_extraction() {
        let text = "Here is some code:\n```\nlet x = 42;\n```\nAnd some text after.";
        assert_eq!(extract_markdown_block(text).unwrap(), "let x = 42;");

        let text = r#"First a JSON block:
```json
{"key": "value"}
```

Then a Rust block:
```rust
let data = vec![1, 2, 3];
```
"#;
        assert_eq!(
            extract_markdown_block_with_lang(text, "rust").unwrap(),
            "let data = vec![1, 2, 3];"
        );

        assert!(extract_markdown_block("No code blocks at all.").is_err());
    }

    #[test]
    fn test_json_block_preferred_over_inline() {
        let text = r#"Some inline {"inline": "data"} here.
```json
{"block": "data"}
```
More text."#;
        assert_eq!(extract_json(text).unwrap(), r#"{"block": "data"}"#);
    }

    #[test]
    fn test_json_block_preferred_over_generic_block() {
        let text = r#"First a generic block:
```
{"generic": "block"}
```

Then a JSON block:
```json
{"json": "block"}
```"#;
        assert_eq!(extract_json(text).unwrap(), r#"{"json": "block"}"#);
    }

    #[test]
    fn test_generic_block_with_json() {
        let text = r#"The output is:
```
{"result": "ok", "value": 123}
```
End of output."#;
        assert_eq!(
            extract_json(text).unwrap(),
            r#"{"result": "ok", "value": 123}"#
        );
    }

    #[test]
    fn test_falls_back_to_inline_when_block_has_no_json() {
        let text = r#"Here's some code:
```
This is not JSON at all
```
But this is JSON: {"fallback": "value"}"#;
        assert_eq!(extract_json(text).unwrap(), r#"{"fallback": "value"}"#);
    }

    #[test]
    fn test_no_json_is_an_error() {
        assert!(extract_json("Nothing structured here.").is_err());
        assert!(extract_json_candidates("Nothing structured here.").is_err());
    }

    #[test]
    fn test_candidates_follow_bracketed_prose() {
        let text = "Plan [v1], see {\"tasks\": []}";
        assert_eq!(
            extract_json_candidates(text).unwrap(),
            vec!["[v1]", "{\"tasks\": []}"]
        );
    }

    #[test]
    fn test_candidates_put_fenced_json_first_without_duplicates() {
        let text = "Note {\"draft\": 1}\n```json\n{\"final\": 2}\n```\n";
        assert_eq!(
            extract_json_candidates(text).unwrap(),
            vec!["{\"final\": 2}", "{\"draft\": 1}"]
        );
    }
}
