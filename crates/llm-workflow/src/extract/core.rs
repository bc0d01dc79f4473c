use serde::{Deserialize, Serialize};

/// Trait for extracting tagged or structured content
pub trait ContentExtractor {
    /// Extract content within `<tag>...</tag>`
    fn extract_tagged(&self, text: &str, tag: &str) -> Option<String>;

    /// Extract the first balanced JSON object or array
    fn extract_json_like(&self, text: &str) -> Option<String>;
}

/// Extraction strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtractionStrategy {
    /// Extract content within XML-like tags: <tag>content</tag>
    TaggedContent(String),

    /// Find the first complete JSON object or array
    JsonBrackets,
}
