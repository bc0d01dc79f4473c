use super::core::{ContentExtractor, ExtractionStrategy};
use super::error::ParseError;
use log::debug;
use regex::Regex;

/// Default cap on how much model text a single extraction will scan.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 512 * 1024;

/// Flexible content extractor with multiple strategies
pub struct FlexibleExtractor {
    max_content_length: usize,
}

impl FlexibleExtractor {
    pub fn new() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }

    pub fn with_max_content_length(mut self, limit: usize) -> Self {
        self.max_content_length = limit;
        self
    }

    /// Strategies used by [`FlexibleExtractor::extract`]: `<answer>` tags, then
    /// the first balanced JSON entity.
    pub fn standard_extraction_strategies() -> Vec<ExtractionStrategy> {
        vec![
            ExtractionStrategy::TaggedContent("answer".to_string()),
            ExtractionStrategy::JsonBrackets,
        ]
    }

    /// Standard extraction
    pub fn extract(&self, text: &str) -> Result<String, ParseError> {
        self.extract_with_strategies(text, &Self::standard_extraction_strategies())
    }

    /// Extract content using a single strategy
    pub fn extract_with_strategy(
        &self,
        text: &str,
        strategy: &ExtractionStrategy,
    ) -> Option<String> {
        debug!("Trying extraction strategy: {:?}", strategy);

        match strategy {
            ExtractionStrategy::TaggedContent(tag) => self.extract_tagged(text, tag),
            ExtractionStrategy::JsonBrackets => self.extract_json_like(text),
        }
    }

    /// Try multiple extraction strategies in order
    pub fn extract_with_strategies(
        &self,
        text: &str,
        strategies: &[ExtractionStrategy],
    ) -> Result<String, ParseError> {
        self.check_length(text)?;

        let mut errors = Vec::new();

        for strategy in strategies {
            match self.extract_with_strategy(text, strategy) {
                Some(result) => {
                    debug!("Successfully extracted with strategy: {:?}", strategy);
                    return Ok(result);
                }
                None => errors.push(format!("Strategy {:?} failed", strategy)),
            }
        }

        Err(ParseError::AllStrategiesFailed(errors))
    }

    /// Every top-level balanced `{...}` or `[...]` in the text, in order of
    /// appearance.
    pub fn extract_all_json_like(&self, text: &str) -> Result<Vec<String>, ParseError> {
        self.check_length(text)?;
        Ok(Self::json_entities(text))
    }

    fn check_length(&self, text: &str) -> Result<(), ParseError> {
        if text.len() > self.max_content_length {
            return Err(ParseError::TooLarge {
                limit: self.max_content_length,
                actual: text.len(),
            });
        }
        Ok(())
    }

    /// Scans for balanced `{...}` or `[...]`, ignoring brackets inside strings.
    fn json_entities(text: &str) -> Vec<String> {
        let mut entities = Vec::new();
        let mut depth = 0usize;
        let mut start_pos = None;
        let mut opening_char = None;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, ch) in text.char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape_next = true,
                '"' if start_pos.is_some() => in_string = !in_string,
                '{' | '[' if !in_string => {
                    if depth == 0 {
                        start_pos = Some(i);
                        opening_char = Some(ch);
                    }
                    depth += 1;
                }
                '}' | ']' if !in_string && depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        let matched = matches!((opening_char, ch), (Some('{'), '}') | (Some('['), ']'));
                        if let (true, Some(p)) = (matched, start_pos) {
                            entities.push(text[p..=i].to_string());
                        }
                        start_pos = None;
                        opening_char = None;
                    }
                }
                _ => {}
            }
        }

        entities
    }
}

impl Default for FlexibleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for FlexibleExtractor {
    fn extract_tagged(&self, text: &str, tag: &str) -> Option<String> {
        let pattern = format!(r"(?s)<{tag}>(.*?)</{tag}>", tag = regex::escape(tag));

        let extracted = Regex::new(&pattern)
            .ok()
            .and_then(|regex| regex.captures(text))
            .and_then(|captures| captures.get(1))
            .map(|content| content.as_str().trim().to_string());

        if extracted.is_none() {
            debug!("Failed to extract tagged content with tag: {}", tag);
        }

        extracted
    }

    fn extract_json_like(&self, text: &str) -> Option<String> {
        let result = Self::json_entities(text).into_iter().next();

        if result.is_none() {
            debug!("Failed to extract JSON-like content");
        }

        result
    }
}

/// Extractor for Markdown code blocks
pub struct MarkdownCodeBlockExtractor {
    /// Optional language to filter by (e.g., "json")
    pub language: Option<String>,
}

impl Default for MarkdownCodeBlockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownCodeBlockExtractor {
    /// Create a new extractor for any code block
    pub fn new() -> Self {
        Self { language: None }
    }

    /// Create a new extractor for a specific language
    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
        }
    }

    /// Extract content from the first matching fenced block
    pub fn extract(&self, text: &str) -> Result<String, ParseError> {
        let pattern = match &self.language {
            Some(lang) => format!(
                r"(?m)^\s*```\s*{}\s*\n((?:.*\n)*?)^\s*```\s*$",
                regex::escape(lang)
            ),
            None => r"(?m)^\s*```[^\n]*\n((?:.*\n)*?)^\s*```\s*$".to_string(),
        };

        let regex = Regex::new(&pattern)
            .map_err(|e| ParseError::InvalidFormat(format!("Failed to compile regex: {}", e)))?;

        regex
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|content| content.as_str().trim_end().to_string())
            .ok_or_else(|| {
                ParseError::TagExtractionFailed(match &self.language {
                    Some(lang) => format!("No markdown code block found with language '{}'", lang),
                    None => "No markdown code block found".to_string(),
                })
            })
    }
}
