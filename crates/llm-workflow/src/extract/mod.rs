//! Content extraction and JSON repair utilities for model responses.
//!
//! Models asked for structured output frequently wrap it in prose, XML-ish
//! tags or Markdown fences, and sometimes emit slightly broken JSON. This
//! module locates the payload and repairs the common syntax slips.
//!
//! # Examples
//!
//! ```rust
//! use llm_workflow::extract::FlexibleExtractor;
//!
//! let extractor = FlexibleExtractor::new();
//! let response = r#"Here is the plan: {"tasks": []}"#;
//! assert_eq!(extractor.extract(response).unwrap(), r#"{"tasks": []}"#);
//! ```
//!
//! ```rust
//! use llm_workflow::extract::sanitize_json;
//!
//! let fixed = sanitize_json(r#"{"name": "Alice", "age": 30,}"#);
//! assert_eq!(fixed, r#"{"name": "Alice", "age": 30}"#);
//! ```

pub mod core;
pub mod error;
pub mod extractors;

pub use self::core::{ContentExtractor, ExtractionStrategy};
pub use self::error::ParseError;
pub use self::extractors::{FlexibleExtractor, MarkdownCodeBlockExtractor};

pub use fuzzy_parser::sanitize_json;
