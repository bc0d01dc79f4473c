/// Errors raised while pulling structured content out of model text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("No tagged content found: {0}")]
    TagExtractionFailed(String),

    #[error("Every extraction strategy failed: {0:?}")]
    AllStrategiesFailed(Vec<String>),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Input exceeds {limit} bytes (got {actual})")]
    TooLarge { limit: usize, actual: usize },
}
