//! # Observability
//!
//! One-call setup of a global `tracing` subscriber for workflow runs.
//!
//! The orchestrator reports through [`TracingObserver`](crate::orchestrator::TracingObserver)
//! by default, and the extractors log through `log`; both end up in the
//! subscriber installed here. `RUST_LOG` directives are honored in addition
//! to the configured level for this crate.

use std::sync::Mutex;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Configuration for initializing the observability system.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Maximum level captured for `llm_workflow` targets.
    pub level: Level,
    pub target: LogTarget,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            target: LogTarget::default(),
        }
    }
}

impl ObservabilityConfig {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }
}

/// Where formatted events are written.
#[derive(Debug, Clone, Default)]
pub enum LogTarget {
    /// stdout
    #[default]
    Console,
    /// A file, created or truncated at init.
    File(String),
}

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Invalid filter directive: {0}")]
    InvalidDirective(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Installs the global tracing subscriber.
///
/// Call once, early in `main`. A second call, or a call after another
/// subscriber was installed, returns [`ObservabilityError::AlreadyInitialized`].
pub fn init(config: ObservabilityConfig) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("llm_workflow={}", config.level).parse()?);

    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = match config.target {
        LogTarget::Console => subscriber
            .with(fmt::layer().with_writer(std::io::stdout))
            .try_init(),
        LogTarget::File(path) => {
            let file = std::fs::File::create(path)?;
            subscriber
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
    };

    installed.map_err(|e| ObservabilityError::AlreadyInitialized(e.to_string()))
}
