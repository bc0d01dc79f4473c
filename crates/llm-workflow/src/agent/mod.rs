//! Agent API: the seam between workflows and a hosted language model.
//!
//! An [`Agent`] is one opaque model call. It receives a natural-language
//! intent and returns an output value. Everything that talks to a real
//! provider (HTTP client, CLI wrapper, local runtime) lives behind this trait,
//! outside of this crate, so every workflow here can be driven by
//! deterministic fakes in tests.
//!
//! # Implementing a backend
//!
//! ```rust,ignore
//! use llm_workflow::agent::{Agent, AgentError};
//!
//! pub struct MyProviderAgent {
//!     client: my_provider::Client,
//!     model: String,
//! }
//!
//! #[async_trait::async_trait]
//! impl Agent for MyProviderAgent {
//!     type Output = String;
//!
//!     fn expertise(&self) -> &str {
//!         "General purpose chat completion"
//!     }
//!
//!     async fn execute(&self, intent: String) -> Result<Self::Output, AgentError> {
//!         self.client
//!             .complete(&self.model, &intent)
//!             .await
//!             .map_err(|e| AgentError::ProcessError(e.to_string()))
//!     }
//! }
//! ```
//!
//! # Typed output
//!
//! Wrap a text agent in [`JsonAgent`] to get a typed value back:
//!
//! ```rust,ignore
//! use llm_workflow::agent::JsonAgent;
//!
//! let agent = JsonAgent::<_, Analysis>::new(MyProviderAgent::new());
//! let analysis: Analysis = agent.execute("Analyze ...".to_string()).await?;
//! ```

pub mod error;
pub mod json;

pub use error::AgentError;
pub use json::JsonAgent;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

/// The core trait for defining an agent.
///
/// The agent's expertise and output type are statically defined, while the
/// specific task is provided dynamically at runtime.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The type of output this agent produces.
    type Output: Serialize + DeserializeOwned;

    /// Returns a natural language description of what this agent can do.
    fn expertise(&self) -> &str;

    /// Execute the agent with a specific intent.
    ///
    /// The caller is responsible for collecting all necessary context and
    /// formatting it into the intent string.
    async fn execute(&self, intent: String) -> Result<Self::Output, AgentError>;

    /// Returns the name of this agent.
    ///
    /// By default, this returns the type name.
    fn name(&self) -> String {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("UnknownAgent")
            .to_string()
    }
}

#[async_trait]
impl<A> Agent for Arc<A>
where
    A: Agent + ?Sized,
{
    type Output = A::Output;

    fn expertise(&self) -> &str {
        (**self).expertise()
    }

    async fn execute(&self, intent: String) -> Result<Self::Output, AgentError> {
        (**self).execute(intent).await
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoAgent;

    #[async_trait]
    impl Agent for EchoAgent {
        type Output = String;

        fn expertise(&self) -> &str {
            "Echoes its input"
        }

        async fn execute(&self, intent: String) -> Result<Self::Output, AgentError> {
            Ok(intent)
        }
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert_eq!(EchoAgent.name(), "EchoAgent");
    }

    #[tokio::test]
    async fn test_arc_agent_delegates() {
        let agent = Arc::new(EchoAgent);
        let output = agent.execute("hello".to_string()).await.unwrap();
        assert_eq!(output, "hello");
        assert_eq!(agent.expertise(), "Echoes its input");
        assert_eq!(Agent::name(&agent), "EchoAgent");
    }
}
