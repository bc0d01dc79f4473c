//! Routing: one classification call decides which handler runs.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{DEFAULT_CONFIDENCE_THRESHOLD, typed};
use crate::agent::{Agent, AgentError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    NewEvent,
    ModifyEvent,
    Other,
}

/// Router output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalendarRequestType {
    /// Type of calendar request being made
    pub request_type: RequestType,
    /// Confidence score between 0 and 1
    pub confidence_score: f64,
    /// Cleaned description of the request
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NewEventDetails {
    /// Name of the event
    pub name: String,
    /// Date and time of the event (ISO 8601)
    pub date: String,
    /// Duration in minutes
    pub duration_minutes: u32,
    /// List of participants
    #[serde(default)]
    pub participants: Vec<String>,
}

/// One field change on an existing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Change {
    /// Field to change
    pub field: String,
    /// New value for the field
    pub new_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModifyEventDetails {
    /// Description to identify the existing event
    pub event_identifier: String,
    /// List of changes to make
    #[serde(default)]
    pub changes: Vec<Change>,
    /// New participants to add
    #[serde(default)]
    pub participants_to_add: Vec<String>,
    /// Participants to remove
    #[serde(default)]
    pub participants_to_remove: Vec<String>,
}

/// What a handler reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub success: bool,
    /// User-friendly response message
    pub message: String,
    pub calendar_link: Option<String>,
}

/// Routes calendar requests to a new-event or modify-event handler.
pub struct CalendarRouter<A> {
    agent: Arc<A>,
    confidence_threshold: f64,
}

impl<A> CalendarRouter<A>
where
    A: Agent<Output = String>,
{
    pub fn new(agent: A) -> Self {
        Self::from_shared(Arc::new(agent))
    }

    pub fn from_shared(agent: Arc<A>) -> Self {
        Self {
            agent,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub async fn route(&self, user_input: &str) -> Result<CalendarRequestType, AgentError> {
        info!("Routing calendar request");
        debug!(input = %user_input, "User input");

        let intent = format!(
            "Determine if this is a request to create a new calendar event or modify an existing one.\n\nRequest:\n{}",
            user_input
        );
        let route = typed::<A, CalendarRequestType>(&self.agent)?
            .execute(intent)
            .await?;

        info!(
            request_type = ?route.request_type,
            confidence = route.confidence_score,
            "Request routed"
        );
        Ok(route)
    }

    pub async fn handle_new_event(&self, description: &str) -> Result<CalendarResponse, AgentError> {
        info!("Processing new event request");

        let intent = format!(
            "Extract details for creating a new calendar event.\n\nRequest:\n{}",
            description
        );
        let details = typed::<A, NewEventDetails>(&self.agent)?
            .execute(intent)
            .await?;
        debug!(details = ?details, "New event");

        Ok(CalendarResponse {
            success: true,
            message: format!(
                "Created new event '{}' for {} with {}",
                details.name,
                details.date,
                details.participants.join(", ")
            ),
            calendar_link: Some(format!("calendar://new?event={}", details.name)),
        })
    }

    pub async fn handle_modify_event(
        &self,
        description: &str,
    ) -> Result<CalendarResponse, AgentError> {
        info!("Processing modify event request");

        let intent = format!(
            "Extract details for modifying an existing calendar event.\n\nRequest:\n{}",
            description
        );
        let details = typed::<A, ModifyEventDetails>(&self.agent)?
            .execute(intent)
            .await?;
        debug!(details = ?details, "Modify event");

        Ok(CalendarResponse {
            success: true,
            message: format!(
                "Modified event '{}' with the requested changes",
                details.event_identifier
            ),
            calendar_link: Some(format!(
                "calendar://modify?event={}",
                details.event_identifier
            )),
        })
    }

    /// Routes `user_input` and runs the matching handler.
    ///
    /// `Ok(None)` means the router was unsure or the request is not a
    /// calendar operation.
    pub async fn process(&self, user_input: &str) -> Result<Option<CalendarResponse>, AgentError> {
        let route = self.route(user_input).await?;

        if route.confidence_score < self.confidence_threshold {
            warn!(confidence = route.confidence_score, "Low confidence score");
            return Ok(None);
        }

        match route.request_type {
            RequestType::NewEvent => self.handle_new_event(&route.description).await.map(Some),
            RequestType::ModifyEvent => self.handle_modify_event(&route.description).await.map(Some),
            RequestType::Other => {
                warn!(request_type = ?route.request_type, "Unhandled request type");
                Ok(None)
            }
        }
    }
}
