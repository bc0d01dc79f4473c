//! Prompt chaining: extract, gate, detail, confirm.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{DEFAULT_CONFIDENCE_THRESHOLD, typed};
use crate::agent::{Agent, AgentError};

/// First step: is this a calendar event at all?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventExtraction {
    /// Raw description of the event
    pub description: String,
    /// Whether the text describes a calendar event
    pub is_calendar_event: bool,
    /// Confidence score between 0 and 1
    pub confidence_score: f64,
}

/// Second step: structured event details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventDetails {
    /// Name of the event
    pub name: String,
    /// Date and time of the event, ISO 8601
    pub date: String,
    /// Expected duration in minutes
    pub duration_minutes: u32,
    /// List of participants
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Third step: what to tell the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventConfirmation {
    /// Natural language confirmation message
    pub confirmation_message: String,
    /// Generated calendar link if applicable
    #[serde(default)]
    pub calendar_link: Option<String>,
}

/// Three chained model calls turning a free-text request into a confirmed
/// calendar event.
///
/// The chain stops after the first call unless the input is recognised as a
/// calendar event with enough confidence.
pub struct CalendarChain<A> {
    agent: Arc<A>,
    confidence_threshold: f64,
    today: Option<NaiveDate>,
    signature: String,
}

impl<A> CalendarChain<A>
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
            today: None,
            signature: "Susie".to_string(),
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Pins the date used to resolve relative dates. Defaults to the local date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Name the confirmation message is signed with.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// `Today is Tuesday, March 04, 2025.`
    pub fn date_context(&self) -> String {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        format!("Today is {}.", today.format("%A, %B %d, %Y"))
    }

    pub async fn extract_event_info(&self, user_input: &str) -> Result<EventExtraction, AgentError> {
        info!("Starting event extraction analysis");
        debug!(input = %user_input, "Input text");

        let intent = format!(
            "{} Analyze if the text describes a calendar event.\n\nText:\n{}",
            self.date_context(),
            user_input
        );
        let extraction = typed::<A, EventExtraction>(&self.agent)?
            .execute(intent)
            .await?;

        info!(
            is_calendar_event = extraction.is_calendar_event,
            confidence = extraction.confidence_score,
            "Extraction complete"
        );
        Ok(extraction)
    }

    pub async fn parse_event_details(&self, description: &str) -> Result<EventDetails, AgentError> {
        info!("Starting event details extraction");

        let intent = format!(
            "{} Extract detailed event information. When dates reference 'next Tuesday' or similar relative dates, use this current date as reference.\n\nEvent:\n{}",
            self.date_context(),
            description
        );
        let details = typed::<A, EventDetails>(&self.agent)?
            .execute(intent)
            .await?;

        info!(
            name = %details.name,
            date = %details.date,
            duration_minutes = details.duration_minutes,
            "Parsed event details"
        );
        debug!(participants = %details.participants.join(", "), "Participants");
        Ok(details)
    }

    pub async fn generate_confirmation(
        &self,
        details: &EventDetails,
    ) -> Result<EventConfirmation, AgentError> {
        info!("Generating confirmation message");

        let intent = format!(
            "Generate a natural confirmation message for the event. Sign off with your name; {}\n\nEvent details:\n{}",
            self.signature,
            serde_json::to_string_pretty(details)?
        );
        let confirmation = typed::<A, EventConfirmation>(&self.agent)?
            .execute(intent)
            .await?;

        info!("Confirmation message generated successfully");
        Ok(confirmation)
    }

    /// Runs the whole chain.
    ///
    /// Returns `Ok(None)` when the gate rejects the input; the later calls are
    /// not made in that case.
    pub async fn process(&self, user_input: &str) -> Result<Option<EventConfirmation>, AgentError> {
        let extraction = self.extract_event_info(user_input).await?;

        if !extraction.is_calendar_event
            || extraction.confidence_score < self.confidence_threshold
        {
            warn!(
                is_calendar_event = extraction.is_calendar_event,
                confidence = extraction.confidence_score,
                threshold = self.confidence_threshold,
                "Gate check failed"
            );
            return Ok(None);
        }

        info!("Gate check passed, proceeding with event processing");

        let details = self.parse_event_details(&extraction.description).await?;
        let confirmation = self.generate_confirmation(&details).await?;

        info!("Calendar request processing completed successfully");
        Ok(Some(confirmation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct QueueAgent {
        replies: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl QueueAgent {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Agent for QueueAgent {
        type Output = String;

        fn expertise(&self) -> &str {
            "Replays queued replies"
        }

        async fn execute(&self, intent: String) -> Result<String, AgentError> {
            self.prompts.lock().unwrap().push(intent);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AgentError::ExecutionFailed("no reply queued".to_string()))
        }
    }

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn test_date_context_format() {
        let chain = CalendarChain::new(QueueAgent::new(&[])).with_today(tuesday());
        assert_eq!(chain.date_context(), "Today is Tuesday, March 04, 2025.");
    }

    #[tokio::test]
    async fn test_full_chain() {
        let agent = Arc::new(QueueAgent::new(&[
            r#"{"description": "Team meeting next Tuesday 2pm with Alice and Bob", "is_calendar_event": true, "confidence_score": 0.95}"#,
            r#"```json
{"name": "Team meeting", "date": "2025-03-11T14:00:00", "duration_minutes": 60, "participants": ["Alice", "Bob"]}
```"#,
            r#"{"confirmation_message": "Your team meeting is booked. Susie", "calendar_link": null}"#,
        ]));
        let chain = CalendarChain::from_shared(agent.clone()).with_today(tuesday());

        let confirmation = chain
            .process("Let's schedule a 1h team meeting next Tuesday at 2pm with Alice and Bob")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            confirmation.confirmation_message,
            "Your team meeting is booked. Susie"
        );
        assert!(confirmation.calendar_link.is_none());

        let prompts = agent.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].starts_with("Today is Tuesday, March 04, 2025."));
        assert!(prompts[1].starts_with("Today is Tuesday, March 04, 2025."));
        assert!(prompts[1].contains("Team meeting next Tuesday 2pm with Alice and Bob"));
        assert!(prompts[2].contains("\"duration_minutes\": 60"));
        assert!(prompts[2].contains("Sign off with your name; Susie"));
    }

    #[tokio::test]
    async fn test_gate_rejects_low_confidence() {
        let agent = Arc::new(QueueAgent::new(&[
            r#"{"description": "maybe lunch", "is_calendar_event": true, "confidence_score": 0.5}"#,
        ]));
        let chain = CalendarChain::from_shared(agent.clone());

        assert!(chain.process("maybe lunch sometime?").await.unwrap().is_none());
        assert_eq!(agent.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_gate_rejects_non_event() {
        let agent = QueueAgent::new(&[
            r#"{"description": "weather", "is_calendar_event": false, "confidence_score": 0.99}"#,
        ]);
        let chain = CalendarChain::new(agent);
        assert!(chain.process("What's the weather?").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let agent = QueueAgent::new(&[
            r#"{"description": "standup", "is_calendar_event": true, "confidence_score": 0.7}"#,
            r#"{"name": "Standup", "date": "2025-03-05T09:00:00", "duration_minutes": 15, "participants": []}"#,
            r#"{"confirmation_message": "Standup booked"}"#,
        ]);
        let chain = CalendarChain::new(agent);
        let confirmation = chain.process("standup tomorrow 9am").await.unwrap();
        assert_eq!(confirmation.unwrap().confirmation_message, "Standup booked");
    }

    #[tokio::test]
    async fn test_unparseable_step_is_an_error() {
        let agent = QueueAgent::new(&["I cannot help with that."]);
        let chain = CalendarChain::new(agent);
        let err = chain.process("anything").await.unwrap_err();
        assert!(matches!(err, AgentError::ParseError(_)));
    }
}
