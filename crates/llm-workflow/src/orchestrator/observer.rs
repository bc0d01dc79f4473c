//! Observation port for orchestration progress.
//!
//! The orchestrator reports what it is doing through a [`WorkflowObserver`]
//! injected at construction instead of a process-wide logger. The default,
//! [`TracingObserver`], forwards every event to `tracing`.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};

/// Severity of a [`WorkflowEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// Something that happened during an orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    PlanRequested {
        objective: String,
    },
    PlanCreated {
        workflow_id: String,
        task_count: usize,
    },
    ScanStarted {
        workflow_id: String,
        scan: usize,
        pending: usize,
    },
    TaskStarted {
        workflow_id: String,
        task_id: String,
        scan: usize,
    },
    TaskCompleted {
        workflow_id: String,
        task_id: String,
        scan: usize,
    },
    /// A scan finished without completing anything while tasks remain.
    NoProgress {
        workflow_id: String,
        pending: Vec<String>,
    },
    WorkflowCompleted {
        workflow_id: String,
        execution_time_ms: u64,
    },
    WorkflowFailed {
        workflow_id: String,
        error: String,
    },
}

impl WorkflowEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            WorkflowEvent::NoProgress { .. } => EventLevel::Warn,
            WorkflowEvent::WorkflowFailed { .. } => EventLevel::Error,
            _ => EventLevel::Info,
        }
    }
}

/// Receives orchestration events.
pub trait WorkflowObserver: Send + Sync {
    fn observe(&self, event: &WorkflowEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl WorkflowObserver for TracingObserver {
    fn observe(&self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::PlanRequested { objective } => {
                info!(objective = %objective.trim(), "Creating workflow plan");
            }
            WorkflowEvent::PlanCreated {
                workflow_id,
                task_count,
            } => {
                info!(workflow_id = %workflow_id, task_count, "Created workflow plan");
            }
            WorkflowEvent::ScanStarted {
                workflow_id,
                scan,
                pending,
            } => {
                info!(workflow_id = %workflow_id, scan, pending, "Starting scan");
            }
            WorkflowEvent::TaskStarted {
                workflow_id,
                task_id,
                scan,
            } => {
                info!(workflow_id = %workflow_id, task_id = %task_id, scan, "Executing task");
            }
            WorkflowEvent::TaskCompleted {
                workflow_id,
                task_id,
                scan,
            } => {
                info!(workflow_id = %workflow_id, task_id = %task_id, scan, "Task completed");
            }
            WorkflowEvent::NoProgress {
                workflow_id,
                pending,
            } => {
                warn!(
                    workflow_id = %workflow_id,
                    pending = ?pending,
                    "No task became eligible, pending tasks can never run"
                );
            }
            WorkflowEvent::WorkflowCompleted {
                workflow_id,
                execution_time_ms,
            } => {
                info!(workflow_id = %workflow_id, execution_time_ms, "Workflow completed");
            }
            WorkflowEvent::WorkflowFailed { workflow_id, error } => {
                error!(workflow_id = %workflow_id, error = %error, "Workflow failed");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl WorkflowObserver for NoopObserver {
    fn observe(&self, _event: &WorkflowEvent) {}
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `(scan, task_id)` for every task start, in start order.
    pub fn task_starts(&self) -> Vec<(usize, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                WorkflowEvent::TaskStarted { task_id, scan, .. } => Some((scan, task_id)),
                _ => None,
            })
            .collect()
    }

    /// Events at or above `level`.
    pub fn at_level(&self, level: EventLevel) -> Vec<WorkflowEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level() >= level)
            .collect()
    }
}

impl WorkflowObserver for RecordingObserver {
    fn observe(&self, event: &WorkflowEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let no_progress = WorkflowEvent::NoProgress {
            workflow_id: "wf".to_string(),
            pending: vec!["a".to_string()],
        };
        let failed = WorkflowEvent::WorkflowFailed {
            workflow_id: "wf".to_string(),
            error: "boom".to_string(),
        };
        let created = WorkflowEvent::PlanCreated {
            workflow_id: "wf".to_string(),
            task_count: 2,
        };

        assert_eq!(no_progress.level(), EventLevel::Warn);
        assert_eq!(failed.level(), EventLevel::Error);
        assert_eq!(created.level(), EventLevel::Info);
    }

    #[test]
    fn test_recording_observer_filters() {
        let observer = RecordingObserver::new();
        observer.observe(&WorkflowEvent::TaskStarted {
            workflow_id: "wf".to_string(),
            task_id: "a".to_string(),
            scan: 1,
        });
        observer.observe(&WorkflowEvent::NoProgress {
            workflow_id: "wf".to_string(),
            pending: vec!["b".to_string()],
        });

        assert_eq!(observer.events().len(), 2);
        assert_eq!(observer.task_starts(), vec![(1, "a".to_string())]);
        assert_eq!(observer.at_level(EventLevel::Warn).len(), 1);
    }

    #[test]
    fn test_recording_observer_survives_poisoned_lock() {
        let observer = std::sync::Arc::new(RecordingObserver::new());
        observer.observe(&WorkflowEvent::PlanRequested {
            objective: "before".to_string(),
        });

        let poisoner = observer.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.events.lock().unwrap();
            panic!("poison the event log");
        })
        .join();
        assert!(observer.events.is_poisoned());

        observer.observe(&WorkflowEvent::PlanRequested {
            objective: "after".to_string(),
        });
        assert_eq!(observer.events().len(), 2);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = WorkflowEvent::TaskCompleted {
            workflow_id: "wf".to_string(),
            task_id: "a".to_string(),
            scan: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "task_completed");
        assert_eq!(json["scan"], 2);
    }
}
