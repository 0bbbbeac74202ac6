//! Raw process events

use chrono::{DateTime, Utc};

/// A raw event from a process
#[derive(Debug, Clone)]
pub struct ProcessEvent {
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The type of event
    pub event_type: ProcessEventType,
    /// Optional data associated with the event
    pub data: Option<String>,
}

impl ProcessEvent {
    /// Create a new process event
    pub fn new(event_type: ProcessEventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            data: None,
        }
    }

    /// Create a new process event with data
    pub fn new_with_data(event_type: ProcessEventType, data: String) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            data: Some(data),
        }
    }
}

/// Types of raw process events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEventType {
    /// Process has started
    Started {
        /// Process ID of the spawned child
        pid: u32,
    },
    /// Log line from stdout
    Stdout,
    /// Log line from stderr
    Stderr,
}
