//! Child output forwarding into the log stream

use command_runner::{ProcessEventStream, ProcessEventType};
use futures_lite::stream::StreamExt;
use tracing::{debug, info, warn};

/// Forward a child's events into `tracing`, prefixed with its role
///
/// Runs until the child's pipes close.
pub(crate) async fn forward_output(source: &'static str, mut events: ProcessEventStream) {
    while let Some(event) = events.next().await {
        match event.event_type {
            ProcessEventType::Started { pid } => debug!("[{}] started with pid {}", source, pid),
            ProcessEventType::Stdout => {
                if let Some(line) = &event.data {
                    info!("[{}] {}", source, line);
                }
            }
            ProcessEventType::Stderr => {
                if let Some(line) = &event.data {
                    warn!("[{}] {}", source, line);
                }
            }
        }
    }
}
