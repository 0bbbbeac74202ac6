//! Local process launching with streamed output

use async_process::Stdio;
use futures::stream::Stream;
use futures_lite::io::{AsyncBufReadExt, BufReader, Lines};
use futures_lite::stream::StreamExt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::event::{ProcessEvent, ProcessEventType};
use crate::process::{ExitStatus, ProcessHandle};

/// Launcher for executing processes locally
#[derive(Debug, Clone, Copy)]
pub struct LocalLauncher;

impl LocalLauncher {
    /// Spawn a command, returning its event stream and control handle
    ///
    /// stdout and stderr are piped; the returned stream yields a `Started`
    /// event followed by one event per output line until both pipes close.
    pub fn spawn(&self, command: &Command) -> Result<(ProcessEventStream, ProcessHandle)> {
        let mut async_cmd = command.prepare();
        async_cmd.stdout(Stdio::piped());
        async_cmd.stderr(Stdio::piped());

        let mut child = async_cmd.spawn().map_err(|e| {
            Error::spawn_failed(format!("failed to spawn `{}`: {}", command.display(), e))
        })?;

        let child_id = child.id();
        debug!("spawned `{}` with pid {}", command.display(), child_id);

        let stdout = child.stdout.take().map(|s| BufReader::new(s).lines());
        let stderr = child.stderr.take().map(|s| BufReader::new(s).lines());

        let events = ProcessEventStream {
            stdout,
            stderr,
            started_sent: false,
            child_id,
        };

        Ok((events, ProcessHandle::new(child)))
    }

    /// Execute a command to completion, draining its output
    pub async fn execute(&self, command: &Command) -> Result<ExitStatus> {
        let (mut events, mut handle) = self.spawn(command)?;

        while events.next().await.is_some() {}

        handle.wait().await
    }
}

/// Stream of process events
pub struct ProcessEventStream {
    stdout: Option<Lines<BufReader<async_process::ChildStdout>>>,
    stderr: Option<Lines<BufReader<async_process::ChildStderr>>>,
    started_sent: bool,
    child_id: u32,
}

impl Stream for ProcessEventStream {
    type Item = ProcessEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Send Started event first
        if !self.started_sent {
            self.started_sent = true;
            let event = ProcessEvent::new(ProcessEventType::Started { pid: self.child_id });
            return Poll::Ready(Some(event));
        }

        // Try to read from stdout
        if let Some(stdout) = &mut self.stdout {
            match Pin::new(stdout).poll_next(cx) {
                Poll::Ready(Some(Ok(line))) => {
                    let event = ProcessEvent::new_with_data(ProcessEventType::Stdout, line);
                    return Poll::Ready(Some(event));
                }
                Poll::Ready(Some(Err(_))) | Poll::Ready(None) => {
                    // Stdout closed or unreadable
                    self.stdout = None;
                }
                Poll::Pending => {}
            }
        }

        // Try to read from stderr
        if let Some(stderr) = &mut self.stderr {
            match Pin::new(stderr).poll_next(cx) {
                Poll::Ready(Some(Ok(line))) => {
                    let event = ProcessEvent::new_with_data(ProcessEventType::Stderr, line);
                    return Poll::Ready(Some(event));
                }
                Poll::Ready(Some(Err(_))) | Poll::Ready(None) => {
                    // Stderr closed or unreadable
                    self.stderr = None;
                }
                Poll::Pending => {}
            }
        }

        // If both streams are closed, the stream is exhausted
        if self.stdout.is_none() && self.stderr.is_none() {
            return Poll::Ready(None);
        }

        // One or both streams are still pending
        Poll::Pending
    }
}
