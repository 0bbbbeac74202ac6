//! Node process supervision

use async_channel::Receiver;
use command_runner::{Command, ExitStatus, LocalLauncher};
use futures_lite::future;
use tracing::{error, info, warn};

use crate::output::forward_output;
use crate::{DevnetConfig, Error, Result};

/// Supervises the blockchain test node child process
///
/// The supervisor spawns at most one node process per run and owns its handle
/// for the whole run. The rest of the environment depends on the node staying
/// up, so a self-initiated exit is always an error; the only clean way out is
/// a stop request, which terminates the child explicitly.
pub struct NodeSupervisor {
    launcher: LocalLauncher,
    command: Command,
}

enum NodeOutcome {
    Exited(command_runner::Result<ExitStatus>),
    StopRequested,
}

impl NodeSupervisor {
    /// Create a supervisor for the node configured in `config`
    pub fn new(config: &DevnetConfig) -> Self {
        Self {
            launcher: LocalLauncher,
            command: config.node_command.clone(),
        }
    }

    /// Spawn the node and supervise it until it exits or `stop` fires
    ///
    /// Child output is forwarded into the log stream for the node's lifetime.
    /// On a stop request the child receives SIGTERM and is reaped before this
    /// returns `Ok(())`.
    pub async fn run(&self, stop: Receiver<()>) -> Result<()> {
        info!("starting node: {}", self.command.display());
        let (events, mut handle) = self.launcher.spawn(&self.command)?;
        let forward = smol::spawn(forward_output("node", events));

        let outcome = future::or(
            async { NodeOutcome::Exited(handle.wait().await) },
            async {
                let _ = stop.recv().await;
                NodeOutcome::StopRequested
            },
        )
        .await;

        match outcome {
            NodeOutcome::Exited(result) => {
                forward.await;
                let status = result?;
                error!("node exited unexpectedly with status {:?}", status.code);
                Err(Error::NodeExited {
                    status: status.code,
                })
            }
            NodeOutcome::StopRequested => {
                info!("stopping node (pid {})", handle.pid());
                if let Err(e) = handle.terminate() {
                    warn!("failed to terminate node: {}, killing", e);
                    if let Err(e) = handle.kill() {
                        warn!("failed to kill node: {}", e);
                    }
                }
                let status = handle.wait().await?;
                forward.await;
                info!("node stopped ({})", describe_exit(&status));
                Ok(())
            }
        }
    }
}

fn describe_exit(status: &ExitStatus) -> String {
    if status.terminated_by_signal() {
        "terminated by signal".to_string()
    } else {
        format!("status {:?}", status.code)
    }
}
