//! Devnet lifecycle orchestration

use async_channel::Receiver;
use futures::future::{self, Either};
use std::fmt;
use tracing::info;

use crate::migration::MigrationRunner;
use crate::node::NodeSupervisor;
use crate::{DevnetConfig, Error, Result};

/// Lifecycle phase of a devnet run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Node and migration tasks are being launched
    Starting,
    /// Waiting for the migration to finish while the node runs
    AwaitingMigration,
    /// Migration succeeded; the node is kept alive until interrupted
    Running,
    /// Shutdown requested; the node is being terminated
    ShuttingDown,
    /// Migration or node failure; the run ends with an error
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Starting => "starting",
            Phase::AwaitingMigration => "awaiting-migration",
            Phase::Running => "running",
            Phase::ShuttingDown => "shutting-down",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Sequences node startup, migration and shutdown for one devnet run
///
/// The node supervisor and the migration run concurrently; the migration
/// blocks internally on the readiness probe, so the deployment tool is never
/// invoked against a node that has not opened its port.
pub struct DevnetOrchestrator {
    config: DevnetConfig,
}

impl DevnetOrchestrator {
    /// Create an orchestrator for the given configuration
    pub fn new(config: DevnetConfig) -> Self {
        Self { config }
    }

    /// Drive a full devnet run
    ///
    /// Returns once the environment has been shut down again: `Ok(())` after
    /// an interrupt received through `shutdown` while running, an error if
    /// the node dies, never becomes reachable, or the migration fails. The
    /// node child is explicitly terminated on every exit path.
    pub async fn run(&self, shutdown: Receiver<()>) -> Result<()> {
        let mut phase = Phase::Starting;
        info!("[{}] launching node and migration", phase);

        let node = NodeSupervisor::new(&self.config);
        let migration = MigrationRunner::new(&self.config);

        let (stop_tx, stop_rx) = async_channel::bounded(1);
        let node_task = smol::spawn(async move { node.run(stop_rx).await });

        phase = Phase::AwaitingMigration;
        info!("[{}] node launched, migration in flight", phase);

        let migration_fut = Box::pin(migration.run());
        let node_task = match future::select(node_task, migration_fut).await {
            Either::Left((node_result, _migration)) => {
                // Node finished while the migration was still in flight;
                // the migration future is dropped with the race.
                phase = Phase::Failed;
                info!("[{}] node stopped before migration finished", phase);
                node_result?;
                return Err(Error::NodeExited { status: None });
            }
            Either::Right((migration_result, node_task)) => match migration_result {
                Ok(()) => node_task,
                Err(e) => {
                    phase = Phase::Failed;
                    info!("[{}] migration failed, stopping node", phase);
                    let _ = stop_tx.send(()).await;
                    let _ = node_task.await;
                    return Err(e);
                }
            },
        };

        phase = Phase::Running;
        info!("[{}] devnet is up, interrupt to stop", phase);

        let shutdown_fut = Box::pin(shutdown.recv());
        match future::select(node_task, shutdown_fut).await {
            Either::Left((node_result, _shutdown)) => {
                // Nothing asked the node to stop, so this is a node death
                // even if the supervisor itself reports no error.
                node_result?;
                Err(Error::NodeExited { status: None })
            }
            Either::Right((_signal, node_task)) => {
                phase = Phase::ShuttingDown;
                info!("[{}] interrupt received", phase);
                let _ = stop_tx.send(()).await;
                node_task.await
            }
        }
    }
}
