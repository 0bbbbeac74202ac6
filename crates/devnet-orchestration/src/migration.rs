//! Contract migration against a running node

use command_runner::{Command, LocalLauncher};
use std::time::Duration;
use tracing::info;

use crate::output::forward_output;
use crate::readiness::wait_for_port;
use crate::{DevnetConfig, Error, Result};

/// Runs the contract deployment tool once the node is reachable
///
/// The deployment tool is never spawned unless the readiness probe succeeded;
/// a node that never opens its port fails the run before any deployment state
/// is touched.
pub struct MigrationRunner {
    launcher: LocalLauncher,
    command: Command,
    host: String,
    port: u16,
    timeout: Duration,
}

impl MigrationRunner {
    /// Create a runner for the migration configured in `config`
    pub fn new(config: &DevnetConfig) -> Self {
        Self {
            launcher: LocalLauncher,
            command: config.migrate_command.clone(),
            host: config.host.clone(),
            port: config.port,
            timeout: config.startup_timeout,
        }
    }

    /// Wait for the node's RPC port, then deploy contracts against it
    pub async fn run(&self) -> Result<()> {
        info!(
            "waiting for node at {}:{} (up to {:?})",
            self.host, self.port, self.timeout
        );
        if !wait_for_port(&self.host, self.port, self.timeout).await {
            return Err(Error::NodeUnreachable {
                host: self.host.clone(),
                port: self.port,
                waited: self.timeout,
            });
        }

        info!("running migration: {}", self.command.display());
        let (events, mut handle) = self.launcher.spawn(&self.command)?;
        let forward = smol::spawn(forward_output("migrate", events));

        let result = handle.wait().await;
        forward.await;
        let status = result?;

        if status.success() {
            info!("migration complete");
            Ok(())
        } else {
            Err(Error::MigrationFailed {
                status: status.code,
            })
        }
    }
}
