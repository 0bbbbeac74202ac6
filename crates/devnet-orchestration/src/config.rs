//! Devnet configuration

use command_runner::Command;
use std::path::Path;
use std::time::Duration;

/// Default host the node binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default RPC port of the node
pub const DEFAULT_PORT: u16 = 8545;
/// Default readiness window for the node's RPC port
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);
/// Default contract project directory, relative to the invocation directory
pub const DEFAULT_WORKING_DIR: &str = "core";

/// Configuration for a devnet run
///
/// The node and migration command lines are materialized at construction
/// time, with the contract project directory already applied, so every spawn
/// later in the run uses the same working directory.
#[derive(Debug, Clone)]
pub struct DevnetConfig {
    /// Host the node binds to and the readiness probe targets
    pub host: String,
    /// RPC port the node serves on
    pub port: u16,
    /// How long to wait for the node's port before giving up
    pub startup_timeout: Duration,
    /// Command that starts the node, bound to `host`/`port`
    pub node_command: Command,
    /// Command that deploys contracts against the running node
    pub migrate_command: Command,
}

impl DevnetConfig {
    /// Build a configuration for the given endpoint and contract project directory
    pub fn new(
        host: impl Into<String>,
        port: u16,
        startup_timeout: Duration,
        working_dir: impl AsRef<Path>,
    ) -> Self {
        let host = host.into();
        let dir = working_dir.as_ref();

        let mut node_command = Command::new("npx");
        node_command
            .args(["ganache", "--server.host"])
            .arg(&host)
            .arg("--server.port")
            .arg(port.to_string())
            .current_dir(dir);

        let mut migrate_command = Command::new("npx");
        migrate_command
            .args(["truffle", "migrate", "--network", "development", "--reset"])
            .current_dir(dir);

        Self {
            host,
            port,
            startup_timeout,
            node_command,
            migrate_command,
        }
    }
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_HOST,
            DEFAULT_PORT,
            DEFAULT_STARTUP_TIMEOUT,
            DEFAULT_WORKING_DIR,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DevnetConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8545);
        assert_eq!(config.startup_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_node_command_binds_endpoint() {
        let config = DevnetConfig::new("0.0.0.0", 9545, Duration::from_secs(5), "core");
        let line = config.node_command.display();
        assert!(line.contains("ganache"));
        assert!(line.contains("--server.host 0.0.0.0"));
        assert!(line.contains("--server.port 9545"));
        assert_eq!(
            config.node_command.get_current_dir(),
            Some(Path::new("core"))
        );
    }

    #[test]
    fn test_migrate_command_targets_development_with_reset() {
        let config = DevnetConfig::default();
        let line = config.migrate_command.display();
        assert!(line.contains("truffle migrate"));
        assert!(line.contains("--network development"));
        assert!(line.contains("--reset"));
        assert_eq!(
            config.migrate_command.get_current_dir(),
            Some(Path::new("core"))
        );
    }
}
