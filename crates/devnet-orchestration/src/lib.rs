//! # Devnet orchestration
//!
//! This crate wires a local contract-development environment together: it
//! supervises the blockchain test node as a child process, probes the node's
//! RPC port until it accepts connections, runs the contract migration tool
//! against it, and keeps the node alive until a shutdown request arrives.
//!
//! ## Example
//!
//! ```no_run
//! use devnet_orchestration::{DevnetConfig, DevnetOrchestrator};
//!
//! # fn main() -> devnet_orchestration::Result<()> {
//! let (shutdown_tx, shutdown_rx) = async_channel::bounded(1);
//! // Wire shutdown_tx to your interrupt handling, then:
//! let orchestrator = DevnetOrchestrator::new(DevnetConfig::default());
//! smol::block_on(orchestrator.run(shutdown_rx))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod migration;
mod node;
mod orchestrator;
mod output;
mod readiness;

pub use config::DevnetConfig;
pub use migration::MigrationRunner;
pub use node::NodeSupervisor;
pub use orchestrator::{DevnetOrchestrator, Phase};
pub use readiness::{POLL_INTERVAL, wait_for_port};

use std::time::Duration;

/// Error types for devnet orchestration
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The node never opened its RPC port within the readiness window
    #[error("node unreachable: {host}:{port} did not accept connections within {waited:?}")]
    NodeUnreachable {
        /// Host the probe targeted
        host: String,
        /// Port the probe targeted
        port: u16,
        /// How long the probe waited before giving up
        waited: Duration,
    },

    /// The node process stopped on its own
    #[error("node process exited unexpectedly with status {status:?}")]
    NodeExited {
        /// Exit code reported by the node process, if it exited normally
        status: Option<i32>,
    },

    /// The deployment tool reported failure
    #[error("migration failed: deployment tool exited with status {status:?}")]
    MigrationFailed {
        /// Exit code reported by the deployment tool
        status: Option<i32>,
    },

    /// Process launching or signalling failed
    #[error("command execution error: {0}")]
    Runner(#[from] command_runner::Error),
}

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, Error>;
