//! devnet - boot a local contract-development environment
//!
//! Starts the blockchain test node, waits for its RPC port, deploys the
//! contracts against it, then keeps the node alive until interrupted.

use anyhow::Result;
use clap::Parser;
use devnet_orchestration::{DevnetConfig, DevnetOrchestrator};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "devnet")]
#[command(about = "Boot a local blockchain dev environment: test node plus contract migration", long_about = None)]
#[command(version)]
struct Args {
    /// Host the node binds to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port the node serves RPC on
    #[arg(short, long, default_value = "8545")]
    port: u16,

    /// Seconds to wait for the node to accept connections
    #[arg(short, long, default_value = "60")]
    timeout: u64,

    /// Directory containing the contract project
    #[arg(short, long, default_value = "core")]
    dir: PathBuf,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();
    let config = DevnetConfig::new(
        args.host,
        args.port,
        Duration::from_secs(args.timeout),
        &args.dir,
    );

    let shutdown = shutdown_channel()?;

    // Run with smol
    smol::block_on(async {
        DevnetOrchestrator::new(config).run(shutdown).await?;
        info!("devnet stopped");
        Ok(())
    })
}

/// Bridge SIGINT/SIGTERM into a channel the orchestrator can await
fn shutdown_channel() -> Result<async_channel::Receiver<()>> {
    let (tx, rx) = async_channel::bounded(1);

    #[cfg(unix)]
    {
        use signal_hook::{
            consts::{SIGINT, SIGTERM},
            iterator::Signals,
        };

        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        std::thread::spawn(move || {
            for sig in signals.forever() {
                info!("received signal {}", sig);
                if tx.send_blocking(()).is_err() {
                    break;
                }
            }
        });
    }

    #[cfg(not(unix))]
    {
        // No signal bridge off Unix; keep the channel open so the run stays
        // up instead of treating a closed channel as an interrupt.
        std::mem::forget(tx);
    }

    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["devnet"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 8545);
        assert_eq!(args.timeout, 60);
        assert_eq!(args.dir, PathBuf::from("core"));
    }
}
