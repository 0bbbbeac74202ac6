//! Integration tests for the devnet lifecycle, using process doubles
//! (coreutils) in place of the real node and deployment tool.

use async_net::TcpListener;
use command_runner::Command;
use devnet_orchestration::{DevnetConfig, DevnetOrchestrator, Error, MigrationRunner};
use std::path::Path;
use std::time::{Duration, Instant};

/// Config whose node/migration commands are harmless placeholders; tests
/// overwrite them with the doubles they need.
fn test_config(port: u16, timeout: Duration) -> DevnetConfig {
    let mut config = DevnetConfig::new("127.0.0.1", port, timeout, ".");
    config.node_command = Command::new("true");
    config.migrate_command = Command::new("true");
    config
}

/// Bind to an ephemeral port and release it again.
async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

fn marker_command(path: &Path) -> Command {
    let mut cmd = Command::new("touch");
    cmd.arg(path);
    cmd
}

#[smol_potat::test]
async fn test_migration_never_runs_tool_when_node_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("migrated");

    let port = free_port().await;
    let mut config = test_config(port, Duration::from_secs(1));
    config.migrate_command = marker_command(&marker);

    let result = MigrationRunner::new(&config).run().await;

    match result {
        Err(Error::NodeUnreachable {
            port: failed_port, ..
        }) => assert_eq!(failed_port, port),
        other => panic!("expected NodeUnreachable, got {:?}", other),
    }
    assert!(!marker.exists(), "deployment tool must not have been invoked");
}

#[smol_potat::test]
async fn test_migration_runs_tool_once_port_is_open() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("migrated");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut config = test_config(port, Duration::from_secs(10));
    config.migrate_command = marker_command(&marker);

    MigrationRunner::new(&config).run().await.unwrap();
    assert!(marker.exists());
}

#[smol_potat::test]
async fn test_node_failure_surfaces_as_node_exited() {
    let port = free_port().await;
    let mut config = test_config(port, Duration::from_secs(10));
    let mut node = Command::new("sh");
    node.arg("-c").arg("exit 1");
    config.node_command = node;

    let (_shutdown_tx, shutdown_rx) = async_channel::bounded(1);
    let result = DevnetOrchestrator::new(config).run(shutdown_rx).await;

    match result {
        Err(Error::NodeExited { status }) => assert_eq!(status, Some(1)),
        other => panic!("expected NodeExited, got {:?}", other),
    }
}

#[smol_potat::test]
async fn test_migration_failure_is_distinct_from_unreachable() {
    // A listener stands in for the node's RPC port so readiness succeeds.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut config = test_config(port, Duration::from_secs(10));
    let mut node = Command::new("sleep");
    node.arg("30");
    config.node_command = node;
    config.migrate_command = Command::new("false");

    let (_shutdown_tx, shutdown_rx) = async_channel::bounded(1);
    let start = Instant::now();
    let result = DevnetOrchestrator::new(config).run(shutdown_rx).await;

    match result {
        Err(Error::MigrationFailed { status }) => assert_eq!(status, Some(1)),
        other => panic!("expected MigrationFailed, got {:?}", other),
    }
    // The node double was stopped, not waited out.
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[smol_potat::test]
async fn test_orchestrator_fails_when_node_never_binds() {
    let port = free_port().await;
    let mut config = test_config(port, Duration::from_secs(1));
    let mut node = Command::new("sleep");
    node.arg("30");
    config.node_command = node;

    let (_shutdown_tx, shutdown_rx) = async_channel::bounded(1);
    let result = DevnetOrchestrator::new(config).run(shutdown_rx).await;

    assert!(matches!(result, Err(Error::NodeUnreachable { .. })));
}

#[smol_potat::test]
async fn test_shutdown_signal_ends_run_cleanly() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut config = test_config(port, Duration::from_secs(10));
    let mut node = Command::new("sleep");
    node.arg("30");
    config.node_command = node;

    let (shutdown_tx, shutdown_rx) = async_channel::bounded(1);
    // Queue the interrupt up front; the orchestrator only consumes it once
    // the migration has succeeded and the run is in its supervising phase.
    shutdown_tx.send(()).await.unwrap();

    let start = Instant::now();
    let result = DevnetOrchestrator::new(config).run(shutdown_rx).await;

    assert!(result.is_ok());
    assert!(start.elapsed() < Duration::from_secs(10));
}
