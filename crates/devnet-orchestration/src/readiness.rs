//! TCP readiness probing
//!
//! A freshly spawned node process is not usable until its RPC port accepts
//! connections; spawn completion says nothing about listen readiness. This
//! module polls the port with short-lived connects until it opens or a
//! deadline passes.

use async_io::Timer;
use async_net::TcpStream;
use futures_lite::future;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Pause between connection attempts
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

// Per-attempt cap; must stay below POLL_INTERVAL so a hung connect cannot
// push the loop past its deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// Wait until `host:port` accepts TCP connections
///
/// Returns `true` as soon as one probe connection succeeds, `false` once
/// `timeout` has elapsed without a successful connect. Refused or timed-out
/// attempts count as "not ready yet", never as errors.
pub async fn wait_for_port(host: &str, port: u16, timeout: Duration) -> bool {
    let addr = format!("{}:{}", host, port);
    let deadline = Instant::now() + timeout;

    loop {
        if try_connect(&addr).await {
            debug!("{} is accepting connections", addr);
            return true;
        }

        if Instant::now() >= deadline {
            debug!("{} did not open within {:?}", addr, timeout);
            return false;
        }

        Timer::after(POLL_INTERVAL).await;
    }
}

/// One bounded connect attempt; the probe connection is dropped immediately
async fn try_connect(addr: &str) -> bool {
    future::or(
        async {
            match TcpStream::connect(addr).await {
                Ok(_) => true,
                Err(e) => {
                    trace!("probe of {} failed: {}", addr, e);
                    false
                }
            }
        },
        async {
            Timer::after(CONNECT_TIMEOUT).await;
            false
        },
    )
    .await
}
