//! TCP connect probe.
//!
//! Performs a full TCP handshake against one `address:port` and closes the
//! connection immediately without sending or reading anything.

use crate::scanner::traits::{ProbeOutcome, Prober};
use crate::types::Port;
use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// TCP connect probe.
///
/// Uses standard socket connect() calls. Does not require elevated privileges.
/// One attempt per call, no retries.
#[derive(Debug, Clone)]
pub struct TcpConnectProbe {
    timeout: Duration,
}

impl TcpConnectProbe {
    /// Fixed connect timeout used unless configured otherwise.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpConnectProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpConnectProbe {
    async fn probe(&self, address: Ipv4Addr, port: Port) -> ProbeOutcome {
        let addr = SocketAddr::V4(SocketAddrV4::new(address, port.as_u16()));

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                ProbeOutcome::Open
            }
            Ok(Err(e)) => {
                tracing::trace!(%addr, error = %e, "connect failed");
                ProbeOutcome::NotOpen
            }
            Err(_) => {
                tracing::trace!(
                    %addr,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "connect timed out"
                );
                ProbeOutcome::NotOpen
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
