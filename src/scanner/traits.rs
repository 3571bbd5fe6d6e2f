//! Scanner trait abstraction.
//!
//! `Prober` answers "is this port open?" for one address and `NameResolver`
//! performs reverse lookups. The sweep coordinator only talks to these traits,
//! which keeps it testable without a network.

use crate::types::{Port, PortSet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Outcome of a single connect attempt.
///
/// Refused, timed out and unreachable all collapse into `NotOpen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    Open,
    NotOpen,
}

impl ProbeOutcome {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::NotOpen => write!(f, "not open"),
        }
    }
}

/// What a sweep learned about one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub address: Ipv4Addr,
    /// Reverse-lookup names joined with ", ", or a placeholder.
    pub resolved_name: String,
    /// Open ports, in `PortSet` order.
    pub open_ports: Vec<Port>,
}

impl ScanResult {
    pub fn new(address: Ipv4Addr, resolved_name: impl Into<String>, open_ports: Vec<Port>) -> Self {
        Self {
            address,
            resolved_name: resolved_name.into(),
            open_ports,
        }
    }

    pub fn has_open_ports(&self) -> bool {
        !self.open_ports.is_empty()
    }

    /// Open ports as a comma-joined string in scan order, e.g. `"80,8080"`.
    pub fn ports_csv(&self) -> String {
        let parts: Vec<String> = self.open_ports.iter().map(|p| p.to_string()).collect();
        parts.join(",")
    }
}

/// Trait for port probe implementations.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Attempt one connection to `address:port`.
    ///
    /// Never fails: every error is reported as `ProbeOutcome::NotOpen`.
    async fn probe(&self, address: Ipv4Addr, port: Port) -> ProbeOutcome;

    /// Probe every port of `ports` in order, one after another.
    ///
    /// Returns the open ports in the order they appear in `ports`.
    async fn walk(&self, address: Ipv4Addr, ports: &PortSet) -> Vec<Port> {
        let mut open = Vec::new();
        for port in ports.iter() {
            if self.probe(address, port).await.is_open() {
                open.push(port);
            }
        }
        open
    }

    /// Per-attempt connect timeout.
    fn timeout(&self) -> Duration;
}

/// Trait for reverse-name resolution.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve `address` to a display name.
    ///
    /// Never fails: lookup errors produce a placeholder string.
    async fn reverse_lookup(&self, address: Ipv4Addr) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Probes succeed for a fixed set of ports and record the probe order.
    struct FixedProber {
        open: HashSet<u16>,
        seen: Mutex<Vec<u16>>,
    }

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, _address: Ipv4Addr, port: Port) -> ProbeOutcome {
            self.seen.lock().unwrap().push(port.as_u16());
            tokio::time::sleep(Duration::from_millis(u64::from(port.as_u16() % 5))).await;
            if self.open.contains(&port.as_u16()) {
                ProbeOutcome::Open
            } else {
                ProbeOutcome::NotOpen
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(4)
        }
    }

    #[tokio::test]
    async fn test_walk_preserves_port_set_order() {
        let prober = FixedProber {
            open: [80, 8080].into_iter().collect(),
            seen: Mutex::new(Vec::new()),
        };
        let ports: PortSet = "22,80,443,8080".parse().unwrap();

        let open = prober.walk(Ipv4Addr::LOCALHOST, &ports).await;

        let open: Vec<u16> = open.into_iter().map(u16::from).collect();
        assert_eq!(open, vec![80, 8080]);
        assert_eq!(*prober.seen.lock().unwrap(), vec![22, 80, 443, 8080]);
    }

    #[tokio::test]
    async fn test_walk_nothing_open() {
        let prober = FixedProber {
            open: HashSet::new(),
            seen: Mutex::new(Vec::new()),
        };
        let open = prober.walk(Ipv4Addr::LOCALHOST, &PortSet::default()).await;
        assert!(open.is_empty());
        assert_eq!(prober.seen.lock().unwrap().len(), PortSet::default().len());
    }

    #[test]
    fn test_ports_csv() {
        let ports = [80, 8080, 22].into_iter().filter_map(Port::new).collect();
        let result = ScanResult::new(Ipv4Addr::new(10, 0, 0, 1), "host.lan", ports);
        assert_eq!(result.ports_csv(), "80,8080,22");
        assert!(result.has_open_ports());

        let empty = ScanResult::new(Ipv4Addr::new(10, 0, 0, 2), "", Vec::new());
        assert_eq!(empty.ports_csv(), "");
        assert!(!empty.has_open_ports());
    }

    #[test]
    fn test_probe_outcome_display() {
        assert_eq!(ProbeOutcome::Open.to_string(), "open");
        assert_eq!(ProbeOutcome::NotOpen.to_string(), "not open");
        assert!(ProbeOutcome::Open.is_open());
        assert!(!ProbeOutcome::NotOpen.is_open());
    }
}
