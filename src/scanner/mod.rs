//! Scanner module - probes, reverse lookups and the concurrent sweep.
//!
//! A sweep fans out one tokio task per address (bounded by
//! `SweepConfig::max_in_flight`); each task walks the port set with a
//! `Prober`, resolves the address with a `NameResolver` and publishes a
//! `ScanResult` on a channel that closes once every address has reported.

pub mod resolver;
pub mod sweep;
pub mod tcp;
pub mod traits;

pub use resolver::{DnsResolver, UNRESOLVED_NAME};
pub use sweep::{scan_address, SweepConfig, SweepCoordinator};
pub use tcp::TcpConnectProbe;
pub use traits::{NameResolver, ProbeOutcome, Prober, ScanResult};
