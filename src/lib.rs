//! # netsweep - local subnet host discovery
//!
//! Sweeps every address of an IPv4 subnet, probes a fixed, ordered list of TCP
//! ports on each, reverse-resolves its name and reconciles the hosts with
//! open ports into a persistent host table keyed by IPv4 address.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use netsweep::reconcile::{FailurePolicy, ReconciliationSink};
//! use netsweep::scanner::{DnsResolver, SweepConfig, SweepCoordinator, TcpConnectProbe};
//! use netsweep::storage::HostTable;
//! use netsweep::types::{AddressRange, PortSet};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let range: AddressRange = "192.168.1.0/24".parse().unwrap();
//!     let coordinator = SweepCoordinator::new(
//!         Arc::new(TcpConnectProbe::default()),
//!         Arc::new(DnsResolver::from_system()),
//!         SweepConfig::default(),
//!     );
//!
//!     let rx = coordinator.run(range.into_addresses(), PortSet::default());
//!     let mut sink = ReconciliationSink::new(HostTable::new(), FailurePolicy::Continue);
//!     let summary = sink.drain(rx).await.unwrap();
//!
//!     println!("{} hosts found", summary.hosts_found());
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Address ranges, ports and sweep ids
//! - [`scanner`] - Port probes, name lookup and the sweep coordinator
//! - [`reconcile`] - Turning scan results into host records
//! - [`storage`] - The `HostStore` trait and its implementations
//! - [`interfaces`] - Local IPv4 networks
//! - [`config`] - Settings and XDG paths
//! - [`output`] - Plain, JSON and CSV rendering
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod output;
pub mod reconcile;
pub mod scanner;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ReconcileError, StorageError};
pub use reconcile::{FailurePolicy, ReconcileSummary, ReconciliationSink};
pub use scanner::{NameResolver, Prober, ScanResult, SweepConfig, SweepCoordinator};
pub use storage::{HostRecord, HostStore};
pub use types::{AddressRange, Port, PortSet, SweepId};
