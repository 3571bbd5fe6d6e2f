//! Sweep coordination.
//!
//! One task per address walks the port set, resolves the address name and
//! publishes a `ScanResult` on a shared channel. A semaphore caps how many
//! address tasks are in flight; a `JoinSet` is the completion barrier, and
//! the channel closes only once every task has finished publishing.

use crate::scanner::traits::{NameResolver, Prober, ScanResult};
use crate::types::{PortSet, SweepId};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::Instrument;

/// Limits for a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Maximum address tasks running at once.
    pub max_in_flight: usize,
    /// Buffered results before producers wait on the consumer.
    pub channel_capacity: usize,
}

impl SweepConfig {
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

    pub fn new(max_in_flight: usize, channel_capacity: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            channel_capacity: channel_capacity.max(1),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_IN_FLIGHT, Self::DEFAULT_CHANNEL_CAPACITY)
    }
}

/// Fans a sweep out across addresses.
#[derive(Clone)]
pub struct SweepCoordinator {
    prober: Arc<dyn Prober>,
    resolver: Arc<dyn NameResolver>,
    config: SweepConfig,
}

impl SweepCoordinator {
    pub fn new(
        prober: Arc<dyn Prober>,
        resolver: Arc<dyn NameResolver>,
        config: SweepConfig,
    ) -> Self {
        Self {
            prober,
            resolver,
            config,
        }
    }

    pub fn config(&self) -> SweepConfig {
        self.config
    }

    /// Connect timeout of the underlying prober.
    pub fn probe_timeout(&self) -> Duration {
        self.prober.timeout()
    }

    /// Start sweeping `addresses` with `ports`.
    ///
    /// Returns immediately with the receiving end of the result channel. The
    /// receiver yields exactly one `ScanResult` per address, in completion
    /// order, then `None`. Must be called from within a tokio runtime.
    pub fn run(&self, addresses: Vec<Ipv4Addr>, ports: PortSet) -> mpsc::Receiver<ScanResult> {
        self.run_with_id(SweepId::new(), addresses, ports)
    }

    /// As `run`, tagging log output with a caller-chosen id.
    pub fn run_with_id(
        &self,
        id: SweepId,
        addresses: Vec<Ipv4Addr>,
        ports: PortSet,
    ) -> mpsc::Receiver<ScanResult> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let span = tracing::info_span!("sweep", id = %id.short());

        tokio::spawn(
            drive(
                Arc::clone(&self.prober),
                Arc::clone(&self.resolver),
                self.config,
                addresses,
                Arc::new(ports),
                tx,
            )
            .instrument(span),
        );

        rx
    }
}

/// Spawn every address task, wait for all of them, then close the channel.
async fn drive(
    prober: Arc<dyn Prober>,
    resolver: Arc<dyn NameResolver>,
    config: SweepConfig,
    addresses: Vec<Ipv4Addr>,
    ports: Arc<PortSet>,
    tx: mpsc::Sender<ScanResult>,
) {
    let started = Instant::now();
    let total = addresses.len();
    tracing::info!(
        addresses = total,
        ports = ports.len(),
        max_in_flight = config.max_in_flight,
        probe_timeout_ms = prober.timeout().as_millis() as u64,
        "sweep started"
    );

    let permits = Arc::new(Semaphore::new(config.max_in_flight));
    let mut tasks = JoinSet::new();

    for address in addresses {
        // Admission control: wait for a free slot before spawning.
        let permit = match Arc::clone(&permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let prober = Arc::clone(&prober);
        let resolver = Arc::clone(&resolver);
        let ports = Arc::clone(&ports);
        let tx = tx.clone();

        tasks.spawn(
            async move {
                let result =
                    scan_address(prober.as_ref(), resolver.as_ref(), address, &ports).await;
                // Release the slot before a possibly slow hand-off to the consumer.
                drop(permit);
                if tx.send(result).await.is_err() {
                    tracing::debug!(%address, "result receiver dropped");
                }
            }
            .in_current_span(),
        );

        // Reap finished tasks as we go so the set stays small.
        while let Some(joined) = tasks.try_join_next() {
            log_join(joined);
        }
    }

    while let Some(joined) = tasks.join_next().await {
        log_join(joined);
    }

    // Every task has published; dropping the last sender closes the channel.
    drop(tx);

    tracing::info!(
        addresses = total,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "sweep finished"
    );
}

/// Walk the ports of one address, then resolve its name.
///
/// The reverse lookup runs even when nothing is open.
pub async fn scan_address(
    prober: &dyn Prober,
    resolver: &dyn NameResolver,
    address: Ipv4Addr,
    ports: &PortSet,
) -> ScanResult {
    let open_ports = prober.walk(address, ports).await;
    let resolved_name = resolver.reverse_lookup(address).await;

    tracing::debug!(%address, open = open_ports.len(), name = %resolved_name, "address scanned");

    ScanResult::new(address, resolved_name, open_ports)
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "address task failed");
    }
}
