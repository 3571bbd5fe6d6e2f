//! Reconciliation of sweep results into storage.
//!
//! The sink is the only consumer of a sweep's result channel and the only
//! writer to the `HostStore`. Results without open ports are dropped without
//! touching storage; the rest are upserted by IPv4 address.

use crate::error::{ReconcileError, StorageError, StorageResult};
use crate::scanner::ScanResult;
use crate::storage::{HostRecord, HostStore};
use serde::Serialize;
use tokio::sync::mpsc;

/// What to do when storage fails on a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure, count it and keep draining.
    #[default]
    Continue,
    /// Stop draining and hand the error back to the caller.
    Abort,
}

/// Outcome of reconciling one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// No open ports; storage was not touched.
    Skipped,
    Created(HostRecord),
    Updated(HostRecord),
}

/// Counters for one drained sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub received: usize,
    pub skipped: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

impl ReconcileSummary {
    /// Results that had at least one open port.
    pub fn hosts_found(&self) -> usize {
        self.received - self.skipped
    }
}

/// Consumes `ScanResult`s and upserts them into a `HostStore`.
pub struct ReconciliationSink<S> {
    store: S,
    policy: FailurePolicy,
    summary: ReconcileSummary,
}

impl<S: HostStore> ReconciliationSink<S> {
    pub fn new(store: S, policy: FailurePolicy) -> Self {
        Self {
            store,
            policy,
            summary: ReconcileSummary::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn summary(&self) -> ReconcileSummary {
        self.summary
    }

    /// Reconcile one result and apply the failure policy to any storage error.
    ///
    /// Under `Continue` a failed result is logged and reported as `Ok(None)`;
    /// under `Abort` it is returned as an error.
    pub fn accept(&mut self, result: &ScanResult) -> Result<Option<Reconciled>, ReconcileError> {
        self.summary.received += 1;

        match self.reconcile(result) {
            Ok(outcome) => {
                match &outcome {
                    Reconciled::Skipped => self.summary.skipped += 1,
                    Reconciled::Created(record) => {
                        self.summary.created += 1;
                        tracing::info!(
                            id = record.id,
                            ip = %record.ipv4_address,
                            ports = %record.ports_csv,
                            "host created"
                        );
                    }
                    Reconciled::Updated(record) => {
                        self.summary.updated += 1;
                        tracing::info!(
                            id = record.id,
                            ip = %record.ipv4_address,
                            ports = %record.ports_csv,
                            "host updated"
                        );
                    }
                }
                Ok(Some(outcome))
            }
            Err(source) => {
                self.summary.failed += 1;
                match self.policy {
                    FailurePolicy::Continue => {
                        tracing::error!(
                            address = %result.address,
                            error = %source,
                            "failed to persist host, continuing"
                        );
                        Ok(None)
                    }
                    FailurePolicy::Abort => {
                        tracing::error!(
                            address = %result.address,
                            error = %source,
                            "failed to persist host, aborting"
                        );
                        Err(ReconcileError::Persistence {
                            address: result.address,
                            source,
                        })
                    }
                }
            }
        }
    }

    /// Upsert one result by IP, without applying the failure policy.
    pub fn reconcile(&mut self, result: &ScanResult) -> StorageResult<Reconciled> {
        if !result.has_open_ports() {
            return Ok(Reconciled::Skipped);
        }

        let incoming = HostRecord::new(
            result.resolved_name.clone(),
            result.address.to_string(),
            result.ports_csv(),
        );

        match self.store.get_by_ip(&incoming.ipv4_address) {
            Ok(existing) => self.store.update(existing.id, incoming).map(Reconciled::Updated),
            Err(StorageError::NotFound(_)) => match self.store.create(incoming.clone()) {
                Ok(created) => Ok(Reconciled::Created(created)),
                // Inserted since the lookup: fall back to an update.
                Err(StorageError::Duplicate(_)) => {
                    let existing = self.store.get_by_ip(&incoming.ipv4_address)?;
                    self.store.update(existing.id, incoming).map(Reconciled::Updated)
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Consume the channel until it closes.
    ///
    /// Suspends while the channel is empty. Under `FailurePolicy::Abort` the
    /// first storage fault ends the drain; dropping the receiver then lets the
    /// remaining producers finish without blocking.
    pub async fn drain(
        &mut self,
        mut results: mpsc::Receiver<ScanResult>,
    ) -> Result<ReconcileSummary, ReconcileError> {
        while let Some(result) = results.recv().await {
            self.accept(&result)?;
        }

        tracing::info!(
            received = self.summary.received,
            created = self.summary.created,
            updated = self.summary.updated,
            failed = self.summary.failed,
            "reconciliation finished"
        );

        Ok(self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HostTable;
    use crate::types::Port;
    use std::cell::Cell;
    use std::net::Ipv4Addr;

    fn result(last_octet: u8, name: &str, ports: &[u16]) -> ScanResult {
        ScanResult::new(
            Ipv4Addr::new(192, 168, 1, last_octet),
            name,
            ports.iter().copied().filter_map(Port::new).collect(),
        )
    }

    /// Fails every call with an unexpected error, counting calls.
    #[derive(Default)]
    struct BrokenStore {
        calls: Cell<usize>,
    }

    impl HostStore for BrokenStore {
        fn get_by_ip(&self, _ip: &str) -> StorageResult<HostRecord> {
            self.calls.set(self.calls.get() + 1);
            Err(StorageError::LoadFailed("disk on fire".to_string()))
        }

        fn create(&mut self, _record: HostRecord) -> StorageResult<HostRecord> {
            self.calls.set(self.calls.get() + 1);
            Err(StorageError::SaveFailed("disk on fire".to_string()))
        }

        fn update(&mut self, _id: i64, _record: HostRecord) -> StorageResult<HostRecord> {
            self.calls.set(self.calls.get() + 1);
            Err(StorageError::SaveFailed("disk on fire".to_string()))
        }

        fn all(&self) -> StorageResult<Vec<HostRecord>> {
            self.calls.set(self.calls.get() + 1);
            Ok(Vec::new())
        }

        fn delete(&mut self, _id: i64) -> StorageResult<()> {
            self.calls.set(self.calls.get() + 1);
            Err(StorageError::DeleteFailed(0))
        }
    }

    /// Reports NotFound on lookup but Duplicate on create, like a record
    /// inserted by someone else in between.
    struct RacingStore {
        inner: HostTable,
        hide_from_lookup: bool,
    }

    impl HostStore for RacingStore {
        fn get_by_ip(&self, ip: &str) -> StorageResult<HostRecord> {
            if self.hide_from_lookup {
                Err(StorageError::NotFound(ip.to_string()))
            } else {
                self.inner.get_by_ip(ip)
            }
        }

        fn create(&mut self, record: HostRecord) -> StorageResult<HostRecord> {
            self.hide_from_lookup = false;
            self.inner.create(record)
        }

        fn update(&mut self, id: i64, record: HostRecord) -> StorageResult<HostRecord> {
            self.inner.update(id, record)
        }

        fn all(&self) -> StorageResult<Vec<HostRecord>> {
            self.inner.all()
        }

        fn delete(&mut self, id: i64) -> StorageResult<()> {
            self.inner.delete(id)
        }
    }

    #[test]
    fn test_first_sighting_creates() {
        let mut sink = ReconciliationSink::new(HostTable::new(), FailurePolicy::Continue);

        let outcome = sink.reconcile(&result(10, "printer.lan", &[80, 8080])).unwrap();

        match outcome {
            Reconciled::Created(record) => {
                assert_eq!(record.id, 1);
                assert_eq!(record.fqdn, "printer.lan");
                assert_eq!(record.ipv4_address, "192.168.1.10");
                assert_eq!(record.ports_csv, "80,8080");
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[test]
    fn test_resighting_updates_in_place() {
        let mut sink = ReconciliationSink::new(HostTable::new(), FailurePolicy::Continue);

        sink.accept(&result(10, "old.lan", &[22, 80])).unwrap();
        let second = sink.accept(&result(10, "new.lan", &[443])).unwrap();
        assert!(matches!(second, Some(Reconciled::Updated(_))));

        let all = sink.store().all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].fqdn, "new.lan");
        assert_eq!(all[0].ports_csv, "443");
        assert_eq!(
            sink.summary(),
            ReconcileSummary {
                received: 2,
                created: 1,
                updated: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_no_open_ports_never_touches_storage() {
        let mut sink = ReconciliationSink::new(BrokenStore::default(), FailurePolicy::Abort);

        let outcome = sink.accept(&result(3, "quiet.lan", &[])).unwrap();

        assert_eq!(outcome, Some(Reconciled::Skipped));
        assert_eq!(sink.store().calls.get(), 0);
        assert_eq!(sink.summary().skipped, 1);
        assert_eq!(sink.summary().hosts_found(), 0);
    }

    #[test]
    fn test_duplicate_on_create_falls_back_to_update() {
        let mut inner = HostTable::new();
        inner
            .create(HostRecord::new("first.lan", "192.168.1.20", "22"))
            .unwrap();
        let store = RacingStore {
            inner,
            hide_from_lookup: true,
        };
        let mut sink = ReconciliationSink::new(store, FailurePolicy::Abort);

        let outcome = sink.reconcile(&result(20, "second.lan", &[80])).unwrap();

        assert!(matches!(outcome, Reconciled::Updated(ref r) if r.id == 1 && r.ports_csv == "80"));
        assert_eq!(sink.into_store().inner.len(), 1);
    }

    #[test]
    fn test_continue_policy_counts_failures() {
        let mut sink = ReconciliationSink::new(BrokenStore::default(), FailurePolicy::Continue);

        assert_eq!(sink.accept(&result(1, "a", &[22])).unwrap(), None);
        assert_eq!(sink.accept(&result(2, "b", &[80])).unwrap(), None);
        assert_eq!(sink.summary().failed, 2);
    }

    #[test]
    fn test_abort_policy_returns_error() {
        let mut sink = ReconciliationSink::new(BrokenStore::default(), FailurePolicy::Abort);

        let err = sink.accept(&result(1, "a", &[22])).unwrap_err();
        let ReconcileError::Persistence { address, source } = err;
        assert_eq!(address, Ipv4Addr::new(192, 168, 1, 1));
        assert!(matches!(source, StorageError::LoadFailed(_)));
    }

    #[tokio::test]
    async fn test_drain_until_closed() {
        let (tx, rx) = mpsc::channel(2);
        let producer = tokio::spawn(async move {
            let scans = [(1u8, vec![22u16]), (2, vec![]), (1, vec![80, 443]), (3, vec![53])];
            for (octet, ports) in scans {
                tx.send(result(octet, "host", &ports)).await.unwrap();
            }
        });

        let mut sink = ReconciliationSink::new(HostTable::new(), FailurePolicy::Continue);
        let summary = sink.drain(rx).await.unwrap();
        producer.await.unwrap();

        assert_eq!(summary.received, 4);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(sink.store().get_by_ip("192.168.1.1").unwrap().ports_csv, "80,443");
    }

    #[tokio::test]
    async fn test_drain_aborts_on_fault() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(result(1, "a", &[22])).await.unwrap();
        tx.send(result(2, "b", &[22])).await.unwrap();
        drop(tx);

        let mut sink = ReconciliationSink::new(BrokenStore::default(), FailurePolicy::Abort);
        assert!(sink.drain(rx).await.is_err());
        assert_eq!(sink.summary().received, 1);
    }
}
