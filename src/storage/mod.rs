//! Host record persistence.
//!
//! The sweep core talks to storage only through `HostStore`. Two
//! implementations share the same semantics: an in-memory `HostTable` and a
//! `JsonHostStore` that writes the table through to a JSON file.

mod json_store;
mod table;

pub use json_store::JsonHostStore;
pub use table::HostTable;

use crate::error::StorageResult;
use serde::{Deserialize, Serialize};

/// A discovered host, unique by IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Assigned by the store on create; 0 before that.
    pub id: i64,
    pub fqdn: String,
    pub ipv4_address: String,
    /// Open ports, comma-joined in scan order.
    pub ports_csv: String,
}

impl HostRecord {
    /// A record not yet persisted.
    pub fn new(
        fqdn: impl Into<String>,
        ipv4_address: impl Into<String>,
        ports_csv: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            fqdn: fqdn.into(),
            ipv4_address: ipv4_address.into(),
            ports_csv: ports_csv.into(),
        }
    }

    /// Port numbers parsed back out of `ports_csv`, skipping garbage.
    pub fn ports(&self) -> Vec<u16> {
        self.ports_csv
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect()
    }
}

/// Storage operations the sweep core and the admin commands rely on.
pub trait HostStore {
    /// Look up by IP. `StorageError::NotFound` when absent.
    fn get_by_ip(&self, ip: &str) -> StorageResult<HostRecord>;

    /// Insert a new record and assign its id. `StorageError::Duplicate` when
    /// the IP is already stored.
    fn create(&mut self, record: HostRecord) -> StorageResult<HostRecord>;

    /// Replace the fields of record `id`, keeping the id.
    /// `StorageError::UpdateFailed` when no such record exists.
    fn update(&mut self, id: i64, record: HostRecord) -> StorageResult<HostRecord>;

    /// All records, ordered by id.
    fn all(&self) -> StorageResult<Vec<HostRecord>>;

    /// Remove record `id`. `StorageError::DeleteFailed` when absent.
    fn delete(&mut self, id: i64) -> StorageResult<()>;
}
