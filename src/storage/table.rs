//! In-memory host table.

use super::{HostRecord, HostStore};
use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};

/// Host records keyed by id, unique by IPv4 address.
///
/// Ids start at 1, increase monotonically and are never reused, even after a
/// delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTable {
    next_id: i64,
    hosts: Vec<HostRecord>,
}

impl HostTable {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            hosts: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Repair a table read from disk: sort by id and make sure the counter
    /// is past every stored id.
    pub(crate) fn normalize(&mut self) {
        self.hosts.sort_by_key(|h| h.id);
        let max_id = self.hosts.iter().map(|h| h.id).max().unwrap_or(0);
        if self.next_id <= max_id {
            self.next_id = max_id + 1;
        }
        if self.next_id < 1 {
            self.next_id = 1;
        }
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.hosts.binary_search_by_key(&id, |h| h.id).ok()
    }
}

impl Default for HostTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HostStore for HostTable {
    fn get_by_ip(&self, ip: &str) -> StorageResult<HostRecord> {
        self.hosts
            .iter()
            .find(|h| h.ipv4_address == ip)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(ip.to_string()))
    }

    fn create(&mut self, mut record: HostRecord) -> StorageResult<HostRecord> {
        if self.hosts.iter().any(|h| h.ipv4_address == record.ipv4_address) {
            return Err(StorageError::Duplicate(record.ipv4_address));
        }

        record.id = self.next_id;
        self.next_id += 1;
        // Ids only grow, so pushing keeps the table sorted.
        self.hosts.push(record.clone());

        Ok(record)
    }

    fn update(&mut self, id: i64, mut record: HostRecord) -> StorageResult<HostRecord> {
        if id <= 0 {
            return Err(StorageError::InvalidId(id));
        }
        let index = self.position(id).ok_or(StorageError::UpdateFailed(id))?;

        if self
            .hosts
            .iter()
            .any(|h| h.id != id && h.ipv4_address == record.ipv4_address)
        {
            return Err(StorageError::Duplicate(record.ipv4_address));
        }

        record.id = id;
        self.hosts[index] = record.clone();

        Ok(record)
    }

    fn all(&self) -> StorageResult<Vec<HostRecord>> {
        Ok(self.hosts.clone())
    }

    fn delete(&mut self, id: i64) -> StorageResult<()> {
        let index = self.position(id).ok_or(StorageError::DeleteFailed(id))?;
        self.hosts.remove(index);
        Ok(())
    }
}
