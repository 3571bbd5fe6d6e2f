//! Error types for netsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Parse errors for user
//! input live next to the types they validate (`types::ParseError`,
//! `types::PortError`).

use crate::types::{ParseError, PortError};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a `HostStore`.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No record for this IP. A normal branch for reconciliation.
    #[error("no host record for {0}")]
    NotFound(String),

    /// A record with this IP already exists. A normal branch for reconciliation.
    #[error("host record for {0} already exists")]
    Duplicate(String),

    #[error("update failed: no host record with id {0}")]
    UpdateFailed(i64),

    #[error("delete failed: no host record with id {0}")]
    DeleteFailed(i64),

    #[error("invalid host record id: {0}")]
    InvalidId(i64),

    #[error("failed to load host store: {0}")]
    LoadFailed(String),

    #[error("failed to save host store: {0}")]
    SaveFailed(String),

    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from loading or saving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directories")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("invalid setting: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A persistence fault escalated by the sink under `FailurePolicy::Abort`.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("failed to persist {address}: {source}")]
    Persistence {
        address: Ipv4Addr,
        #[source]
        source: StorageError,
    },
}

/// Top-level error for the command line.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CLI handlers.
pub type CliResult<T> = Result<T, CliError>;
