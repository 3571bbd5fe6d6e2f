//! Configuration management for netsweep.
//!
//! Provides XDG-compliant paths and the persisted application settings.

mod settings;

pub use settings::{AppSettings, Paths};
