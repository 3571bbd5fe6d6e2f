//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of sweep reports
//! and stored host records.

mod csv_format;
mod json_format;
mod plain;

pub use plain::{
    print_error, print_host_found, print_info, print_success, print_sweep_header, print_warning,
};

use crate::interfaces::LocalNetwork;
use crate::reconcile::ReconcileSummary;
use crate::scanner::ScanResult;
use crate::storage::HostRecord;
use crate::types::SweepId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

/// Output format for results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Everything one finished sweep produced.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub id: SweepId,
    /// The swept range as `a.b.c.d/n`.
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub addresses_scanned: usize,
    /// Addresses with at least one open port, in arrival order.
    pub hosts: Vec<ScanResult>,
    pub summary: ReconcileSummary,
}

impl SweepReport {
    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}

/// Print a sweep report in the requested format.
pub fn print_report(report: &SweepReport, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    write_report(&mut stdout.lock(), report, format)
}

pub fn write_report<W: Write>(
    out: &mut W,
    report: &SweepReport,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_summary(out, report),
        OutputFormat::Json => json_format::write_json(out, report),
        OutputFormat::Csv => csv_format::write_report_csv(out, report),
    }
}

/// Print stored host records in the requested format.
pub fn print_hosts(hosts: &[HostRecord], format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    write_hosts(&mut stdout.lock(), hosts, format)
}

pub fn write_hosts<W: Write>(
    out: &mut W,
    hosts: &[HostRecord],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_host_table(out, hosts),
        OutputFormat::Json => json_format::write_json(out, &hosts),
        OutputFormat::Csv => csv_format::write_hosts_csv(out, hosts),
    }
}

/// Print local IPv4 networks in the requested format.
pub fn print_networks(networks: &[LocalNetwork], format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    write_networks(&mut stdout.lock(), networks, format)
}

pub fn write_networks<W: Write>(
    out: &mut W,
    networks: &[LocalNetwork],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_network_table(out, networks),
        OutputFormat::Json => json_format::write_json(out, networks),
        OutputFormat::Csv => csv_format::write_networks_csv(out, networks),
    }
}
