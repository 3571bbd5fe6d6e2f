//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use super::SweepReport;
use crate::interfaces::LocalNetwork;
use crate::scanner::ScanResult;
use crate::storage::HostRecord;
use crate::types::{PortSet, SweepId};
use console::style;
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print a sweep header before probing begins.
pub fn print_sweep_header(id: &SweepId, target: &str, addresses: usize, ports: &PortSet) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("netsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {} ({} addresses)",
        style("•").dim(),
        style(target).white().bold(),
        addresses
    );
    println!("{} Ports: {}", style("•").dim(), style(ports).yellow());
    println!("{} Sweep ID: {}", style("•").dim(), style(id.short()).dim());
    println!();
}

/// Print the block announcing one host with open ports.
pub fn print_host_found(result: &ScanResult) -> io::Result<()> {
    let stdout = io::stdout();
    write_host_found(&mut stdout.lock(), result)
}

pub(super) fn write_host_found<W: Write>(out: &mut W, result: &ScanResult) -> io::Result<()> {
    writeln!(
        out,
        " |-|-|-| :::: {} :::: |-|-|-|",
        style("HOST FOUND").green().bold()
    )?;
    writeln!(out, "==================||==================")?;
    writeln!(out, "{} {}", style("IPv4 Address:").bold(), result.address)?;
    writeln!(
        out,
        "{} {}",
        style("Fully Qualified Domain Name:").bold(),
        result.resolved_name
    )?;
    writeln!(
        out,
        "{} {}",
        style("Listening Ports:").bold(),
        style(result.ports_csv()).green()
    )?;
    writeln!(out, "=====================================")?;
    Ok(())
}

/// Summary block printed once the sweep has drained.
pub(super) fn write_summary<W: Write>(out: &mut W, report: &SweepReport) -> io::Result<()> {
    let summary = &report.summary;

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Sweep Summary",
        style("netsweep").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.target)?;
    writeln!(
        out,
        "  {} {}",
        style("Sweep ID:").bold(),
        style(report.id.short()).dim()
    )?;
    writeln!(
        out,
        "  {} {} addresses swept in {:.2}s",
        style("Statistics:").bold(),
        report.addresses_scanned,
        report.duration_ms() as f64 / 1000.0
    )?;
    writeln!(
        out,
        "              {} hosts found, {} created, {} updated, {} failed",
        style(summary.hosts_found()).green().bold(),
        summary.created,
        summary.updated,
        if summary.failed > 0 {
            style(summary.failed).red().bold()
        } else {
            style(summary.failed).dim()
        }
    )?;
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Table of stored host records.
pub(super) fn write_host_table<W: Write>(out: &mut W, hosts: &[HostRecord]) -> io::Result<()> {
    if hosts.is_empty() {
        writeln!(out, "  {}", style("No hosts stored.").dim())?;
        return Ok(());
    }

    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    writeln!(
        out,
        "  {:>5}  {:<15}  {:<24}  {}",
        style("ID").bold(),
        style("ADDRESS").bold(),
        style("NAME").bold(),
        style("PORTS").bold()
    )?;
    writeln!(out, "  {}", style(THIN_RULE).dim())?;

    for host in hosts {
        writeln!(
            out,
            "  {:>5}  {:<15}  {:<24}  {}",
            host.id,
            host.ipv4_address,
            truncate_string(&host.fqdn, 24),
            style(&host.ports_csv).green()
        )?;
    }

    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    Ok(())
}

/// Table of local IPv4 networks.
pub(super) fn write_network_table<W: Write>(
    out: &mut W,
    networks: &[LocalNetwork],
) -> io::Result<()> {
    if networks.is_empty() {
        writeln!(out, "  {}", style("No IPv4 interfaces found.").dim())?;
        return Ok(());
    }

    writeln!(
        out,
        "  {:<12}  {:<18}  {:<15}  {:<15}  {}",
        style("INTERFACE").bold(),
        style("ADDRESS").bold(),
        style("NETWORK").bold(),
        style("NETMASK").bold(),
        style("MAC").bold()
    )?;
    for net in networks {
        writeln!(
            out,
            "  {:<12}  {:<18}  {:<15}  {:<15}  {}",
            net.interface_name,
            style(net.cidr()).white().bold(),
            net.network_address,
            net.netmask,
            style(&net.mac_address).dim()
        )?;
    }
    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to at most `max_len` characters, adding an ellipsis if
/// truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
