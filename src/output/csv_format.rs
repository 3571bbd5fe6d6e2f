//! CSV output formatting.

use super::SweepReport;
use crate::interfaces::LocalNetwork;
use crate::storage::HostRecord;
use std::io::{self, Write};

/// One row per host found, ports joined with `;` inside their column.
pub fn write_report_csv<W: Write>(out: &mut W, report: &SweepReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["sweep_id", "address", "resolved_name", "open_ports"])?;

    let id = report.id.to_string();
    for host in &report.hosts {
        let ports: Vec<String> = host.open_ports.iter().map(|p| p.to_string()).collect();
        wtr.write_record([
            id.as_str(),
            host.address.to_string().as_str(),
            host.resolved_name.as_str(),
            ports.join(";").as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_hosts_csv<W: Write>(out: &mut W, hosts: &[HostRecord]) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["id", "ipv4_address", "fqdn", "ports"])?;
    for host in hosts {
        wtr.write_record([
            host.id.to_string().as_str(),
            host.ipv4_address.as_str(),
            host.fqdn.as_str(),
            host.ports_csv.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_networks_csv<W: Write>(out: &mut W, networks: &[LocalNetwork]) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["interface", "mac", "address", "network", "prefix", "netmask"])?;
    for net in networks {
        wtr.write_record([
            net.interface_name.as_str(),
            net.mac_address.as_str(),
            net.host_address.to_string().as_str(),
            net.network_address.to_string().as_str(),
            net.prefix.to_string().as_str(),
            net.netmask.to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
