//! Local IPv4 networks, for choosing what to sweep.

use crate::types::{netmask, network_of, AddressRange, ParseError};
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// One IPv4 address bound to a local interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalNetwork {
    pub interface_name: String,
    /// Empty when the interface has no hardware address (e.g. loopback).
    pub mac_address: String,
    pub host_address: Ipv4Addr,
    pub network_address: Ipv4Addr,
    pub prefix: u8,
    /// Dotted-quad form of `prefix`.
    pub netmask: Ipv4Addr,
}

impl LocalNetwork {
    pub fn new(
        interface_name: impl Into<String>,
        mac_address: impl Into<String>,
        host_address: Ipv4Addr,
        prefix: u8,
    ) -> Self {
        Self {
            interface_name: interface_name.into(),
            mac_address: mac_address.into(),
            host_address,
            network_address: network_of(host_address, prefix),
            prefix,
            netmask: netmask(prefix),
        }
    }

    /// `host/prefix`, the form a sweep target takes.
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.host_address, self.prefix)
    }

    /// Enumerate this network starting at the local host address.
    pub fn address_range(&self) -> Result<AddressRange, ParseError> {
        AddressRange::new(self.host_address, self.prefix)
    }
}

impl fmt::Display for LocalNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (network {}, mask {})",
            self.interface_name,
            self.cidr(),
            self.network_address,
            self.netmask
        )
    }
}

/// Every IPv4 address on every local interface, in interface order.
pub fn local_networks() -> Vec<LocalNetwork> {
    datalink::interfaces()
        .iter()
        .flat_map(networks_of)
        .collect()
}

/// The IPv4 networks of the interface called `name`.
pub fn networks_for(name: &str) -> Vec<LocalNetwork> {
    datalink::interfaces()
        .iter()
        .filter(|iface| iface.name == name)
        .flat_map(networks_of)
        .collect()
}

fn networks_of(iface: &NetworkInterface) -> Vec<LocalNetwork> {
    let mac = iface.mac.map(|m| m.to_string()).unwrap_or_default();

    iface
        .ips
        .iter()
        .filter_map(|ip| match ip {
            IpNetwork::V4(net) => Some(LocalNetwork::new(
                iface.name.clone(),
                mac.clone(),
                net.ip(),
                net.prefix(),
            )),
            IpNetwork::V6(_) => None,
        })
        .collect()
}
