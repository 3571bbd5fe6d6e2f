//! Subnet enumeration from a seed address and prefix length.
//!
//! Enumeration starts at the seed and walks forward one address at a time
//! until the next candidate leaves the seed's network. Addresses below the
//! seed are never produced, so `10.0.0.5/24` yields `10.0.0.5..=10.0.0.255`.

use ipnetwork::Ipv4Network;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Longest IPv4 prefix.
pub const IPV4_BITS: u8 = 32;

/// Error type for seed/prefix parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IPv4 address: '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix length: '{0}'")]
    InvalidPrefix(String),
    #[error("prefix length {0} is out of range (0-32)")]
    PrefixOutOfRange(u8),
    #[error("missing prefix length in '{0}' (expected a.b.c.d/n)")]
    MissingPrefix(String),
}

/// The addresses of one subnet, from the seed forward.
///
/// Invariants: `addresses[0] == seed`, and every address shares the seed's
/// network under `prefix_len`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRange {
    seed: Ipv4Addr,
    prefix_len: u8,
    addresses: Vec<Ipv4Addr>,
}

impl AddressRange {
    /// Enumerate the subnet of `seed` under `prefix_len`.
    pub fn new(seed: Ipv4Addr, prefix_len: u8) -> Result<Self, ParseError> {
        let network = Ipv4Network::new(seed, prefix_len)
            .map_err(|_| ParseError::PrefixOutOfRange(prefix_len))?;
        let mask = u32::from(network.mask());
        let network_addr = u32::from(network.network());

        // Upper bound on iterations: the whole network can never be exceeded.
        let limit = Self::span(prefix_len);

        let mut addresses = vec![seed];
        let mut last = u32::from(seed);

        while (addresses.len() as u64) < limit {
            let Some(next) = last.checked_add(1) else {
                break;
            };
            if next & mask != network_addr {
                break;
            }
            addresses.push(Ipv4Addr::from(next));
            last = next;
        }

        Ok(Self {
            seed,
            prefix_len,
            addresses,
        })
    }

    /// Number of addresses in a network of this prefix length.
    pub fn span(prefix_len: u8) -> u64 {
        let host_bits = u32::from(IPV4_BITS.saturating_sub(prefix_len));
        1u64 << host_bits
    }

    /// How many addresses `new(seed, prefix_len)` would produce, without
    /// enumerating them.
    pub fn expected_len(seed: Ipv4Addr, prefix_len: u8) -> Result<u64, ParseError> {
        let network = Ipv4Network::new(seed, prefix_len)
            .map_err(|_| ParseError::PrefixOutOfRange(prefix_len))?;
        let last = u64::from(u32::from(network.broadcast()));
        Ok(last - u64::from(u32::from(seed)) + 1)
    }

    /// Parse a seed literal and prefix length given separately.
    pub fn parse_parts(seed: &str, prefix: &str) -> Result<Self, ParseError> {
        let (seed, prefix_len) = parse_seed_prefix(seed, prefix)?;
        Self::new(seed, prefix_len)
    }

    pub fn seed(&self) -> Ipv4Addr {
        self.seed
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// The enumerated addresses, seed first.
    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.addresses
    }

    pub fn into_addresses(self) -> Vec<Ipv4Addr> {
        self.addresses
    }

    /// The network address shared by every member.
    pub fn network(&self) -> Ipv4Addr {
        network_of(self.seed, self.prefix_len)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Never true: the seed is always present.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Parses `a.b.c.d/n`.
impl FromStr for AddressRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (seed, prefix_len) = parse_cidr(s)?;
        Self::new(seed, prefix_len)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.seed, self.prefix_len)
    }
}

/// Enumerate the subnet of `seed` under `prefix_len`, both given as text.
pub fn enumerate(seed: &str, prefix_len: u8) -> Result<AddressRange, ParseError> {
    let seed: Ipv4Addr = seed
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidAddress(seed.to_string()))?;
    AddressRange::new(seed, prefix_len)
}

/// Split and validate `a.b.c.d/n` without enumerating it.
pub fn parse_cidr(s: &str) -> Result<(Ipv4Addr, u8), ParseError> {
    let s = s.trim();
    let (seed, prefix) = s
        .split_once('/')
        .ok_or_else(|| ParseError::MissingPrefix(s.to_string()))?;
    parse_seed_prefix(seed, prefix)
}

fn parse_seed_prefix(seed: &str, prefix: &str) -> Result<(Ipv4Addr, u8), ParseError> {
    let seed = seed.trim();
    let prefix = prefix.trim();

    let addr: Ipv4Addr = seed
        .parse()
        .map_err(|_| ParseError::InvalidAddress(seed.to_string()))?;
    let prefix_len: u8 = prefix
        .parse()
        .map_err(|_| ParseError::InvalidPrefix(prefix.to_string()))?;
    if prefix_len > IPV4_BITS {
        return Err(ParseError::PrefixOutOfRange(prefix_len));
    }

    Ok((addr, prefix_len))
}

/// `addr` masked by `prefix_len`. Prefixes over 32 are clamped.
pub fn network_of(addr: Ipv4Addr, prefix_len: u8) -> Ipv4Addr {
    let prefix_len = prefix_len.min(IPV4_BITS);
    let mask = u32::MAX
        .checked_shl(u32::from(IPV4_BITS - prefix_len))
        .unwrap_or(0);
    Ipv4Addr::from(u32::from(addr) & mask)
}

/// Dotted-quad netmask for a prefix length, e.g. 24 -> 255.255.255.0.
pub fn netmask(prefix_len: u8) -> Ipv4Addr {
    network_of(Ipv4Addr::BROADCAST, prefix_len)
}
