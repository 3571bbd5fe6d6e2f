//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSet` is the ordered list of ports probed on every address of a sweep.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u16),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// Ordered sequence of distinct ports.
///
/// Order is significant: every address is walked in exactly this order and
/// open ports are reported in it. Duplicates are dropped on construction,
/// keeping the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u16>", into = "Vec<u16>")]
pub struct PortSet {
    ports: Vec<Port>,
}

impl PortSet {
    /// Ports probed when nothing else is configured.
    pub const DEFAULT_PORTS: [u16; 9] = [22, 80, 443, 8080, 4379, 445, 53, 153, 27017];

    /// Build a port set, preserving order and dropping repeats.
    pub fn new(ports: impl IntoIterator<Item = Port>) -> Result<Self, PortError> {
        let mut ordered: Vec<Port> = Vec::new();
        for port in ports {
            if !ordered.contains(&port) {
                ordered.push(port);
            }
        }

        if ordered.is_empty() {
            return Err(PortError::Empty);
        }

        Ok(Self { ports: ordered })
    }

    /// The ports, in probe order.
    pub fn as_slice(&self) -> &[Port] {
        &self.ports
    }

    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl Default for PortSet {
    fn default() -> Self {
        Self {
            ports: Self::DEFAULT_PORTS.iter().copied().filter_map(Port::new).collect(),
        }
    }
}

impl TryFrom<Vec<u16>> for PortSet {
    type Error = PortError;

    fn try_from(raw: Vec<u16>) -> Result<Self, Self::Error> {
        let ports = raw
            .into_iter()
            .map(Port::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ports)
    }
}

impl From<PortSet> for Vec<u16> {
    fn from(set: PortSet) -> Self {
        set.ports.into_iter().map(u16::from).collect()
    }
}

/// Parses lists like `"22,80,443"` or `"22,8000-8010,80"`.
///
/// Ranges expand in ascending order at the position they appear.
impl FromStr for PortSet {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut ports = Vec::new();

        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_port(start)?;
                let end = parse_port(end)?;
                if start > end {
                    return Err(PortError::InvalidRange(start.0, end.0));
                }
                ports.extend((start.0..=end.0).map(Port));
            } else {
                ports.push(parse_port(part)?);
            }
        }

        Self::new(ports)
    }
}

fn parse_port(raw: &str) -> Result<Port, PortError> {
    let raw = raw.trim();
    let value: u16 = raw
        .parse()
        .map_err(|_| PortError::InvalidFormat(raw.to_string()))?;
    Port::try_from(value)
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ports.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
