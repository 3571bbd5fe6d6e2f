//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep sweep inputs valid from the moment they are parsed.

mod port;
mod range;
mod sweep_id;

pub use port::{Port, PortError, PortSet};
pub use range::{enumerate, netmask, network_of, parse_cidr, AddressRange, ParseError, IPV4_BITS};
pub use sweep_id::{SweepId, SweepIdError};
