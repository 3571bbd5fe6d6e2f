//! Reverse-name resolution through the system resolver configuration.

use crate::scanner::traits::NameResolver;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Reported in place of a name when reverse lookup fails.
pub const UNRESOLVED_NAME: &str = "not found with default resolver";

/// PTR lookups via `trust-dns-resolver`.
///
/// Names are reported without their trailing root dot, and a lookup that
/// succeeds with no names reports `UNRESOLVED_NAME` just like a failed one.
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    /// Build from the host's resolver configuration (`/etc/resolv.conf` on
    /// Unix), falling back to the library defaults when it cannot be read.
    pub fn from_system() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "system resolver configuration unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }

    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl NameResolver for DnsResolver {
    async fn reverse_lookup(&self, address: Ipv4Addr) -> String {
        match self.resolver.reverse_lookup(IpAddr::V4(address)).await {
            Ok(lookup) => {
                let names: Vec<String> = lookup.iter().map(|name| name.to_string()).collect();
                join_names(names)
            }
            Err(e) => {
                tracing::debug!(%address, error = %e, "reverse lookup failed");
                UNRESOLVED_NAME.to_string()
            }
        }
    }
}

/// Join PTR names for display, dropping the root label's trailing dot.
fn join_names(names: Vec<String>) -> String {
    let names: Vec<&str> = names
        .iter()
        .map(|n| n.trim_end_matches('.'))
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        UNRESOLVED_NAME.to_string()
    } else {
        names.join(", ")
    }
}
