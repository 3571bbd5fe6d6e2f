//! Sweep subcommand implementation.
//!
//! Handles `netsweep sweep <a.b.c.d/n>`: enumerates the subnet, runs the
//! coordinator, and streams every result through the reconciliation sink.

use super::Context;
use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::interfaces::{self, LocalNetwork};
use crate::output::{self, OutputFormat, SweepReport};
use crate::reconcile::ReconciliationSink;
use crate::scanner::{DnsResolver, NameResolver, SweepCoordinator, TcpConnectProbe};
use crate::storage::{HostStore, HostTable};
use crate::types::{parse_cidr, AddressRange, PortSet, SweepId};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Sweep a subnet for hosts with open ports.
#[derive(Parser, Debug)]
pub struct SweepCommand {
    /// Subnet to sweep, as seed address and prefix
    ///
    /// The sweep starts at the seed and walks up to the end of its network.
    /// Defaults to the first non-loopback local network.
    ///
    /// Examples:
    ///   192.168.1.0/24     Whole /24
    ///   10.0.0.100/24      10.0.0.100 through 10.0.0.255
    #[arg(value_name = "TARGET", conflicts_with = "interface")]
    pub target: Option<String>,

    /// Sweep the network of this local interface
    #[arg(short, long, value_name = "NAME")]
    pub interface: Option<String>,

    /// Ports to probe, in order (e.g., "22,80,443", "8000-8010")
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Maximum number of addresses probed at once
    #[arg(short = 'c', long = "max-in-flight", value_name = "N")]
    pub max_in_flight: Option<usize>,

    /// Connection timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Reconcile into a throwaway in-memory table instead of the host store
    #[arg(long)]
    pub no_save: bool,

    /// Stop at the first storage failure
    #[arg(long)]
    pub fail_fast: bool,
}

impl SweepCommand {
    /// Execute the sweep command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        self.execute_with(ctx, Arc::new(DnsResolver::from_system())).await
    }

    /// As `execute`, naming hosts through `resolver`.
    pub async fn execute_with(
        &self,
        ctx: &Context,
        resolver: Arc<dyn NameResolver>,
    ) -> CliResult<()> {
        let settings = self.effective_settings(&ctx.settings)?;
        let (seed, prefix) = self.resolve_target()?;

        let span = AddressRange::expected_len(seed, prefix)?;
        if span > settings.max_hosts {
            return Err(CliError::Other(format!(
                "{}/{} covers {} addresses, more than max_hosts ({})",
                seed, prefix, span, settings.max_hosts
            )));
        }
        let range = AddressRange::new(seed, prefix)?;

        if self.no_save {
            self.sweep_into(HostTable::new(), resolver, range, &settings, ctx).await
        } else {
            let store = ctx.open_store()?;
            self.sweep_into(store, resolver, range, &settings, ctx).await
        }
    }

    /// Settings with this command's flags laid over them.
    fn effective_settings(&self, base: &AppSettings) -> CliResult<AppSettings> {
        let mut settings = base.clone();

        if let Some(ports) = &self.ports {
            settings.ports = ports.parse::<PortSet>()?;
        }
        if let Some(n) = self.max_in_flight {
            settings.max_in_flight = n;
        }
        if let Some(ms) = self.timeout {
            settings.probe_timeout_ms = ms;
        }
        if let Some(format) = self.output {
            settings.default_output_format = format;
        }
        if self.fail_fast {
            settings.fail_fast = true;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn resolve_target(&self) -> CliResult<(Ipv4Addr, u8)> {
        if let Some(target) = &self.target {
            return Ok(parse_cidr(target)?);
        }

        let network = match &self.interface {
            Some(name) => interfaces::networks_for(name)
                .into_iter()
                .next()
                .ok_or_else(|| {
                    CliError::Other(format!("interface '{}' has no IPv4 address", name))
                })?,
            None => default_network(interfaces::local_networks()).ok_or_else(|| {
                CliError::Other(
                    "no non-loopback IPv4 network found; pass a target like 192.168.1.0/24"
                        .to_string(),
                )
            })?,
        };

        tracing::debug!(network = %network, "target taken from local interface");
        Ok((network.host_address, network.prefix))
    }

    async fn sweep_into<S: HostStore>(
        &self,
        store: S,
        resolver: Arc<dyn NameResolver>,
        range: AddressRange,
        settings: &AppSettings,
        ctx: &Context,
    ) -> CliResult<()> {
        let format = settings.default_output_format;
        let chatty = format == OutputFormat::Plain && !ctx.quiet;

        let id = SweepId::new();
        let target = range.to_string();
        let addresses = range.into_addresses();
        let total = addresses.len();

        if chatty {
            output::print_sweep_header(&id, &target, total, &settings.ports);
        }

        let coordinator = SweepCoordinator::new(
            Arc::new(TcpConnectProbe::new(settings.probe_timeout())),
            resolver,
            settings.sweep_config(),
        );

        let progress = if chatty && ctx.verbose {
            Some(progress_bar(total as u64))
        } else {
            None
        };

        let started_at = Utc::now();
        let mut rx = coordinator.run_with_id(id, addresses, settings.ports.clone());
        let mut sink = ReconciliationSink::new(store, settings.failure_policy());
        let mut hosts = Vec::new();

        while let Some(result) = rx.recv().await {
            if let Some(pb) = &progress {
                pb.inc(1);
            }

            if let Err(e) = sink.accept(&result) {
                if let Some(pb) = &progress {
                    pb.abandon_with_message("aborted");
                }
                return Err(e.into());
            }

            if !result.has_open_ports() {
                continue;
            }
            if chatty {
                match &progress {
                    Some(pb) => pb.suspend(|| output::print_host_found(&result))?,
                    None => output::print_host_found(&result)?,
                }
            }
            hosts.push(result);
        }

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        let summary = sink.summary();
        let report = SweepReport {
            id,
            target,
            started_at,
            completed_at: Utc::now(),
            addresses_scanned: summary.received,
            hosts,
            summary,
        };

        output::print_report(&report, format)?;

        if summary.failed > 0 && !ctx.quiet {
            output::print_warning(&format!(
                "{} host(s) could not be saved; see the log for details",
                summary.failed
            ));
        }

        Ok(())
    }
}

/// First network that is not on a loopback interface.
fn default_network(networks: Vec<LocalNetwork>) -> Option<LocalNetwork> {
    networks
        .into_iter()
        .find(|net| !net.host_address.is_loopback())
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Names every address `host-<last octet>.test` without touching DNS.
    #[derive(Default)]
    struct FixedResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NameResolver for FixedResolver {
        async fn reverse_lookup(&self, address: Ipv4Addr) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            format!("host-{}.test", address.octets()[3])
        }
    }

    fn quiet_context(store_path: Option<std::path::PathBuf>) -> Context {
        Context {
            settings: AppSettings::default(),
            store_path,
            verbose: false,
            quiet: true,
        }
    }

    fn parse(args: &[&str]) -> SweepCommand {
        let mut full = vec!["sweep"];
        full.extend_from_slice(args);
        SweepCommand::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_flags_override_settings() {
        let cmd = parse(&[
            "10.0.0.0/24", "-p", "80,22", "-c", "16", "-t", "250", "--fail-fast", "-o", "json",
        ]);
        let settings = cmd.effective_settings(&AppSettings::default()).unwrap();

        assert_eq!(settings.ports.to_string(), "80,22");
        assert_eq!(settings.max_in_flight, 16);
        assert_eq!(settings.probe_timeout_ms, 250);
        assert!(settings.fail_fast);
        assert_eq!(settings.default_output_format, OutputFormat::Json);
    }

    #[test]
    fn test_settings_kept_without_flags() {
        let base = AppSettings {
            max_in_flight: 3,
            ..AppSettings::default()
        };
        let settings = parse(&["10.0.0.0/24"]).effective_settings(&base).unwrap();
        assert_eq!(settings, base);
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let cmd = parse(&["10.0.0.0/24", "-c", "0"]);
        assert!(matches!(
            cmd.effective_settings(&AppSettings::default()),
            Err(CliError::Config(_))
        ));

        let cmd = parse(&["10.0.0.0/24", "-p", "0"]);
        assert!(matches!(
            cmd.effective_settings(&AppSettings::default()),
            Err(CliError::Port(_))
        ));
    }

    #[test]
    fn test_target_parsing() {
        let cmd = parse(&["192.168.50.1/30"]);
        assert_eq!(
            cmd.resolve_target().unwrap(),
            (Ipv4Addr::new(192, 168, 50, 1), 30)
        );

        let cmd = parse(&["192.168.50.1/deez"]);
        assert!(matches!(cmd.resolve_target(), Err(CliError::Parse(_))));
    }

    #[test]
    fn test_target_conflicts_with_interface() {
        assert!(SweepCommand::try_parse_from(["sweep", "10.0.0.0/24", "-i", "eth0"]).is_err());
    }

    #[test]
    fn test_default_network_skips_loopback() {
        let networks = vec![
            LocalNetwork::new("lo", "", Ipv4Addr::LOCALHOST, 8),
            LocalNetwork::new("eth0", "aa:bb:cc:dd:ee:ff", Ipv4Addr::new(192, 168, 1, 20), 24),
        ];
        let net = default_network(networks).unwrap();
        assert_eq!(net.interface_name, "eth0");

        let loopback_only = vec![LocalNetwork::new("lo", "", Ipv4Addr::LOCALHOST, 8)];
        assert!(default_network(loopback_only).is_none());
    }

    #[tokio::test]
    async fn test_oversized_range_refused() {
        let mut ctx = quiet_context(None);
        ctx.settings.max_hosts = 100;
        let resolver = Arc::new(FixedResolver::default());

        let cmd = parse(&["10.0.0.0/16", "--no-save"]);
        let result = cmd.execute_with(&ctx, resolver.clone()).await;

        assert!(matches!(result, Err(CliError::Other(_))));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_target_never_opens_store() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        let ctx = quiet_context(Some(nested.join("hosts.json")));
        let resolver = Arc::new(FixedResolver::default());

        let cmd = parse(&["192.168.50.1/deez"]);
        let result = cmd.execute_with(&ctx, resolver.clone()).await;

        assert!(matches!(result, Err(CliError::Parse(_))));
        // Opening the store would have created its parent directory.
        assert!(!nested.exists());
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sweep_writes_store() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                if listener.accept().await.is_err() {
                    break;
                }
            }
        });

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts.json");
        let ctx = quiet_context(Some(path.clone()));
        let resolver = Arc::new(FixedResolver::default());

        let port_arg = port.to_string();
        let cmd = parse(&["127.0.0.1/32", "-p", &port_arg, "-t", "500", "-o", "json"]);
        cmd.execute_with(&ctx, resolver.clone()).await.unwrap();

        let store = crate::storage::JsonHostStore::open(&path).unwrap();
        let host = store.get_by_ip("127.0.0.1").unwrap();
        assert_eq!(host.ports_csv, port_arg);
        assert_eq!(host.fqdn, "host-1.test");
        assert_eq!(host.id, 1);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }
}
