//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `netsweep sweep [<a.b.c.d/n>]` - Sweep a subnet and record hosts found
//! - `netsweep hosts list|delete` - Inspect and prune stored hosts
//! - `netsweep interfaces` - Show local IPv4 networks

mod hosts;
mod interfaces;
mod sweep;

pub use hosts::{HostsAction, HostsCommand};
pub use interfaces::InterfacesCommand;
pub use sweep::SweepCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use crate::storage::JsonHostStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// netsweep - discover the hosts on a local IPv4 subnet.
///
/// Walks every address of a subnet, probes a fixed list of TCP ports on each,
/// looks up its name and keeps one record per host with open ports.
#[derive(Parser, Debug)]
#[command(name = "netsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Local subnet host discovery", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the host store
    #[arg(long, global = true, value_name = "PATH", env = "NETSWEEP_STORE")]
    pub store: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep a subnet for hosts with open ports
    #[command(alias = "s")]
    Sweep(SweepCommand),

    /// Manage stored hosts
    #[command(alias = "h")]
    Hosts(HostsCommand),

    /// List local IPv4 networks
    #[command(alias = "i")]
    Interfaces(InterfacesCommand),
}

/// Global options resolved once, shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: AppSettings,
    pub store_path: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context {
    /// Open the host store named by `--store`, or the default one.
    pub fn open_store(&self) -> CliResult<JsonHostStore> {
        let store = match &self.store_path {
            Some(path) => JsonHostStore::open(path)?,
            None => JsonHostStore::new()?,
        };
        Ok(store)
    }
}

impl Cli {
    /// Load settings and collect the global flags.
    pub fn context(&self) -> CliResult<Context> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };

        Ok(Context {
            settings,
            store_path: self.store.clone(),
            verbose: self.verbose,
            quiet: self.quiet,
        })
    }

    /// Dispatch to the selected subcommand.
    pub async fn run(&self) -> CliResult<()> {
        let ctx = self.context()?;

        match &self.command {
            Commands::Sweep(cmd) => cmd.execute(&ctx).await,
            Commands::Hosts(cmd) => cmd.execute(&ctx),
            Commands::Interfaces(cmd) => cmd.execute(&ctx),
        }
    }
}
