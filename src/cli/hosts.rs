//! Hosts subcommand implementation.
//!
//! Handles `netsweep hosts` for inspecting and pruning the host store.

use super::Context;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use crate::storage::HostStore;
use clap::{Parser, Subcommand};

/// Manage stored hosts.
#[derive(Parser, Debug)]
pub struct HostsCommand {
    #[command(subcommand)]
    pub action: HostsAction,
}

/// Host management actions.
#[derive(Subcommand, Debug)]
pub enum HostsAction {
    /// List every stored host, ordered by id
    #[command(alias = "ls")]
    List {
        /// Output format
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Delete a stored host by id
    #[command(alias = "rm")]
    Delete {
        /// Host record id
        id: i64,
    },
}

impl HostsCommand {
    /// Execute the hosts command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        match &self.action {
            HostsAction::List { output } => {
                let format = output.unwrap_or(ctx.settings.default_output_format);
                self.list(ctx, format)
            }
            HostsAction::Delete { id } => self.delete(ctx, *id),
        }
    }

    fn list(&self, ctx: &Context, format: OutputFormat) -> CliResult<()> {
        let store = ctx.open_store()?;
        let hosts = store.all()?;

        output::print_hosts(&hosts, format)?;

        if format == OutputFormat::Plain && !ctx.quiet {
            println!();
            output::print_info(&format!(
                "{} host(s) in {}",
                hosts.len(),
                store.path().display()
            ));
        }
        Ok(())
    }

    fn delete(&self, ctx: &Context, id: i64) -> CliResult<()> {
        let mut store = ctx.open_store()?;
        store.delete(id)?;

        tracing::info!(id, "host record deleted");
        if !ctx.quiet {
            output::print_success(&format!("Deleted host {}", id));
        }
        Ok(())
    }
}
