//! Interfaces subcommand implementation.

use super::Context;
use crate::error::CliResult;
use crate::interfaces;
use crate::output::{self, OutputFormat};
use clap::Parser;

/// List local IPv4 networks, the candidates for a sweep.
#[derive(Parser, Debug)]
pub struct InterfacesCommand {
    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl InterfacesCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let networks = interfaces::local_networks();
        let format = self.output.unwrap_or(ctx.settings.default_output_format);

        output::print_networks(&networks, format)?;
        Ok(())
    }
}
