//! Command-line interface for the courier routing engine.
//!
//! `courier optimize` runs one of the batch route builders over a stop
//! file; `courier negotiate` assigns the same stops through the vehicle
//! negotiation runtime. Both print the optimisation summary as JSON
//! followed by a one-line status.
#![forbid(unsafe_code)]

use std::io::{self, Write};

use clap::{Parser, Subcommand};

mod config;
mod error;
mod negotiate;
mod optimize;
mod output;

pub use error::CliError;

use negotiate::NegotiateArgs;
use optimize::OptimizeArgs;

pub(crate) const ARG_STOPS: &str = "stops";
pub(crate) const ARG_VEHICLES: &str = "vehicles";
pub(crate) const ARG_CAPACITY: &str = "capacity";
pub(crate) const ARG_MAX_DISTANCE: &str = "max-distance";
pub(crate) const ARG_STRATEGY: &str = "strategy";
pub(crate) const ARG_GENERATIONS: &str = "generations";
pub(crate) const ARG_POPULATION: &str = "population";
pub(crate) const ARG_MUTATION_RATE: &str = "mutation-rate";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_SPEED: &str = "speed";
pub(crate) const ARG_REPLY_TIMEOUT_MS: &str = "reply-timeout-ms";

pub(crate) const ENV_OPTIMIZE_STOPS: &str = "COURIER_CMDS_OPTIMIZE_STOPS";
pub(crate) const ENV_OPTIMIZE_VEHICLES: &str = "COURIER_CMDS_OPTIMIZE_VEHICLES";
pub(crate) const ENV_OPTIMIZE_CAPACITY: &str = "COURIER_CMDS_OPTIMIZE_CAPACITY";
pub(crate) const ENV_OPTIMIZE_MAX_DISTANCE: &str = "COURIER_CMDS_OPTIMIZE_MAX_DISTANCE";
pub(crate) const ENV_NEGOTIATE_STOPS: &str = "COURIER_CMDS_NEGOTIATE_STOPS";
pub(crate) const ENV_NEGOTIATE_VEHICLES: &str = "COURIER_CMDS_NEGOTIATE_VEHICLES";
pub(crate) const ENV_NEGOTIATE_CAPACITY: &str = "COURIER_CMDS_NEGOTIATE_CAPACITY";
pub(crate) const ENV_NEGOTIATE_MAX_DISTANCE: &str = "COURIER_CMDS_NEGOTIATE_MAX_DISTANCE";

/// Run the courier CLI with the current process arguments and environment.
///
/// Help and version requests are printed and count as success.
pub fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            err.print().map_err(CliError::WriteOutput)?;
            return Ok(());
        }
        Err(err) => return Err(CliError::ArgumentParsing(err)),
    };
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    dispatch(cli.command, &mut stdout, &mut stderr)
}

fn dispatch(
    command: Command,
    writer: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Optimize(args) => optimize::run_optimize_with(args, writer, diagnostics),
        Command::Negotiate(args) => negotiate::run_negotiate_with(args, writer, diagnostics),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    about = "Plan capacitated delivery routes from a stop list",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build routes with the greedy or genetic builder.
    Optimize(OptimizeArgs),
    /// Assign stops by negotiating with one worker per vehicle.
    Negotiate(NegotiateArgs),
}

#[cfg(test)]
mod tests;
