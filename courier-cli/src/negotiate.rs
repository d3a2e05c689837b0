//! Negotiate command implementation for the courier CLI.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use courier_engine::negotiation::{
    Coordinator, DEFAULT_SPEED_KMH, NegotiationConfig, NegotiationOutcome,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::config::{FleetSettings, load_stops, require_existing, required};
use crate::output::write_summary;
use crate::{
    ARG_CAPACITY, ARG_MAX_DISTANCE, ARG_REPLY_TIMEOUT_MS, ARG_SPEED, ARG_STOPS, ARG_VEHICLES,
    CliError, ENV_NEGOTIATE_CAPACITY, ENV_NEGOTIATE_MAX_DISTANCE, ENV_NEGOTIATE_STOPS,
    ENV_NEGOTIATE_VEHICLES,
};

/// CLI arguments for the `negotiate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Assign stops by negotiation. Every vehicle runs as its own \
                 worker and bids an arrival time for each offered stop; the \
                 earliest bid wins. Vehicle range is the maximum distance.",
    about = "Assign stops by negotiating with one worker per vehicle"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct NegotiateArgs {
    /// Path to the stop list.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) stops: Option<Utf8PathBuf>,
    /// Number of vehicles in the fleet.
    #[arg(long = ARG_VEHICLES, value_name = "count")]
    #[serde(default)]
    pub(crate) vehicles: Option<usize>,
    /// Capacity of every vehicle, in demand units.
    #[arg(long = ARG_CAPACITY, value_name = "units")]
    #[serde(default)]
    pub(crate) capacity: Option<u32>,
    /// Range of every vehicle.
    #[arg(long = ARG_MAX_DISTANCE, value_name = "distance")]
    #[serde(default)]
    pub(crate) max_distance: Option<f64>,
    /// Travel speed used for arrival estimates, in km/h.
    #[arg(long = ARG_SPEED, value_name = "kmh")]
    #[serde(default)]
    pub(crate) speed: Option<f64>,
    /// How long to wait for each vehicle reply, in milliseconds.
    #[arg(long = ARG_REPLY_TIMEOUT_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) reply_timeout_ms: Option<u64>,
}

impl NegotiateArgs {
    pub(crate) fn into_config(self) -> Result<NegotiateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NegotiateConfig::try_from(merged)
    }
}

/// Resolved `negotiate` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NegotiateConfig {
    /// Path to the stop list.
    pub(crate) stops: Utf8PathBuf,
    /// Fleet to spawn endpoints for.
    pub(crate) fleet: FleetSettings,
    /// Endpoint travel speed in km/h.
    pub(crate) speed_kmh: f64,
    /// Coordinator settings.
    pub(crate) negotiation: NegotiationConfig,
}

impl NegotiateConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.stops, ARG_STOPS)
    }
}

impl TryFrom<NegotiateArgs> for NegotiateConfig {
    type Error = CliError;

    fn try_from(args: NegotiateArgs) -> Result<Self, Self::Error> {
        let stops = required(args.stops, ARG_STOPS, ENV_NEGOTIATE_STOPS)?;
        let fleet = FleetSettings {
            vehicles: required(args.vehicles, ARG_VEHICLES, ENV_NEGOTIATE_VEHICLES)?,
            capacity: required(args.capacity, ARG_CAPACITY, ENV_NEGOTIATE_CAPACITY)?,
            max_distance: required(
                args.max_distance,
                ARG_MAX_DISTANCE,
                ENV_NEGOTIATE_MAX_DISTANCE,
            )?,
        };
        let mut negotiation = NegotiationConfig::default();
        if let Some(millis) = args.reply_timeout_ms {
            negotiation = negotiation.with_reply_timeout(Duration::from_millis(millis));
        }
        Ok(Self {
            stops,
            fleet,
            speed_kmh: args.speed.unwrap_or(DEFAULT_SPEED_KMH),
            negotiation,
        })
    }
}

pub(crate) fn run_negotiate_with(
    args: NegotiateArgs,
    writer: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_negotiate(&config, writer, diagnostics)
}

pub(crate) fn execute_negotiate(
    config: &NegotiateConfig,
    writer: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> Result<(), CliError> {
    let fleet = config.fleet.registry()?;
    let stops = load_stops(&config.stops, diagnostics)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CliError::Runtime)?;
    let outcome = runtime.block_on(async {
        let coordinator = Coordinator::spawn_fleet(&fleet, config.speed_kmh, config.negotiation);
        coordinator.negotiate(&stops).await
    })?;
    report_unassigned(&outcome, diagnostics)?;
    write_summary(writer, &outcome.solution.summary())
}

fn report_unassigned(
    outcome: &NegotiationOutcome,
    diagnostics: &mut dyn Write,
) -> Result<(), CliError> {
    if outcome.unassigned.is_empty() {
        return Ok(());
    }
    let ids: Vec<&str> = outcome
        .unassigned
        .iter()
        .map(|stop| stop.id.as_str())
        .collect();
    writeln!(diagnostics, "unassigned: {}", ids.join(", ")).map_err(CliError::WriteOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<NegotiateConfig, CliError> {
    let merged = NegotiateArgs::merge_from_layers(layers).map_err(CliError::from)?;
    NegotiateConfig::try_from(merged)
}
