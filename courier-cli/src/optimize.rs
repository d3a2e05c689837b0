//! Optimize command implementation for the courier CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use courier_engine::{GeneticConfig, Strategy, optimize};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::config::{FleetSettings, load_stops, require_existing, required};
use crate::output::write_summary;
use crate::{
    ARG_CAPACITY, ARG_GENERATIONS, ARG_MAX_DISTANCE, ARG_MUTATION_RATE, ARG_POPULATION, ARG_SEED,
    ARG_STOPS, ARG_STRATEGY, ARG_VEHICLES, CliError, ENV_OPTIMIZE_CAPACITY,
    ENV_OPTIMIZE_MAX_DISTANCE, ENV_OPTIMIZE_STOPS, ENV_OPTIMIZE_VEHICLES,
};

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Build delivery routes for a uniform fleet. Stops are read \
                 from a text file with one `x,y`, `id,x,y`, `id,x,y,demand` \
                 or `id,x,y,demand,start,end` entry per line. The genetic \
                 options only apply to `--strategy ga`.",
    about = "Build routes with the greedy or genetic builder"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct OptimizeArgs {
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
    /// Longest closed tour any vehicle may drive.
    #[arg(long = ARG_MAX_DISTANCE, value_name = "distance")]
    #[serde(default)]
    pub(crate) max_distance: Option<f64>,
    /// Route builder: `greedy` (default) or `ga`.
    #[arg(long = ARG_STRATEGY, value_name = "name")]
    #[serde(default)]
    pub(crate) strategy: Option<String>,
    /// Generations to evolve with the genetic builder.
    #[arg(long = ARG_GENERATIONS, value_name = "count")]
    #[serde(default)]
    pub(crate) generations: Option<usize>,
    /// Population size for the genetic builder.
    #[arg(long = ARG_POPULATION, value_name = "count")]
    #[serde(default)]
    pub(crate) population: Option<usize>,
    /// Swap-mutation probability for the genetic builder.
    #[arg(long = ARG_MUTATION_RATE, value_name = "probability")]
    #[serde(default)]
    pub(crate) mutation_rate: Option<f64>,
    /// Seed for the genetic builder.
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

impl OptimizeArgs {
    pub(crate) fn into_config(self) -> Result<OptimizeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OptimizeConfig::try_from(merged)
    }
}

/// Resolved `optimize` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OptimizeConfig {
    /// Path to the stop list.
    pub(crate) stops: Utf8PathBuf,
    /// Fleet to route.
    pub(crate) fleet: FleetSettings,
    /// Builder to run, genetic overrides applied.
    pub(crate) strategy: Strategy,
}

impl OptimizeConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.stops, ARG_STOPS)
    }
}

impl TryFrom<OptimizeArgs> for OptimizeConfig {
    type Error = CliError;

    fn try_from(args: OptimizeArgs) -> Result<Self, Self::Error> {
        let stops = required(args.stops, ARG_STOPS, ENV_OPTIMIZE_STOPS)?;
        let fleet = FleetSettings {
            vehicles: required(args.vehicles, ARG_VEHICLES, ENV_OPTIMIZE_VEHICLES)?,
            capacity: required(args.capacity, ARG_CAPACITY, ENV_OPTIMIZE_CAPACITY)?,
            max_distance: required(args.max_distance, ARG_MAX_DISTANCE, ENV_OPTIMIZE_MAX_DISTANCE)?,
        };
        let named = args
            .strategy
            .as_deref()
            .map(str::parse::<Strategy>)
            .transpose()?;
        let strategy = match named {
            None | Some(Strategy::Greedy) => Strategy::Greedy,
            Some(Strategy::Genetic(defaults)) => Strategy::Genetic(GeneticConfig {
                generations: args.generations.unwrap_or(defaults.generations),
                population_size: args.population.unwrap_or(defaults.population_size),
                mutation_rate: args.mutation_rate.unwrap_or(defaults.mutation_rate),
                seed: args.seed.unwrap_or(defaults.seed),
            }),
        };
        Ok(Self {
            stops,
            fleet,
            strategy,
        })
    }
}

pub(crate) fn run_optimize_with(
    args: OptimizeArgs,
    writer: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_optimize(&config, writer, diagnostics)
}

pub(crate) fn execute_optimize(
    config: &OptimizeConfig,
    writer: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> Result<(), CliError> {
    let fleet = config.fleet.registry()?;
    let stops = load_stops(&config.stops, diagnostics)?;
    let solution = optimize(&stops, &fleet, config.strategy)?;
    log::info!(
        "{} builder delivered {}/{} stops",
        config.strategy,
        solution.delivered,
        stops.len()
    );
    write_summary(writer, &solution.summary())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<OptimizeConfig, CliError> {
    let merged = OptimizeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    OptimizeConfig::try_from(merged)
}
