//! Explicit choice between the batch route builders.

use std::fmt;
use std::str::FromStr;

use courier_core::{BuildError, FleetRegistry, RouteBuilder, Solution, Stop};
use courier_solver_genetic::{GeneticBuilder, GeneticConfig};
use courier_solver_greedy::GreedyBuilder;
use thiserror::Error;

/// Construction technique used by [`optimize`].
///
/// # Examples
/// ```
/// use courier_engine::{GeneticConfig, Strategy};
///
/// let strategy: Strategy = "ga".parse()?;
/// assert_eq!(strategy, Strategy::Genetic(GeneticConfig::default()));
/// assert_eq!("GREEDY".parse::<Strategy>()?, Strategy::Greedy);
/// # Ok::<(), courier_engine::UnknownStrategy>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Strategy {
    /// Nearest-feasible-stop construction, one vehicle at a time.
    #[default]
    Greedy,
    /// Genetic search over stop orderings with 2-opt refinement.
    Genetic(GeneticConfig),
}

/// A strategy name that is neither `greedy` nor `ga`/`genetic`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy {0:?} (expected greedy, ga or genetic)")]
pub struct UnknownStrategy(
    /// The rejected name.
    pub String,
);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(Self::Greedy),
            "ga" | "genetic" => Ok(Self::Genetic(GeneticConfig::default())),
            _ => Err(UnknownStrategy(name.to_owned())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greedy => f.write_str("greedy"),
            Self::Genetic(_) => f.write_str("genetic"),
        }
    }
}

/// Build routes for `stops` with the given `strategy`.
///
/// # Examples
/// ```
/// use courier_engine::{FleetRegistry, Stop, Strategy, optimize};
///
/// let fleet = FleetRegistry::uniform(1, 2, 100.0)?;
/// let stops = [Stop::new("a", 3.0, 4.0), Stop::new("b", 3.0, -4.0)];
/// let solution = optimize(&stops, &fleet, Strategy::Greedy)?;
/// assert_eq!(solution.delivered, 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn optimize(
    stops: &[Stop],
    fleet: &FleetRegistry,
    strategy: Strategy,
) -> Result<Solution, BuildError> {
    log::debug!(
        "optimising {} stops for {} vehicles with the {strategy} builder",
        stops.len(),
        fleet.len()
    );
    match strategy {
        Strategy::Greedy => GreedyBuilder.build(stops, fleet),
        Strategy::Genetic(config) => GeneticBuilder::new(config).build(stops, fleet),
    }
}
