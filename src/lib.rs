//! Facade crate for the courier routing engine.
//!
//! This crate re-exports the core domain types and exposes the route
//! builders and the negotiation runtime behind feature flags. With both
//! builders enabled, [`optimize`] runs whichever [`Strategy`] the caller
//! passes in.

#![forbid(unsafe_code)]

pub use courier_core::{
    BuildError, DEFAULT_DEMAND, FleetError, FleetRegistry, OptimizationSummary, RouteBuilder,
    RouteState, Solution, Stop, StopError, TimeWindow, VehicleRoute, VehicleSpec,
    VehicleSpecError, feasibility,
};

#[cfg(feature = "test-support")]
pub use courier_core::test_support;

#[cfg(feature = "solver-greedy")]
pub use courier_solver_greedy::GreedyBuilder;

#[cfg(feature = "solver-genetic")]
pub use courier_solver_genetic::{GeneticBuilder, GeneticConfig, GeneticRun};

#[cfg(feature = "negotiation")]
pub use courier_negotiation as negotiation;

#[cfg(all(feature = "solver-greedy", feature = "solver-genetic"))]
mod strategy;

#[cfg(all(feature = "solver-greedy", feature = "solver-genetic"))]
pub use strategy::{Strategy, UnknownStrategy, optimize};
