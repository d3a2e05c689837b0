//! Core domain types for the courier routing engine.
//!
//! The crate holds the data model shared by every construction path:
//! delivery [`Stop`]s, the [`FleetRegistry`] of vehicle limits, the
//! per-vehicle [`RouteState`] used while building, and the derived
//! [`Solution`]. The [`feasibility`] module provides the pure cost and
//! admissibility checks that both the batch builders and the negotiation
//! runtime rely on.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
pub mod feasibility;
mod fleet;
mod route;
mod solution;
mod stop;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use builder::{BuildError, RouteBuilder, prepare_stops};
pub use fleet::{FleetError, FleetRegistry, VehicleSpec, VehicleSpecError};
pub use route::RouteState;
pub use solution::{OptimizationSummary, Solution, VehicleRoute};
pub use stop::{DEFAULT_DEMAND, Stop, StopError, TimeWindow};
