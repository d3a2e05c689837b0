//! Mutable per-vehicle state used while a route is being constructed.

use geo::Coord;

use crate::feasibility::{self, DEPOT};
use crate::{Stop, VehicleSpec};

/// Partial route for one vehicle.
///
/// Starts at the depot with zero distance, clock and load. The state is
/// owned by whichever builder is extending it and is discarded once the
/// run produces a [`Solution`](crate::Solution).
///
/// # Examples
/// ```
/// use courier_core::{RouteState, Stop};
///
/// let route = RouteState::new().append(Stop::new("a", 3.0, 4.0));
/// assert_eq!(route.distance_so_far, 5.0);
/// assert_eq!(route.closed_distance(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteState {
    /// Current position; the last stop served or the depot.
    pub position: Coord<f64>,
    /// Distance travelled from the depot, excluding the return leg.
    pub distance_so_far: f64,
    /// Time at which service at the last stop began.
    pub clock: f64,
    /// Demand already loaded.
    pub load: u32,
    /// Stops served, in order.
    pub stops: Vec<Stop>,
}

impl Default for RouteState {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteState {
    /// Empty route at the depot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: DEPOT,
            distance_so_far: 0.0,
            clock: 0.0,
            load: 0,
            stops: Vec::new(),
        }
    }

    /// See [`feasibility::can_append`].
    #[must_use]
    pub fn can_append(&self, stop: &Stop, vehicle: &VehicleSpec) -> bool {
        feasibility::can_append(self, stop, vehicle)
    }

    /// Return a new state extended by `stop`.
    #[must_use]
    pub fn append(&self, stop: Stop) -> Self {
        let mut next = self.clone();
        next.push(stop);
        next
    }

    /// Extend this state by `stop` in place.
    ///
    /// Callers are expected to have checked [`Self::can_append`].
    #[expect(
        clippy::float_arithmetic,
        reason = "distance and clock accumulate floating point legs"
    )]
    pub fn push(&mut self, stop: Stop) {
        let leg = feasibility::distance(self.position, stop.location);
        self.distance_so_far += leg;
        self.clock = stop.window.service_start(self.clock + leg);
        self.load = self.load.saturating_add(stop.demand);
        self.position = stop.location;
        self.stops.push(stop);
    }

    /// Distance of the route once closed back at the depot.
    #[expect(clippy::float_arithmetic, reason = "adds the return leg")]
    #[must_use]
    pub fn closed_distance(&self) -> f64 {
        self.distance_so_far + feasibility::distance(self.position, DEPOT)
    }

    /// Closed distance if `stop` were appended next.
    #[expect(clippy::float_arithmetic, reason = "projects one extra leg")]
    #[must_use]
    pub fn projected_distance(&self, stop: &Stop) -> f64 {
        self.distance_so_far
            + feasibility::distance(self.position, stop.location)
            + feasibility::distance(stop.location, DEPOT)
    }

    /// Number of stops served.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the route is still empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}
