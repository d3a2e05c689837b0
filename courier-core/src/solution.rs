//! Route assignments produced by a construction run.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::feasibility::total_route_distance;
use crate::{FleetRegistry, Stop};

/// Ordered stops served by one vehicle and the closed tour length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleRoute {
    /// Vehicle serving the route.
    pub vehicle_id: String,
    /// Stops in visiting order.
    pub stops: Vec<Stop>,
    /// Depot-to-depot distance.
    pub distance: f64,
}

impl VehicleRoute {
    /// Build a route and compute its closed distance.
    pub fn new(vehicle_id: impl Into<String>, stops: Vec<Stop>) -> Self {
        let distance = total_route_distance(&stops);
        Self {
            vehicle_id: vehicle_id.into(),
            stops,
            distance,
        }
    }

    /// Total demand carried.
    #[must_use]
    pub fn load(&self) -> u64 {
        self.stops.iter().map(|s| u64::from(s.demand)).sum()
    }
}

/// Complete assignment for one optimisation run.
///
/// `delivered` and `total_distance` are derived from `routes` when the
/// solution is built and never updated in place.
///
/// # Examples
/// ```
/// use courier_core::{Solution, Stop, VehicleRoute};
///
/// let solution = Solution::from_routes(vec![
///     VehicleRoute::new("vehicle-1", vec![Stop::new("a", 3.0, 4.0)]),
///     VehicleRoute::new("vehicle-2", Vec::new()),
/// ]);
/// assert_eq!(solution.delivered, 1);
/// assert_eq!(solution.total_distance, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// One entry per vehicle, in fleet order.
    pub routes: Vec<VehicleRoute>,
    /// Number of stops served across all routes.
    pub delivered: usize,
    /// Sum of route distances.
    pub total_distance: f64,
}

impl Solution {
    /// Derive totals from a set of routes.
    #[must_use]
    pub fn from_routes(routes: Vec<VehicleRoute>) -> Self {
        let delivered = routes.iter().map(|r| r.stops.len()).sum();
        let total_distance = routes.iter().map(|r| r.distance).sum();
        Self {
            routes,
            delivered,
            total_distance,
        }
    }

    /// A solution in which every vehicle stays at the depot.
    #[must_use]
    pub fn empty(fleet: &FleetRegistry) -> Self {
        Self::from_routes(
            fleet
                .iter()
                .map(|v| VehicleRoute::new(v.id.clone(), Vec::new()))
                .collect(),
        )
    }

    /// Route served by `vehicle_id`, if any.
    #[must_use]
    pub fn route(&self, vehicle_id: &str) -> Option<&VehicleRoute> {
        self.routes.iter().find(|r| r.vehicle_id == vehicle_id)
    }

    /// Stops from `input` that no route serves.
    #[must_use]
    pub fn unassigned<'a>(&self, input: &'a [Stop]) -> Vec<&'a Stop> {
        let served: HashSet<&str> = self
            .routes
            .iter()
            .flat_map(|r| r.stops.iter().map(|s| s.id.as_str()))
            .collect();
        input
            .iter()
            .filter(|s| !served.contains(s.id.as_str()))
            .collect()
    }

    /// Summary handed to renderers and loggers.
    #[must_use]
    pub fn summary(&self) -> OptimizationSummary {
        OptimizationSummary {
            routes_by_vehicle: self
                .routes
                .iter()
                .map(|r| (r.vehicle_id.clone(), r.stops.clone()))
                .collect(),
            delivered: self.delivered,
            total_distance: self.total_distance,
        }
    }
}

/// Observer-facing view of a [`Solution`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationSummary {
    /// Ordered stops keyed by vehicle id.
    pub routes_by_vehicle: BTreeMap<String, Vec<Stop>>,
    /// Number of stops served.
    pub delivered: usize,
    /// Sum of route distances.
    pub total_distance: f64,
}

impl OptimizationSummary {
    /// Human-readable one-line status.
    ///
    /// # Examples
    /// ```
    /// use courier_core::OptimizationSummary;
    ///
    /// let summary = OptimizationSummary {
    ///     delivered: 3,
    ///     total_distance: 12.346,
    ///     ..OptimizationSummary::default()
    /// };
    /// assert_eq!(summary.status_line(), "Delivered: 3 • Total distance: 12.35");
    /// ```
    #[must_use]
    pub fn status_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for OptimizationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Delivered: {} • Total distance: {:.2}",
            self.delivered, self.total_distance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_solution_has_one_route_per_vehicle() {
        let fleet = FleetRegistry::uniform(2, 3, 10.0).expect("valid fleet");
        let solution = Solution::empty(&fleet);
        assert_eq!(solution.routes.len(), 2);
        assert_eq!(solution.delivered, 0);
        assert!(solution.total_distance.abs() < f64::EPSILON);
    }

    #[rstest]
    fn unassigned_lists_missing_stops_in_input_order() {
        let a = Stop::new("a", 1.0, 0.0);
        let b = Stop::new("b", 2.0, 0.0);
        let c = Stop::new("c", 3.0, 0.0);
        let solution = Solution::from_routes(vec![VehicleRoute::new("v", vec![b.clone()])]);
        let input = [a, b, c];
        let missing: Vec<_> = solution
            .unassigned(&input)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(missing, ["a", "c"]);
    }

    #[rstest]
    fn summary_keys_routes_by_vehicle() {
        let solution = Solution::from_routes(vec![
            VehicleRoute::new("v2", vec![Stop::new("b", 0.0, 2.0)]),
            VehicleRoute::new("v1", vec![Stop::new("a", 0.0, 1.0)]),
        ]);
        let summary = solution.summary();
        assert_eq!(summary.delivered, 2);
        assert_eq!(
            summary.routes_by_vehicle.keys().collect::<Vec<_>>(),
            ["v1", "v2"]
        );
        assert_eq!(summary.status_line(), "Delivered: 2 • Total distance: 6.00");
    }

    #[rstest]
    fn route_load_sums_demand() {
        let route = VehicleRoute::new(
            "v",
            vec![Stop::new("a", 1.0, 0.0).with_demand(2), Stop::new("b", 2.0, 0.0)],
        );
        assert_eq!(route.load(), 3);
    }
}
