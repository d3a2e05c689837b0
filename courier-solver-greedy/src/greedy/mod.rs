//! `GreedyBuilder` implementation.

use courier_core::feasibility::distance;
use courier_core::{
    BuildError, FleetRegistry, RouteBuilder, RouteState, Solution, Stop, VehicleRoute,
    VehicleSpec, prepare_stops,
};

/// Builds routes by repeatedly appending the nearest feasible stop.
///
/// Vehicles are processed in fleet order. Each one scans every remaining
/// stop per extension, so the cost is `O(V * C * N)` for `V` vehicles of
/// capacity `C` and `N` stops. Ties go to the stop seen first in input
/// order. Stops that no vehicle can reach stay unassigned.
///
/// # Examples
/// ```
/// use courier_core::{FleetRegistry, RouteBuilder, Stop};
/// use courier_solver_greedy::GreedyBuilder;
///
/// let fleet = FleetRegistry::uniform(1, 5, 100.0)?;
/// let solution = GreedyBuilder.build(&[Stop::new("a", 3.0, 4.0)], &fleet)?;
/// assert_eq!(solution.delivered, 1);
/// assert_eq!(solution.total_distance, 10.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyBuilder;

impl RouteBuilder for GreedyBuilder {
    fn build(&self, stops: &[Stop], fleet: &FleetRegistry) -> Result<Solution, BuildError> {
        let mut remaining = prepare_stops(stops)?;
        let total = remaining.len();
        let mut routes = Vec::with_capacity(fleet.len());

        for vehicle in fleet {
            let route = fill_vehicle(vehicle, &mut remaining);
            log::debug!(
                "greedy: {} serves {} stops over {:.2}",
                vehicle.id,
                route.len(),
                route.closed_distance()
            );
            routes.push(VehicleRoute::new(vehicle.id.clone(), route.stops));
        }

        let solution = Solution::from_routes(routes);
        log::info!(
            "greedy: delivered {}/{} stops, total distance {:.2}",
            solution.delivered,
            total,
            solution.total_distance
        );
        Ok(solution)
    }
}

fn fill_vehicle(vehicle: &VehicleSpec, remaining: &mut Vec<Stop>) -> RouteState {
    let mut route = RouteState::new();
    while route.load < vehicle.capacity {
        let Some(index) = nearest_feasible(&route, vehicle, remaining) else {
            break;
        };
        let stop = remaining.remove(index);
        route.push(stop);
    }
    route
}

/// Index of the closest stop `vehicle` can append, first one on ties.
fn nearest_feasible(
    route: &RouteState,
    vehicle: &VehicleSpec,
    remaining: &[Stop],
) -> Option<usize> {
    remaining
        .iter()
        .enumerate()
        .filter(|(_, stop)| route.can_append(stop, vehicle))
        .map(|(index, stop)| (index, distance(route.position, stop.location)))
        .min_by(|(_, lhs), (_, rhs)| lhs.total_cmp(rhs))
        .map(|(index, _)| index)
}
