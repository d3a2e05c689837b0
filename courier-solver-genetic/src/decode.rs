//! Chromosome decoding and fitness.

use courier_core::{FleetRegistry, RouteState, Solution, Stop, VehicleRoute};

use crate::two_opt::two_opt;

/// Fitness credited per delivered stop.
///
/// Large enough that one more delivery always outweighs any realistic
/// distance saving.
pub const DELIVERY_REWARD: f64 = 1000.0;

/// Decode a permutation of stop indices into a [`Solution`].
///
/// Stops are offered in chromosome order. Each goes to the vehicle whose
/// closed tour would be shortest after taking it, among those that can
/// feasibly append it; ties go to the vehicle listed first in the fleet.
/// A stop no vehicle can take is dropped. Every resulting route is then
/// refined with [`two_opt`].
///
/// Indices outside `stops` are ignored.
#[must_use]
pub fn decode(chromosome: &[usize], stops: &[Stop], fleet: &FleetRegistry) -> Solution {
    let vehicles = fleet.vehicles();
    let mut routes = vec![RouteState::new(); vehicles.len()];

    for stop in chromosome.iter().filter_map(|&index| stops.get(index)) {
        let best = routes
            .iter()
            .zip(vehicles)
            .enumerate()
            .filter(|(_, (route, vehicle))| route.can_append(stop, vehicle))
            .map(|(index, (route, _))| (index, route.projected_distance(stop)))
            .min_by(|(_, lhs), (_, rhs)| lhs.total_cmp(rhs))
            .map(|(index, _)| index);
        match best.and_then(|index| routes.get_mut(index)) {
            Some(route) => route.push(stop.clone()),
            None => log::debug!("ga: no vehicle can take stop {}", stop.id),
        }
    }

    let refined = routes
        .into_iter()
        .zip(vehicles)
        .map(|(route, vehicle)| {
            VehicleRoute::new(vehicle.id.clone(), two_opt(route.stops, vehicle))
        })
        .collect();
    Solution::from_routes(refined)
}

/// Score a decoded solution: deliveries first, then shorter distance.
///
/// # Examples
/// ```
/// use courier_core::{Solution, Stop, VehicleRoute};
/// use courier_solver_genetic::fitness;
///
/// let route = VehicleRoute::new("v", vec![Stop::new("a", 3.0, 4.0)]);
/// let solution = Solution::from_routes(vec![route]);
/// assert_eq!(fitness(&solution), 990.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "fitness combines a delivery reward with a distance penalty"
)]
#[expect(
    clippy::cast_precision_loss,
    reason = "stop counts stay far below 2^52"
)]
pub fn fitness(solution: &Solution) -> f64 {
    solution.delivered as f64 * DELIVERY_REWARD - solution.total_distance
}
