//! Travel cost and admissibility checks shared by every construction path.
//!
//! Distances are Euclidean in the plane. Vehicles travel one distance unit
//! per time unit, so the clock used for window checks advances by the leg
//! length. Service is instantaneous at `max(arrival, window.start)`.

use geo::Coord;

use crate::{RouteState, Stop, VehicleSpec};

/// Fixed origin where every route starts and ends.
pub const DEPOT: Coord<f64> = Coord { x: 0.0, y: 0.0 };

/// Euclidean distance between two points.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use courier_core::feasibility::{distance, DEPOT};
///
/// assert_eq!(distance(DEPOT, Coord { x: 3.0, y: 4.0 }), 5.0);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "Euclidean distance is inherently floating point"
)]
#[must_use]
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Whether `stop` can be appended to `route` without breaking `vehicle`'s
/// range, capacity, or the stop's window.
///
/// The range check includes the leg back to the depot so that any prefix
/// accepted here can always be closed.
#[expect(
    clippy::float_arithmetic,
    reason = "range and clock projections are floating point"
)]
#[must_use]
pub fn can_append(route: &RouteState, stop: &Stop, vehicle: &VehicleSpec) -> bool {
    let leg = distance(route.position, stop.location);
    let closed = route.distance_so_far + leg + distance(stop.location, DEPOT);
    if closed > vehicle.max_distance {
        return false;
    }
    let fits = route
        .load
        .checked_add(stop.demand)
        .is_some_and(|load| load <= vehicle.capacity);
    fits && stop.window.admits(route.clock + leg)
}

/// Length of the closed tour depot, `stops...`, depot.
///
/// # Examples
/// ```
/// use courier_core::{Stop, feasibility::total_route_distance};
///
/// assert_eq!(total_route_distance(&[]), 0.0);
/// assert_eq!(total_route_distance(&[Stop::new("a", 3.0, 4.0)]), 10.0);
/// ```
#[expect(clippy::float_arithmetic, reason = "sums leg lengths")]
#[must_use]
pub fn total_route_distance(stops: &[Stop]) -> f64 {
    if stops.is_empty() {
        return 0.0;
    }
    let mut position = DEPOT;
    let mut total = 0.0;
    for stop in stops {
        total += distance(position, stop.location);
        position = stop.location;
    }
    total + distance(position, DEPOT)
}

/// Replay `stops` in order and report whether every append is admissible.
///
/// Used to re-check a route after its order has been rewritten.
#[must_use]
pub fn route_is_feasible(stops: &[Stop], vehicle: &VehicleSpec) -> bool {
    let mut route = RouteState::new();
    for stop in stops {
        if !can_append(&route, stop, vehicle) {
            return false;
        }
        route.push(stop.clone());
    }
    true
}
