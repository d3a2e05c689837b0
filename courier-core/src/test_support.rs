//! Fixtures and invariant checks shared by builder and negotiation tests.

use std::collections::HashSet;

use crate::feasibility::{route_is_feasible, total_route_distance};
use crate::{FleetRegistry, Solution, Stop, TimeWindow};

/// Tolerance used when comparing accumulated distances.
pub const DISTANCE_TOLERANCE: f64 = 1e-9;

/// Unit-demand stop without a window.
#[must_use]
pub fn stop(id: &str, x: f64, y: f64) -> Stop {
    Stop::new(id, x, y)
}

/// Stop with explicit demand and window.
///
/// # Panics
/// Panics when `start > end`.
#[expect(clippy::expect_used, reason = "test fixture with literal inputs")]
#[must_use]
pub fn windowed_stop(id: &str, x: f64, y: f64, demand: u32, start: f64, end: f64) -> Stop {
    let window = TimeWindow::new(start, end).expect("fixture window must be ordered");
    Stop::new(id, x, y).with_demand(demand).with_window(window)
}

/// Deterministic ring of `count` stops around the depot.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "fixture geometry"
)]
#[must_use]
pub fn ring_of_stops(count: usize, radius: f64) -> Vec<Stop> {
    (0..count)
        .map(|i| {
            let angle = std::f64::consts::TAU * (i as f64) / (count.max(1) as f64);
            Stop::new(format!("s{i}"), radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Uniform fleet for tests.
///
/// # Panics
/// Panics when the limits are invalid.
#[expect(clippy::expect_used, reason = "test fixture with literal inputs")]
#[must_use]
pub fn fleet(count: usize, capacity: u32, max_distance: f64) -> FleetRegistry {
    FleetRegistry::uniform(count, capacity, max_distance).expect("fixture fleet must be valid")
}

/// Every way in which `solution` breaks the model invariants for `stops`
/// served by `fleet`. Empty when the solution is sound.
#[expect(clippy::float_arithmetic, reason = "tolerance comparisons")]
#[must_use]
pub fn solution_violations(
    solution: &Solution,
    stops: &[Stop],
    fleet: &FleetRegistry,
) -> Vec<String> {
    let mut violations = Vec::new();
    let known: HashSet<&str> = stops.iter().map(|s| s.id.as_str()).collect();
    let mut served = HashSet::new();
    let mut delivered = 0;
    let mut total = 0.0;

    for route in &solution.routes {
        let Some(vehicle) = fleet.get(&route.vehicle_id) else {
            violations.push(format!("unknown vehicle {}", route.vehicle_id));
            continue;
        };
        delivered += route.stops.len();
        total += route.distance;
        if route.load() > u64::from(vehicle.capacity) {
            violations.push(format!("{} exceeds capacity", vehicle.id));
        }
        let length = total_route_distance(&route.stops);
        if length > vehicle.max_distance + DISTANCE_TOLERANCE {
            violations.push(format!("{} exceeds max distance: {length}", vehicle.id));
        }
        if (length - route.distance).abs() > DISTANCE_TOLERANCE {
            violations.push(format!("{} reports distance {}", vehicle.id, route.distance));
        }
        if !route_is_feasible(&route.stops, vehicle) {
            violations.push(format!("{} misses a time window or limit", vehicle.id));
        }
        for stop in &route.stops {
            if !known.contains(stop.id.as_str()) {
                violations.push(format!("{} serves unknown stop {}", vehicle.id, stop.id));
            }
            if !served.insert(stop.id.clone()) {
                violations.push(format!("stop {} served twice", stop.id));
            }
        }
    }

    if delivered != solution.delivered {
        violations.push(format!(
            "delivered is {} but routes hold {delivered}",
            solution.delivered
        ));
    }
    if (total - solution.total_distance).abs() > DISTANCE_TOLERANCE {
        violations.push(format!(
            "total distance is {} but routes sum to {total}",
            solution.total_distance
        ));
    }
    violations
}
