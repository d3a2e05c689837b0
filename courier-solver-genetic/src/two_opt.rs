//! Feasibility-preserving 2-opt refinement of a single route.

use courier_core::feasibility::{DEPOT, distance, route_is_feasible};
use courier_core::{Stop, VehicleSpec};
use geo::Coord;

/// Minimum length reduction that counts as an improvement.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Shorten a closed route by reversing segments until no reversal helps.
///
/// Each sweep considers every pair of edges on the depot-to-depot tour and
/// applies the reversal with the largest length reduction whose result is
/// still feasible for `vehicle`. Sweeps repeat until none improves by more
/// than a small epsilon. Capacity is unaffected by reordering and distance
/// only shrinks, so the service windows are the constraint that can reject
/// a reversal.
///
/// # Examples
/// ```
/// use courier_core::{Stop, VehicleSpec};
/// use courier_solver_genetic::two_opt;
///
/// let vehicle = VehicleSpec::new("v", 10, 1000.0)?;
/// let crossed = vec![
///     Stop::new("a", 0.0, 10.0),
///     Stop::new("b", 10.0, 0.0),
///     Stop::new("c", 10.0, 10.0),
/// ];
/// let ids: Vec<_> = two_opt(crossed, &vehicle)
///     .into_iter()
///     .map(|stop| stop.id)
///     .collect();
/// assert_eq!(ids, ["a", "c", "b"]);
/// # Ok::<(), courier_core::VehicleSpecError>(())
/// ```
#[must_use]
pub fn two_opt(mut stops: Vec<Stop>, vehicle: &VehicleSpec) -> Vec<Stop> {
    if stops.len() < 2 {
        return stops;
    }
    while let Some((first, last)) = best_reversal(&stops, vehicle) {
        if let Some(segment) = stops.get_mut(first..=last) {
            segment.reverse();
        }
    }
    stops
}

/// Stop-index bounds of the most improving feasible reversal.
fn best_reversal(stops: &[Stop], vehicle: &VehicleSpec) -> Option<(usize, usize)> {
    let tour: Vec<Coord<f64>> = std::iter::once(DEPOT)
        .chain(stops.iter().map(|stop| stop.location))
        .chain(std::iter::once(DEPOT))
        .collect();
    let stop_count = stops.len();
    let mut best: Option<(f64, usize, usize)> = None;

    // Tour positions `i` and `k` bound the reversed run `i + 1 ..= k`,
    // which is stops `i ..= k - 1`.
    for i in 0..stop_count {
        for k in (i + 2)..=stop_count {
            let delta = reversal_delta(&tour, i, k);
            if delta >= -IMPROVEMENT_EPSILON {
                continue;
            }
            if best.is_some_and(|(best_delta, _, _)| delta >= best_delta) {
                continue;
            }
            let mut candidate = stops.to_vec();
            if let Some(segment) = candidate.get_mut(i..k) {
                segment.reverse();
            }
            if route_is_feasible(&candidate, vehicle) {
                best = Some((delta, i, k - 1));
            }
        }
    }
    best.map(|(_, first, last)| (first, last))
}

/// Change in tour length when edges `(i, i+1)` and `(k, k+1)` are replaced
/// by `(i, k)` and `(i+1, k+1)`.
#[expect(
    clippy::float_arithmetic,
    reason = "2-opt compares summed edge lengths"
)]
fn reversal_delta(tour: &[Coord<f64>], i: usize, k: usize) -> f64 {
    let at = |position: usize| tour.get(position).copied().unwrap_or(DEPOT);
    let (a, b, c, d) = (at(i), at(i + 1), at(k), at(k + 1));
    distance(a, c) + distance(b, d) - distance(a, b) - distance(c, d)
}
