//! The batch construction interface implemented by each route builder.

use std::collections::HashSet;

use thiserror::Error;

use crate::{FleetRegistry, Solution, Stop, StopError};

/// Errors returned by [`RouteBuilder::build`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// A stop failed validation.
    #[error("invalid stop: {0}")]
    InvalidStop(#[from] StopError),
}

/// Assign stops to a fleet, producing one route per vehicle.
///
/// Stops that no vehicle can serve are left out of the solution rather
/// than reported as errors; callers compare `delivered` against the input
/// size. Builders must be `Send + Sync` so they can be shared across
/// threads.
pub trait RouteBuilder: Send + Sync {
    /// Construct a solution for `stops` using `fleet`.
    fn build(&self, stops: &[Stop], fleet: &FleetRegistry) -> Result<Solution, BuildError>;
}

/// Validate every stop and drop repeated ids, keeping the first occurrence.
///
/// # Examples
/// ```
/// use courier_core::{Stop, prepare_stops};
///
/// let stops = vec![Stop::new("a", 1.0, 0.0), Stop::new("a", 2.0, 0.0)];
/// let unique = prepare_stops(&stops)?;
/// assert_eq!(unique.len(), 1);
/// # Ok::<(), courier_core::BuildError>(())
/// ```
pub fn prepare_stops(stops: &[Stop]) -> Result<Vec<Stop>, BuildError> {
    let mut seen = HashSet::with_capacity(stops.len());
    let mut unique = Vec::with_capacity(stops.len());
    for stop in stops {
        stop.validate()?;
        if seen.insert(stop.id.as_str()) {
            unique.push(stop.clone());
        } else {
            log::warn!("ignoring repeated stop id {}", stop.id);
        }
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct DepotOnly;

    impl RouteBuilder for DepotOnly {
        fn build(&self, stops: &[Stop], fleet: &FleetRegistry) -> Result<Solution, BuildError> {
            prepare_stops(stops)?;
            Ok(Solution::empty(fleet))
        }
    }

    #[rstest]
    fn builder_surfaces_invalid_stops() {
        let fleet = FleetRegistry::uniform(1, 1, 1.0).expect("valid fleet");
        let stops = [Stop::new("a", 0.0, 0.0).with_demand(0)];
        let err = DepotOnly
            .build(&stops, &fleet)
            .expect_err("zero demand should be rejected");
        assert!(matches!(err, BuildError::InvalidStop(StopError::ZeroDemand { .. })));
    }

    #[rstest]
    fn prepare_keeps_first_occurrence() {
        let stops = [
            Stop::new("a", 1.0, 0.0),
            Stop::new("b", 2.0, 0.0),
            Stop::new("a", 9.0, 9.0),
        ];
        let unique = prepare_stops(&stops).expect("valid stops");
        assert_eq!(unique.len(), 2);
        assert!((unique[0].location.x - 1.0).abs() < f64::EPSILON);
    }
}
