//! Vehicle limits and the registry holding them for one run.

use std::collections::HashSet;

use thiserror::Error;

/// Capacity and range limits for one vehicle.
///
/// # Examples
/// ```
/// use courier_core::VehicleSpec;
///
/// let spec = VehicleSpec::new("van", 5, 100.0)?;
/// assert_eq!(spec.capacity, 5);
/// # Ok::<(), courier_core::VehicleSpecError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSpec {
    /// Unique identifier.
    pub id: String,
    /// Total demand the vehicle may carry.
    pub capacity: u32,
    /// Longest closed tour, depot to depot.
    pub max_distance: f64,
}

/// Errors returned by [`VehicleSpec::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VehicleSpecError {
    /// The identifier was blank.
    #[error("vehicle id must not be empty")]
    EmptyId,
    /// Capacity must be positive.
    #[error("vehicle {id} must have a positive capacity")]
    ZeroCapacity {
        /// Offending vehicle.
        id: String,
    },
    /// Range must be positive and finite.
    #[error("vehicle {id} has invalid max distance {max_distance}")]
    InvalidMaxDistance {
        /// Offending vehicle.
        id: String,
        /// Rejected value.
        max_distance: f64,
    },
}

impl VehicleSpec {
    /// Validate and construct a vehicle.
    pub fn new(
        id: impl Into<String>,
        capacity: u32,
        max_distance: f64,
    ) -> Result<Self, VehicleSpecError> {
        let vehicle_id = id.into();
        if vehicle_id.trim().is_empty() {
            return Err(VehicleSpecError::EmptyId);
        }
        if capacity == 0 {
            return Err(VehicleSpecError::ZeroCapacity { id: vehicle_id });
        }
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Err(VehicleSpecError::InvalidMaxDistance {
                id: vehicle_id,
                max_distance,
            });
        }
        Ok(Self {
            id: vehicle_id,
            capacity,
            max_distance,
        })
    }
}

/// Errors returned when assembling a [`FleetRegistry`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FleetError {
    /// A vehicle failed validation.
    #[error(transparent)]
    InvalidVehicle(#[from] VehicleSpecError),
    /// Two vehicles share an identifier.
    #[error("vehicle id {0} is registered twice")]
    DuplicateVehicle(String),
}

/// Ordered set of vehicles configured for one optimisation run.
///
/// Registration order is significant: builders visit vehicles in this
/// order and break ties by the lower index.
///
/// # Examples
/// ```
/// use courier_core::FleetRegistry;
///
/// let fleet = FleetRegistry::uniform(2, 5, 100.0)?;
/// let ids: Vec<_> = fleet.iter().map(|v| v.id.as_str()).collect();
/// assert_eq!(ids, ["vehicle-1", "vehicle-2"]);
/// # Ok::<(), courier_core::FleetError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetRegistry {
    vehicles: Vec<VehicleSpec>,
}

impl FleetRegistry {
    /// Build a registry, rejecting duplicate identifiers.
    pub fn new(vehicles: Vec<VehicleSpec>) -> Result<Self, FleetError> {
        let mut seen = HashSet::with_capacity(vehicles.len());
        for vehicle in &vehicles {
            if !seen.insert(vehicle.id.as_str()) {
                return Err(FleetError::DuplicateVehicle(vehicle.id.clone()));
            }
        }
        Ok(Self { vehicles })
    }

    /// Build `count` identical vehicles named `vehicle-1` onwards.
    pub fn uniform(count: usize, capacity: u32, max_distance: f64) -> Result<Self, FleetError> {
        let vehicles = (1..=count)
            .map(|n| VehicleSpec::new(format!("vehicle-{n}"), capacity, max_distance))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { vehicles })
    }

    /// Look up a vehicle by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&VehicleSpec> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Vehicles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &VehicleSpec> {
        self.vehicles.iter()
    }

    /// Vehicles as a slice.
    #[must_use]
    pub fn vehicles(&self) -> &[VehicleSpec] {
        &self.vehicles
    }

    /// Number of registered vehicles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether no vehicles are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

impl<'a> IntoIterator for &'a FleetRegistry {
    type Item = &'a VehicleSpec;
    type IntoIter = std::slice::Iter<'a, VehicleSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.vehicles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 5, 10.0)]
    #[case("v", 0, 10.0)]
    #[case("v", 5, 0.0)]
    #[case("v", 5, f64::INFINITY)]
    fn vehicle_spec_rejects_invalid_limits(
        #[case] id: &str,
        #[case] capacity: u32,
        #[case] max_distance: f64,
    ) {
        assert!(VehicleSpec::new(id, capacity, max_distance).is_err());
    }

    #[rstest]
    fn registry_rejects_duplicate_ids() {
        let a = VehicleSpec::new("v", 1, 1.0).expect("valid vehicle");
        let err = FleetRegistry::new(vec![a.clone(), a]).expect_err("duplicate should fail");
        assert_eq!(err, FleetError::DuplicateVehicle("v".into()));
    }

    #[rstest]
    fn uniform_fleet_keeps_registration_order() {
        let fleet = FleetRegistry::uniform(3, 4, 50.0).expect("valid fleet");
        assert_eq!(fleet.len(), 3);
        assert_eq!(
            fleet.get("vehicle-2").map(|v| v.capacity),
            Some(4),
            "lookup by id"
        );
        let ids: Vec<_> = fleet.iter().map(|v| v.id.clone()).collect();
        assert_eq!(ids, ["vehicle-1", "vehicle-2", "vehicle-3"]);
    }

    #[rstest]
    fn empty_uniform_fleet_is_allowed() {
        let fleet = FleetRegistry::uniform(0, 4, 50.0).expect("empty fleet");
        assert!(fleet.is_empty());
    }
}
