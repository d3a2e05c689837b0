//! Errors raised while negotiating.

use std::time::Duration;

use courier_core::BuildError;
use thiserror::Error;

use crate::wire::MalformedBid;

/// Failures of a negotiation run or of a single exchange with an endpoint.
///
/// Only [`NegotiationError::NoVehiclesRegistered`] and
/// [`NegotiationError::InvalidStops`] abort a run; the others are logged by
/// the coordinator and treated as a refusal from that vehicle.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// The coordinator has no endpoints to negotiate with.
    #[error("no vehicles registered")]
    NoVehiclesRegistered,
    /// The stop list failed validation.
    #[error(transparent)]
    InvalidStops(#[from] BuildError),
    /// The endpoint's task has stopped.
    #[error("vehicle {vehicle_id} is no longer reachable")]
    EndpointClosed {
        /// Vehicle whose channel closed.
        vehicle_id: String,
    },
    /// The endpoint did not answer within the reply timeout.
    #[error("vehicle {vehicle_id} did not reply within {waited:?}")]
    NoReply {
        /// Silent vehicle.
        vehicle_id: String,
        /// How long the coordinator waited.
        waited: Duration,
    },
    /// The endpoint bid an unusable ETA.
    #[error("vehicle {vehicle_id} sent a malformed bid: {source}")]
    MalformedBid {
        /// Vehicle that sent the bid.
        vehicle_id: String,
        /// Parse or range failure.
        source: MalformedBid,
    },
}
