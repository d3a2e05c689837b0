//! Typed messages exchanged between the coordinator and vehicle endpoints.

use std::fmt;

use courier_core::feasibility::{DEPOT, distance};
use courier_core::{Stop, VehicleRoute};
use tokio::sync::oneshot;

use crate::wire;

/// Request for vehicles to bid an ETA for one stop.
#[derive(Debug, Clone, PartialEq)]
pub struct CallForProposal {
    /// Stop being offered, with its location, demand and window.
    pub stop: Stop,
    /// Straight-line distance from the depot to the stop.
    pub distance_km: f64,
}

impl CallForProposal {
    /// Build the call for `stop`.
    #[must_use]
    pub fn for_stop(stop: &Stop) -> Self {
        Self {
            stop: stop.clone(),
            distance_km: distance(DEPOT, stop.location),
        }
    }
}

/// Why an endpoint declined a call or a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefusalReason {
    /// Not enough capacity left.
    Overloaded,
    /// The stop cannot follow the vehicle's committed stops: bad distance,
    /// out of range or outside the service window.
    InvalidRequest,
}

impl RefusalReason {
    /// Reason code used on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Overloaded => wire::OVERLOADED,
            Self::InvalidRequest => wire::INVALID_REQUEST,
        }
    }

    /// Parse a wire reason code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            wire::OVERLOADED => Some(Self::Overloaded),
            wire::INVALID_REQUEST => Some(Self::InvalidRequest),
            _ => None,
        }
    }
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Answer to a [`CallForProposal`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProposalReply {
    /// Offer to serve the stop.
    Bid {
        /// Estimated arrival in minutes.
        eta_minutes: f64,
    },
    /// Decline the stop.
    Refuse(RefusalReason),
}

/// Instruction to take a stop the vehicle bid on.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    /// Stop being assigned; it is appended to the vehicle's route.
    pub stop: Stop,
}

impl Commit {
    /// Build the commit for `stop`.
    #[must_use]
    pub fn for_stop(stop: &Stop) -> Self {
        Self { stop: stop.clone() }
    }
}

/// Answer to a [`Commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitReply {
    /// The vehicle reserved capacity for the stop.
    Agree,
    /// The vehicle can no longer take the stop.
    Refuse(RefusalReason),
}

/// Snapshot of an endpoint's state.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleStatus {
    /// Vehicle identifier.
    pub vehicle_id: String,
    /// Capacity not yet committed.
    pub remaining_capacity: u32,
    /// Travel speed used for ETAs.
    pub speed_kmh: f64,
    /// Longest closed tour the vehicle may drive.
    pub range_km: f64,
    /// Stops committed so far.
    pub committed_stops: usize,
    /// Closed tour length over the committed stops.
    pub planned_distance: f64,
    /// Final route, once the coordinator has dispatched it.
    pub route: Option<VehicleRoute>,
}

/// Inbound message for a vehicle endpoint.
///
/// Request variants carry the channel the endpoint answers on.
#[derive(Debug)]
pub enum VehicleMessage {
    /// Bid request.
    Proposal {
        /// Stop on offer.
        call: CallForProposal,
        /// Where to send the bid or refusal.
        reply: oneshot::Sender<ProposalReply>,
    },
    /// Commit request.
    Commit {
        /// Stop to take.
        commit: Commit,
        /// Where to send agreement or refusal.
        reply: oneshot::Sender<CommitReply>,
    },
    /// Status survey.
    Status {
        /// Where to send the snapshot.
        reply: oneshot::Sender<VehicleStatus>,
    },
    /// Final route for the vehicle; no reply.
    Route(VehicleRoute),
}
