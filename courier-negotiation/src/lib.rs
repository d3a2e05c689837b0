//! Stop-by-stop negotiation between a coordinator and vehicle endpoints.
//!
//! Every vehicle runs as its own task ([`VehicleEndpoint::spawn`]) and owns
//! the route built from the stops it has committed to, so it only bids for
//! a stop that still fits after them. The [`Coordinator`] offers one stop at
//! a time: it broadcasts a [`CallForProposal`] to all endpoints, waits for
//! every reply (or for [`NegotiationConfig::reply_timeout`] to pass),
//! commits the stop to the lowest ETA and requeues it when no vehicle bids
//! or the winner refuses the commit.
//!
//! Endpoints reached over a text transport join through [`TextEndpoint`],
//! which translates messages with the [`wire`] codec.
//!
//! ```no_run
//! use courier_core::{FleetRegistry, Stop};
//! use courier_negotiation::{Coordinator, NegotiationConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fleet = FleetRegistry::uniform(2, 3, 100.0)?;
//! let coordinator = Coordinator::spawn_fleet(&fleet, 60.0, NegotiationConfig::default());
//! let outcome = coordinator.negotiate(&[Stop::new("a", 3.0, 4.0)]).await?;
//! assert_eq!(outcome.solution.delivered, 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod coordinator;
mod endpoint;
mod error;
mod messages;
mod text;
pub mod wire;

pub use coordinator::{Coordinator, NegotiationConfig, NegotiationOutcome};
pub use endpoint::{DEFAULT_SPEED_KMH, EndpointConfig, VehicleEndpoint, VehicleHandle};
pub use error::NegotiationError;
pub use messages::{
    CallForProposal, Commit, CommitReply, ProposalReply, RefusalReason, VehicleMessage,
    VehicleStatus,
};
pub use text::{TextEndpoint, TextResponder};
pub use wire::{MalformedBid, MalformedRequest};
