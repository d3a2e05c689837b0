//! Vehicle endpoints: one task per vehicle, owning its capacity and route.

use std::time::Duration;

use courier_core::feasibility::distance;
use courier_core::{RouteState, VehicleRoute, VehicleSpec};
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, oneshot};

use crate::error::NegotiationError;
use crate::messages::{
    CallForProposal, Commit, CommitReply, ProposalReply, RefusalReason, VehicleMessage,
    VehicleStatus,
};

/// Default travel speed for endpoints.
pub const DEFAULT_SPEED_KMH: f64 = 60.0;

const INBOX_CAPACITY: usize = 16;

/// Fixed parameters of a vehicle endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    /// Vehicle identifier.
    pub id: String,
    /// Initial capacity.
    pub capacity: u32,
    /// Travel speed used for ETAs.
    pub speed_kmh: f64,
    /// Longest closed tour over all committed stops.
    pub range_km: f64,
}

impl EndpointConfig {
    /// Endpoint with the default speed and unlimited range.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            capacity,
            speed_kmh: DEFAULT_SPEED_KMH,
            range_km: f64::INFINITY,
        }
    }

    /// Endpoint for a registered vehicle; its range is the vehicle's
    /// maximum distance.
    #[must_use]
    pub fn from_vehicle(vehicle: &VehicleSpec) -> Self {
        Self::new(vehicle.id.clone(), vehicle.capacity).with_range(vehicle.max_distance)
    }

    /// Replace the speed.
    #[must_use]
    pub const fn with_speed(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = speed_kmh;
        self
    }

    /// Replace the range.
    #[must_use]
    pub const fn with_range(mut self, range_km: f64) -> Self {
        self.range_km = range_km;
        self
    }
}

/// State owned by a single vehicle worker.
///
/// The endpoint keeps the route built from its committed stops, so every
/// bid already accounts for the stops it agreed to earlier. The handlers
/// are plain methods so the bidding rules can be exercised without a
/// runtime; [`VehicleEndpoint::spawn`] wires them to a channel.
#[derive(Debug, Clone)]
pub struct VehicleEndpoint {
    vehicle: VehicleSpec,
    speed_kmh: f64,
    route: RouteState,
    dispatched: Option<VehicleRoute>,
}

impl VehicleEndpoint {
    /// Endpoint at the depot with its full capacity available.
    #[must_use]
    pub fn new(config: EndpointConfig) -> Self {
        let EndpointConfig {
            id,
            capacity,
            speed_kmh,
            range_km,
        } = config;
        Self {
            vehicle: VehicleSpec {
                id,
                capacity,
                max_distance: range_km,
            },
            speed_kmh,
            route: RouteState::new(),
            dispatched: None,
        }
    }

    /// Run the endpoint on the current Tokio runtime.
    ///
    /// The task ends once every handle is dropped.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(config: EndpointConfig) -> VehicleHandle {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let handle = VehicleHandle::new(config.id.clone(), sender);
        tokio::spawn(Self::new(config).run(inbox));
        handle
    }

    /// Serve messages until the channel closes.
    pub async fn run(mut self, mut inbox: mpsc::Receiver<VehicleMessage>) {
        while let Some(message) = inbox.recv().await {
            self.handle(message);
        }
        log::debug!("{}: inbox closed", self.vehicle.id);
    }

    fn handle(&mut self, message: VehicleMessage) {
        // A dropped reply receiver means the coordinator stopped waiting.
        match message {
            VehicleMessage::Proposal { call, reply } => {
                let _ignored = reply.send(self.propose(&call));
            }
            VehicleMessage::Commit { commit, reply } => {
                let _ignored = reply.send(self.commit(commit));
            }
            VehicleMessage::Status { reply } => {
                let _ignored = reply.send(self.status());
            }
            VehicleMessage::Route(route) => {
                log::info!(
                    "{}: route size={} distance={:.1}",
                    self.vehicle.id,
                    route.stops.len(),
                    route.distance
                );
                self.dispatched = Some(route);
            }
        }
    }

    const fn remaining(&self) -> u32 {
        self.vehicle.capacity.saturating_sub(self.route.load)
    }

    /// Bid the arrival time at the stop after the committed ones, in
    /// minutes, or refuse.
    ///
    /// The arrival is the route clock plus the leg from the last committed
    /// stop, converted at the endpoint's speed. Refuses with
    /// [`RefusalReason::Overloaded`] when the remaining capacity is below
    /// the stop's demand, and with [`RefusalReason::InvalidRequest`] when
    /// the stop sits on the depot, would push the closed tour past the
    /// range or would be reached outside its window.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "ETA is floating point")]
    pub fn propose(&self, call: &CallForProposal) -> ProposalReply {
        let depot_distance = call.distance_km;
        if !depot_distance.is_finite() || depot_distance <= 0.0 {
            return ProposalReply::Refuse(RefusalReason::InvalidRequest);
        }
        if self.remaining() < call.stop.demand {
            return ProposalReply::Refuse(RefusalReason::Overloaded);
        }
        if !self.route.can_append(&call.stop, &self.vehicle) {
            return ProposalReply::Refuse(RefusalReason::InvalidRequest);
        }
        let arrival = self.route.clock + distance(self.route.position, call.stop.location);
        let eta_minutes = arrival / self.speed_kmh * 60.0;
        if !eta_minutes.is_finite() {
            return ProposalReply::Refuse(RefusalReason::InvalidRequest);
        }
        ProposalReply::Bid { eta_minutes }
    }

    /// Append the stop to the route if it still fits.
    ///
    /// Capacity and feasibility are checked against the route as it stands
    /// at commit time.
    pub fn commit(&mut self, commit: Commit) -> CommitReply {
        let Commit { stop } = commit;
        if self.remaining() < stop.demand {
            return CommitReply::Refuse(RefusalReason::Overloaded);
        }
        if !self.route.can_append(&stop, &self.vehicle) {
            return CommitReply::Refuse(RefusalReason::InvalidRequest);
        }
        log::debug!(
            "{}: took {} ({} capacity left)",
            self.vehicle.id,
            stop.id,
            self.remaining().saturating_sub(stop.demand)
        );
        self.route.push(stop);
        CommitReply::Agree
    }

    /// Current state.
    #[must_use]
    pub fn status(&self) -> VehicleStatus {
        VehicleStatus {
            vehicle_id: self.vehicle.id.clone(),
            remaining_capacity: self.remaining(),
            speed_kmh: self.speed_kmh,
            range_km: self.vehicle.max_distance,
            committed_stops: self.route.len(),
            planned_distance: self.route.closed_distance(),
            route: self.dispatched.clone(),
        }
    }
}

/// Sending side of an endpoint.
#[derive(Debug, Clone)]
pub struct VehicleHandle {
    id: String,
    sender: mpsc::Sender<VehicleMessage>,
}

impl VehicleHandle {
    /// Wrap a channel to an endpoint, which may be any task speaking
    /// [`VehicleMessage`].
    pub fn new(id: impl Into<String>, sender: mpsc::Sender<VehicleMessage>) -> Self {
        Self {
            id: id.into(),
            sender,
        }
    }

    /// Vehicle identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ask for a bid, waiting at most `wait` for the answer.
    pub async fn propose(
        &self,
        call: CallForProposal,
        wait: Duration,
    ) -> Result<ProposalReply, NegotiationError> {
        self.request(|reply| VehicleMessage::Proposal { call, reply }, wait)
            .await
    }

    /// Ask the vehicle to take a stop, waiting at most `wait`.
    pub async fn commit(
        &self,
        commit: Commit,
        wait: Duration,
    ) -> Result<CommitReply, NegotiationError> {
        self.request(|reply| VehicleMessage::Commit { commit, reply }, wait)
            .await
    }

    /// Ask for a status snapshot, waiting at most `wait`.
    pub async fn status(&self, wait: Duration) -> Result<VehicleStatus, NegotiationError> {
        self.request(|reply| VehicleMessage::Status { reply }, wait)
            .await
    }

    /// Hand the vehicle its final route, waiting at most `wait` for room
    /// in its inbox.
    pub async fn dispatch(
        &self,
        route: VehicleRoute,
        wait: Duration,
    ) -> Result<(), NegotiationError> {
        self.sender
            .send_timeout(VehicleMessage::Route(route), wait)
            .await
            .map_err(|err| match err {
                SendTimeoutError::Timeout(_) => NegotiationError::NoReply {
                    vehicle_id: self.id.clone(),
                    waited: wait,
                },
                SendTimeoutError::Closed(_) => self.closed(),
            })
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> VehicleMessage,
        wait: Duration,
    ) -> Result<T, NegotiationError> {
        let (reply, answer) = oneshot::channel();
        let exchange = async {
            self.sender
                .send(message(reply))
                .await
                .map_err(|_| self.closed())?;
            answer.await.map_err(|_| self.closed())
        };
        tokio::time::timeout(wait, exchange)
            .await
            .map_err(|_| NegotiationError::NoReply {
                vehicle_id: self.id.clone(),
                waited: wait,
            })?
    }

    fn closed(&self) -> NegotiationError {
        NegotiationError::EndpointClosed {
            vehicle_id: self.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests;
