//! The negotiation coordinator.

use std::collections::VecDeque;
use std::time::Duration;

use courier_core::{FleetRegistry, Solution, Stop, VehicleRoute, prepare_stops};
use futures_util::future::join_all;

use crate::endpoint::{EndpointConfig, VehicleEndpoint, VehicleHandle};
use crate::error::NegotiationError;
use crate::messages::{CallForProposal, Commit, CommitReply, ProposalReply, VehicleStatus};
use crate::wire::validate_eta;

/// Tuning knobs for a [`Coordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiationConfig {
    /// Longest wait for any single reply; silence counts as a refusal.
    pub reply_timeout: Duration,
    /// Commit refusals a single stop may collect before it is given up.
    pub max_commit_refusals: usize,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(5),
            max_commit_refusals: 3,
        }
    }
}

impl NegotiationConfig {
    /// Replace the reply timeout.
    #[must_use]
    pub const fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Replace the per-stop commit refusal limit.
    #[must_use]
    pub const fn with_max_commit_refusals(mut self, max_commit_refusals: usize) -> Self {
        self.max_commit_refusals = max_commit_refusals;
        self
    }
}

/// Result of [`Coordinator::negotiate`].
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationOutcome {
    /// One route per endpoint, stops in assignment order.
    pub solution: Solution,
    /// Stops no vehicle would take.
    pub unassigned: Vec<Stop>,
}

enum Resolution {
    Assigned(usize),
    NoBids,
    Refused,
}

struct PendingStop {
    stop: Stop,
    refusals: usize,
}

/// Assigns stops to vehicle endpoints one at a time.
///
/// For each pending stop the coordinator broadcasts a call for proposals,
/// collects every reply, commits to the lowest ETA (first endpoint on ties)
/// and waits for the answer before offering the next stop. A stop nobody
/// bids on, or whose winner refuses the commit, goes to the back of the
/// queue. A stop is given up once it has collected
/// [`NegotiationConfig::max_commit_refusals`] refusals, and when a stop
/// draws no bids after a whole pass over the queue assigned nothing, the
/// remaining stops are all reported as unassigned.
#[derive(Debug, Clone)]
pub struct Coordinator {
    vehicles: Vec<VehicleHandle>,
    config: NegotiationConfig,
}

impl Coordinator {
    /// Coordinate the given endpoints.
    #[must_use]
    pub const fn new(vehicles: Vec<VehicleHandle>, config: NegotiationConfig) -> Self {
        Self { vehicles, config }
    }

    /// Spawn one endpoint per registered vehicle, all at `speed_kmh`.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn spawn_fleet(fleet: &FleetRegistry, speed_kmh: f64, config: NegotiationConfig) -> Self {
        let vehicles = fleet
            .iter()
            .map(|vehicle| {
                VehicleEndpoint::spawn(EndpointConfig::from_vehicle(vehicle).with_speed(speed_kmh))
            })
            .collect();
        Self::new(vehicles, config)
    }

    /// Endpoints in registration order.
    #[must_use]
    pub fn vehicles(&self) -> &[VehicleHandle] {
        &self.vehicles
    }

    /// Negotiate every stop and hand each vehicle its resulting route.
    ///
    /// # Errors
    /// Returns [`NegotiationError::NoVehiclesRegistered`] when there are no
    /// endpoints and [`NegotiationError::InvalidStops`] when a stop fails
    /// validation. Misbehaving endpoints never fail the run.
    pub async fn negotiate(&self, stops: &[Stop]) -> Result<NegotiationOutcome, NegotiationError> {
        if self.vehicles.is_empty() {
            return Err(NegotiationError::NoVehiclesRegistered);
        }
        let mut pending: VecDeque<PendingStop> = prepare_stops(stops)?
            .into_iter()
            .map(|stop| PendingStop { stop, refusals: 0 })
            .collect();
        let mut assigned: Vec<Vec<Stop>> = vec![Vec::new(); self.vehicles.len()];
        let mut unassigned = Vec::new();
        let mut attempts_without_progress = 0_usize;

        while let Some(mut entry) = pending.pop_front() {
            log::debug!("negotiation: requesting delivery for {}", entry.stop.id);
            match self.negotiate_stop(&entry.stop).await {
                Resolution::Assigned(index) => {
                    attempts_without_progress = 0;
                    if let Some(route) = assigned.get_mut(index) {
                        route.push(entry.stop);
                    }
                }
                Resolution::NoBids if attempts_without_progress >= pending.len() => {
                    log::warn!(
                        "negotiation: no assignment in a full pass, giving up on {} stops",
                        pending.len() + 1
                    );
                    unassigned.push(entry.stop);
                    unassigned.extend(pending.drain(..).map(|rest| rest.stop));
                }
                Resolution::Refused if entry.refusals >= self.config.max_commit_refusals => {
                    log::warn!(
                        "negotiation: giving up on {} after {} commit refusals",
                        entry.stop.id,
                        entry.refusals + 1
                    );
                    unassigned.push(entry.stop);
                }
                resolution => {
                    attempts_without_progress += 1;
                    if matches!(resolution, Resolution::Refused) {
                        entry.refusals += 1;
                    }
                    log::info!("negotiation: re-queueing {}", entry.stop.id);
                    pending.push_back(entry);
                }
            }
        }

        let routes: Vec<VehicleRoute> = self
            .vehicles
            .iter()
            .zip(assigned)
            .map(|(vehicle, stops)| VehicleRoute::new(vehicle.id(), stops))
            .collect();
        self.dispatch_routes(&routes).await;

        let solution = Solution::from_routes(routes);
        log::info!(
            "negotiation: delivered {}, unassigned {}, total distance {:.2}",
            solution.delivered,
            unassigned.len(),
            solution.total_distance
        );
        Ok(NegotiationOutcome {
            solution,
            unassigned,
        })
    }

    /// Ask every endpoint for its status; silent endpoints are skipped.
    ///
    /// # Errors
    /// Returns [`NegotiationError::NoVehiclesRegistered`] when there are no
    /// endpoints.
    pub async fn survey(&self) -> Result<Vec<VehicleStatus>, NegotiationError> {
        if self.vehicles.is_empty() {
            return Err(NegotiationError::NoVehiclesRegistered);
        }
        let wait = self.config.reply_timeout;
        let replies = join_all(self.vehicles.iter().map(|vehicle| vehicle.status(wait))).await;
        Ok(replies
            .into_iter()
            .filter_map(|reply| {
                reply
                    .inspect_err(|err| log::warn!("negotiation: survey skipped: {err}"))
                    .ok()
            })
            .collect())
    }

    async fn negotiate_stop(&self, stop: &Stop) -> Resolution {
        let Some((index, eta)) = self.best_bid(stop).await else {
            log::info!("negotiation: no proposals for {}", stop.id);
            return Resolution::NoBids;
        };
        let Some(vehicle) = self.vehicles.get(index) else {
            return Resolution::NoBids;
        };
        log::debug!(
            "negotiation: best proposal for {} is {eta:.2} min from {}",
            stop.id,
            vehicle.id()
        );

        match vehicle.commit(Commit::for_stop(stop), self.config.reply_timeout).await {
            Ok(CommitReply::Agree) => {
                log::info!("negotiation: {} assigned to {}", stop.id, vehicle.id());
                Resolution::Assigned(index)
            }
            Ok(CommitReply::Refuse(reason)) => {
                log::info!(
                    "negotiation: {} refused {} at commit ({reason})",
                    vehicle.id(),
                    stop.id
                );
                Resolution::Refused
            }
            Err(err) => {
                log::warn!("negotiation: commit for {} failed: {err}", stop.id);
                Resolution::Refused
            }
        }
    }

    /// Lowest valid ETA among all replies, first endpoint on ties.
    async fn best_bid(&self, stop: &Stop) -> Option<(usize, f64)> {
        let call = CallForProposal::for_stop(stop);
        let wait = self.config.reply_timeout;
        let replies = join_all(
            self.vehicles
                .iter()
                .map(|vehicle| vehicle.propose(call.clone(), wait)),
        )
        .await;

        replies
            .into_iter()
            .zip(&self.vehicles)
            .enumerate()
            .filter_map(|(index, (reply, vehicle))| {
                bid_of(reply, vehicle).map(|eta| (index, eta))
            })
            .min_by(|(_, lhs), (_, rhs)| lhs.total_cmp(rhs))
    }

    async fn dispatch_routes(&self, routes: &[VehicleRoute]) {
        let sends = self
            .vehicles
            .iter()
            .zip(routes)
            .map(|(vehicle, route)| vehicle.dispatch(route.clone(), self.config.reply_timeout));
        for result in join_all(sends).await {
            if let Err(err) = result {
                log::warn!("negotiation: route dispatch failed: {err}");
            }
        }
    }
}

/// ETA of a usable bid; refusals, silence and malformed bids yield `None`.
fn bid_of(reply: Result<ProposalReply, NegotiationError>, vehicle: &VehicleHandle) -> Option<f64> {
    match reply {
        Ok(ProposalReply::Bid { eta_minutes }) => validate_eta(eta_minutes)
            .map_err(|source| NegotiationError::MalformedBid {
                vehicle_id: vehicle.id().to_owned(),
                source,
            })
            .inspect_err(|err| log::warn!("negotiation: {err}; treating as refusal"))
            .ok(),
        Ok(ProposalReply::Refuse(reason)) => {
            log::debug!("negotiation: {} refused ({reason})", vehicle.id());
            None
        }
        Err(err) => {
            log::warn!("negotiation: {err}; treating as refusal");
            None
        }
    }
}

#[cfg(test)]
mod tests;
