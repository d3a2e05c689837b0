//! Unit tests for the coordinator.

use std::collections::VecDeque;

use super::*;
use crate::messages::{RefusalReason, VehicleMessage};
use courier_core::test_support::{fleet, solution_violations, stop, windowed_stop};
use rstest::fixture;
use tokio::sync::mpsc;

#[fixture]
fn quick() -> NegotiationConfig {
    NegotiationConfig::default().with_reply_timeout(Duration::from_millis(50))
}

/// Endpoint that always answers with `eta` and plays `commits` in order,
/// agreeing once they run out.
fn scripted(id: &str, eta: Option<f64>, mut commits: VecDeque<CommitReply>) -> VehicleHandle {
    let (sender, mut inbox) = mpsc::channel(4);
    tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            match message {
                VehicleMessage::Proposal { reply, .. } => {
                    let answer = eta.map_or(
                        ProposalReply::Refuse(RefusalReason::InvalidRequest),
                        |eta_minutes| ProposalReply::Bid { eta_minutes },
                    );
                    let _ignored = reply.send(answer);
                }
                VehicleMessage::Commit { reply, .. } => {
                    let _ignored = reply.send(commits.pop_front().unwrap_or(CommitReply::Agree));
                }
                VehicleMessage::Status { .. } | VehicleMessage::Route(_) => {}
            }
        }
    });
    VehicleHandle::new(id, sender)
}

fn route_ids(outcome: &NegotiationOutcome, vehicle: &str) -> Vec<String> {
    outcome
        .solution
        .route(vehicle)
        .map(|route| route.stops.iter().map(|stop| stop.id.clone()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn lowest_eta_wins() {
    let vehicles = vec![
        VehicleEndpoint::spawn(EndpointConfig::new("a", 5).with_speed(120.0)),
        VehicleEndpoint::spawn(EndpointConfig::new("b", 5).with_speed(200.0)),
    ];
    let coordinator = Coordinator::new(vehicles, quick());
    let outcome = coordinator
        .negotiate(&[stop("s", 6.0, 8.0)])
        .await
        .expect("negotiate");

    assert_eq!(route_ids(&outcome, "b"), ["s"]);
    assert!(route_ids(&outcome, "a").is_empty());
}

#[tokio::test]
async fn equal_bids_go_to_the_first_vehicle() {
    let vehicles = vec![
        scripted("a", Some(4.0), VecDeque::new()),
        scripted("b", Some(4.0), VecDeque::new()),
    ];
    let outcome = Coordinator::new(vehicles, quick())
        .negotiate(&[stop("s", 1.0, 1.0)])
        .await
        .expect("negotiate");
    assert_eq!(route_ids(&outcome, "a"), ["s"]);
}

#[tokio::test]
async fn refused_commit_is_retried() {
    let refuse_once = VecDeque::from([CommitReply::Refuse(RefusalReason::Overloaded)]);
    let vehicles = vec![scripted("a", Some(1.0), refuse_once)];
    let outcome = Coordinator::new(vehicles, quick())
        .negotiate(&[stop("s", 1.0, 0.0)])
        .await
        .expect("negotiate");

    assert_eq!(route_ids(&outcome, "a"), ["s"]);
    assert!(outcome.unassigned.is_empty());
}

#[tokio::test]
async fn endless_refusals_are_bounded() {
    let always = VecDeque::from(vec![CommitReply::Refuse(RefusalReason::Overloaded); 10]);
    let vehicles = vec![scripted("a", Some(1.0), always)];
    let config = quick().with_max_commit_refusals(2);
    let outcome = Coordinator::new(vehicles, config)
        .negotiate(&[stop("s", 1.0, 0.0)])
        .await
        .expect("negotiate");

    assert_eq!(outcome.solution.delivered, 0);
    assert_eq!(outcome.unassigned.len(), 1);
}

#[tokio::test]
async fn silent_and_malformed_vehicles_count_as_refusals() {
    let (silent_sender, _silent_inbox) = mpsc::channel(4);
    let vehicles = vec![
        VehicleHandle::new("mute", silent_sender),
        scripted("nan", Some(f64::NAN), VecDeque::new()),
        scripted("slow", Some(30.0), VecDeque::new()),
    ];
    let outcome = Coordinator::new(vehicles, quick())
        .negotiate(&[stop("s", 3.0, 4.0)])
        .await
        .expect("negotiate");
    assert_eq!(route_ids(&outcome, "slow"), ["s"]);
}

#[tokio::test]
async fn stop_outside_its_window_stays_unassigned() {
    let coordinator = Coordinator::spawn_fleet(&fleet(1, 5, 100.0), 60.0, quick());
    let late = windowed_stop("late", 10.0, 0.0, 1, 0.0, 1.0);
    let outcome = coordinator.negotiate(&[late]).await.expect("negotiate");

    assert_eq!(outcome.solution.delivered, 0);
    assert_eq!(
        outcome.unassigned.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        ["late"]
    );
}

#[tokio::test]
async fn capacity_runs_out_and_routes_are_dispatched() {
    let registry = fleet(1, 2, 100.0);
    let coordinator = Coordinator::spawn_fleet(&registry, 60.0, quick());
    let stops = vec![stop("a", 1.0, 0.0), stop("b", 2.0, 0.0), stop("c", 3.0, 0.0)];
    let outcome = coordinator.negotiate(&stops).await.expect("negotiate");

    assert_eq!(route_ids(&outcome, "vehicle-1"), ["a", "b"]);
    assert_eq!(outcome.unassigned.len(), 1);
    assert!(solution_violations(&outcome.solution, &stops, &registry).is_empty());

    let survey = coordinator.survey().await.expect("survey");
    let status = survey.first().expect("one vehicle");
    assert_eq!(status.remaining_capacity, 0);
    assert_eq!(status.committed_stops, 2);
    assert_eq!(status.route.as_ref().map(|route| route.stops.len()), Some(2));
}

#[tokio::test]
async fn range_is_shared_by_every_stop_on_a_route() {
    let registry = fleet(1, 5, 20.0);
    let coordinator = Coordinator::spawn_fleet(&registry, 60.0, quick());
    let stops = vec![
        stop("e", 9.0, 0.0),
        stop("n", 0.0, 9.0),
        stop("w", -9.0, 0.0),
    ];
    let outcome = coordinator.negotiate(&stops).await.expect("negotiate");

    assert_eq!(route_ids(&outcome, "vehicle-1"), ["e"]);
    assert_eq!(
        outcome.unassigned.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        ["n", "w"]
    );
    assert!(outcome.solution.total_distance <= 20.0);
    assert!(solution_violations(&outcome.solution, &stops, &registry).is_empty());
}

#[tokio::test]
async fn window_missed_after_an_earlier_stop_goes_elsewhere() {
    let registry = fleet(2, 5, 100.0);
    let coordinator = Coordinator::spawn_fleet(&registry, 60.0, quick());
    let stops = vec![
        stop("far", 10.0, 0.0),
        windowed_stop("near", 0.0, 3.0, 1, 0.0, 5.0),
    ];
    let outcome = coordinator.negotiate(&stops).await.expect("negotiate");

    assert_eq!(route_ids(&outcome, "vehicle-1"), ["far"]);
    assert_eq!(route_ids(&outcome, "vehicle-2"), ["near"]);
    assert!(outcome.unassigned.is_empty());
    assert!(solution_violations(&outcome.solution, &stops, &registry).is_empty());
}

#[tokio::test]
async fn no_vehicles_is_fatal() {
    let coordinator = Coordinator::new(Vec::new(), quick());
    assert!(matches!(
        coordinator.negotiate(&[stop("s", 1.0, 0.0)]).await,
        Err(NegotiationError::NoVehiclesRegistered)
    ));
    assert!(matches!(
        coordinator.survey().await,
        Err(NegotiationError::NoVehiclesRegistered)
    ));
}
