//! Unit tests for vehicle endpoints and handles.

use super::*;
use courier_core::Stop;
use courier_core::test_support::{stop, windowed_stop};
use rstest::{fixture, rstest};

#[fixture]
fn endpoint() -> VehicleEndpoint {
    VehicleEndpoint::new(EndpointConfig::new("v1", 2).with_range(100.0))
}

fn assert_bid(reply: ProposalReply, expected_minutes: f64) {
    match reply {
        ProposalReply::Bid { eta_minutes } => {
            assert!((eta_minutes - expected_minutes).abs() < 1e-9, "{eta_minutes}");
        }
        ProposalReply::Refuse(reason) => panic!("expected a bid, got {reason}"),
    }
}

fn call(x: f64, demand: u32) -> CallForProposal {
    CallForProposal::for_stop(&stop("s", x, 0.0).with_demand(demand))
}

fn take(stop: &Stop) -> Commit {
    Commit::for_stop(stop)
}

#[rstest]
fn bids_travel_time_in_minutes(endpoint: VehicleEndpoint) {
    let reply = endpoint.propose(&CallForProposal::for_stop(&stop("a", 6.0, 8.0)));
    assert_bid(reply, 10.0);
}

#[rstest]
#[case(0.0)]
#[case(-3.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn unusable_distances_are_invalid(endpoint: VehicleEndpoint, #[case] distance_km: f64) {
    let call = CallForProposal {
        stop: stop("s", 5.0, 0.0),
        distance_km,
    };
    assert_eq!(
        endpoint.propose(&call),
        ProposalReply::Refuse(RefusalReason::InvalidRequest)
    );
}

#[rstest]
fn stops_beyond_the_range_are_invalid(endpoint: VehicleEndpoint) {
    assert_eq!(
        endpoint.propose(&call(60.0, 1)),
        ProposalReply::Refuse(RefusalReason::InvalidRequest)
    );
}

#[rstest]
fn heavy_stops_overload(endpoint: VehicleEndpoint) {
    assert_eq!(
        endpoint.propose(&call(5.0, 3)),
        ProposalReply::Refuse(RefusalReason::Overloaded)
    );
}

#[rstest]
fn late_arrivals_are_invalid(endpoint: VehicleEndpoint) {
    let late = windowed_stop("late", 10.0, 0.0, 1, 0.0, 1.0);
    assert_eq!(
        endpoint.propose(&CallForProposal::for_stop(&late)),
        ProposalReply::Refuse(RefusalReason::InvalidRequest)
    );
}

#[rstest]
fn commits_consume_capacity_until_exhausted(mut endpoint: VehicleEndpoint) {
    assert_eq!(endpoint.commit(take(&stop("a", 1.0, 0.0))), CommitReply::Agree);
    assert_eq!(endpoint.commit(take(&stop("b", 1.0, 0.0))), CommitReply::Agree);
    assert_eq!(
        endpoint.commit(take(&stop("c", 1.0, 0.0))),
        CommitReply::Refuse(RefusalReason::Overloaded)
    );

    let status = endpoint.status();
    assert_eq!(status.remaining_capacity, 0);
    assert_eq!(status.committed_stops, 2);
    assert_eq!(
        endpoint.propose(&call(5.0, 1)),
        ProposalReply::Refuse(RefusalReason::Overloaded)
    );
}

#[rstest]
fn later_bids_start_from_the_last_committed_stop(mut endpoint: VehicleEndpoint) {
    let next = CallForProposal::for_stop(&stop("b", 3.0, 0.0));
    assert_bid(endpoint.propose(&next), 3.0);

    assert_eq!(endpoint.commit(take(&stop("a", 3.0, 4.0))), CommitReply::Agree);
    assert_bid(endpoint.propose(&next), 9.0);
    assert!((endpoint.status().planned_distance - 10.0).abs() < 1e-9);
}

#[rstest]
fn range_covers_every_committed_stop() {
    let mut endpoint = VehicleEndpoint::new(EndpointConfig::new("v1", 5).with_range(20.0));
    let north = CallForProposal::for_stop(&stop("n", 0.0, 9.0));
    assert_bid(endpoint.propose(&north), 9.0);

    assert_eq!(endpoint.commit(take(&stop("e", 9.0, 0.0))), CommitReply::Agree);
    assert_eq!(
        endpoint.propose(&north),
        ProposalReply::Refuse(RefusalReason::InvalidRequest)
    );
}

#[rstest]
fn windows_are_checked_after_committed_stops(mut endpoint: VehicleEndpoint) {
    let near = CallForProposal::for_stop(&windowed_stop("near", 0.0, 3.0, 1, 0.0, 5.0));
    assert_bid(endpoint.propose(&near), 3.0);

    assert_eq!(endpoint.commit(take(&stop("far", 10.0, 0.0))), CommitReply::Agree);
    assert_eq!(
        endpoint.propose(&near),
        ProposalReply::Refuse(RefusalReason::InvalidRequest)
    );
}

#[rstest]
fn commit_rechecks_the_route() {
    let mut endpoint = VehicleEndpoint::new(EndpointConfig::new("v1", 5).with_range(20.0));
    assert_eq!(endpoint.commit(take(&stop("e", 9.0, 0.0))), CommitReply::Agree);
    assert_eq!(
        endpoint.commit(take(&stop("n", 0.0, 9.0))),
        CommitReply::Refuse(RefusalReason::InvalidRequest)
    );

    let status = endpoint.status();
    assert_eq!(status.committed_stops, 1);
    assert_eq!(status.remaining_capacity, 4);
    assert!((status.planned_distance - 18.0).abs() < 1e-9);
}

#[tokio::test]
async fn spawned_endpoint_answers_over_its_channel() {
    let handle = VehicleEndpoint::spawn(EndpointConfig::new("v1", 3).with_speed(30.0));
    let wait = Duration::from_secs(1);

    let reply = handle.propose(call(10.0, 1), wait).await.expect("bid");
    assert_bid(reply, 20.0);
    let commit = take(&stop("s", 10.0, 0.0).with_demand(2));
    assert_eq!(handle.commit(commit, wait).await.expect("commit"), CommitReply::Agree);

    let route = VehicleRoute::new("v1", vec![stop("s", 10.0, 0.0)]);
    handle
        .dispatch(route.clone(), wait)
        .await
        .expect("dispatch");
    let status = handle.status(wait).await.expect("status");
    assert_eq!(status.remaining_capacity, 1);
    assert_eq!(status.route, Some(route));
}

#[tokio::test]
async fn closed_endpoint_is_reported() {
    let (sender, inbox) = mpsc::channel(1);
    drop(inbox);
    let handle = VehicleHandle::new("gone", sender);
    let err = handle
        .propose(call(1.0, 1), Duration::from_millis(50))
        .await
        .expect_err("closed channel");
    assert!(matches!(err, NegotiationError::EndpointClosed { vehicle_id } if vehicle_id == "gone"));
}

#[tokio::test]
async fn silent_endpoint_times_out() {
    let (sender, _inbox) = mpsc::channel(1);
    let handle = VehicleHandle::new("mute", sender);
    let err = handle
        .status(Duration::from_millis(20))
        .await
        .expect_err("no reply");
    assert!(matches!(err, NegotiationError::NoReply { vehicle_id, .. } if vehicle_id == "mute"));
}
