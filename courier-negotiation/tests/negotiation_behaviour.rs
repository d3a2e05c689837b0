//! Behavioural tests for the negotiation coordinator using rstest-bdd.

use std::cell::RefCell;
use std::time::Duration;

use courier_core::test_support::solution_violations;
use courier_core::{FleetRegistry, Stop, TimeWindow, VehicleSpec};
use courier_negotiation::{
    Coordinator, EndpointConfig, NegotiationConfig, NegotiationError, NegotiationOutcome,
    VehicleEndpoint, VehicleStatus,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

#[derive(Debug)]
struct NegotiationWorld {
    runtime: Runtime,
    endpoints: RefCell<Vec<EndpointConfig>>,
    stops: RefCell<Vec<Stop>>,
    result: RefCell<Option<Result<NegotiationOutcome, NegotiationError>>>,
    survey: RefCell<Vec<VehicleStatus>>,
}

impl NegotiationWorld {
    fn outcome(&self) -> NegotiationOutcome {
        match self.result.borrow().as_ref() {
            Some(Ok(outcome)) => outcome.clone(),
            Some(Err(err)) => panic!("negotiation failed: {err}"),
            None => panic!("negotiation should run before assertions"),
        }
    }
}

#[fixture]
#[expect(clippy::expect_used, reason = "test runtime must start")]
fn world() -> NegotiationWorld {
    NegotiationWorld {
        runtime: tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build test runtime"),
        endpoints: RefCell::new(Vec::new()),
        stops: RefCell::new(Vec::new()),
        result: RefCell::new(None),
        survey: RefCell::new(Vec::new()),
    }
}

#[given("vehicle {id} with capacity {capacity} travelling at {speed} km/h")]
fn given_vehicle(world: &NegotiationWorld, id: String, capacity: u32, speed: f64) {
    world
        .endpoints
        .borrow_mut()
        .push(EndpointConfig::new(id.trim_matches('"'), capacity).with_speed(speed));
}

#[given("a ranged vehicle {id} with capacity {capacity} and range {range} travelling at {speed} km/h")]
fn given_ranged_vehicle(
    world: &NegotiationWorld,
    id: String,
    capacity: u32,
    range: f64,
    speed: f64,
) {
    world.endpoints.borrow_mut().push(
        EndpointConfig::new(id.trim_matches('"'), capacity)
            .with_range(range)
            .with_speed(speed),
    );
}

#[given("a stop {id} at {x}, {y}")]
fn given_stop(world: &NegotiationWorld, id: String, x: f64, y: f64) {
    world
        .stops
        .borrow_mut()
        .push(Stop::new(id.trim_matches('"'), x, y));
}

#[given("a late-window stop {id} at {x}, {y} due by {end}")]
#[expect(clippy::expect_used, reason = "feature windows are well formed")]
fn given_windowed_stop(world: &NegotiationWorld, id: String, x: f64, y: f64, end: f64) {
    let window = TimeWindow::new(0.0, end).expect("valid window");
    world
        .stops
        .borrow_mut()
        .push(Stop::new(id.trim_matches('"'), x, y).with_window(window));
}

#[when("the coordinator negotiates")]
fn when_negotiating(world: &NegotiationWorld) {
    let configs = world.endpoints.borrow().clone();
    let stops = world.stops.borrow().clone();
    let config = NegotiationConfig::default().with_reply_timeout(Duration::from_millis(200));
    let (result, survey) = world.runtime.block_on(async move {
        let handles = configs.into_iter().map(VehicleEndpoint::spawn).collect();
        let coordinator = Coordinator::new(handles, config);
        let result = coordinator.negotiate(&stops).await;
        let survey = coordinator.survey().await.unwrap_or_default();
        (result, survey)
    });
    world.result.replace(Some(result));
    world.survey.replace(survey);
}

#[then("vehicle {vehicle} serves {stop}")]
fn then_vehicle_serves(world: &NegotiationWorld, vehicle: String, stop: String) {
    let outcome = world.outcome();
    let served: Vec<String> = outcome
        .solution
        .route(vehicle.trim_matches('"'))
        .map(|route| route.stops.iter().map(|s| s.id.clone()).collect())
        .unwrap_or_default();
    assert_eq!(served, [stop.trim_matches('"').to_owned()]);
}

#[then("{stop} is unassigned")]
fn then_unassigned(world: &NegotiationWorld, stop: String) {
    let id = stop.trim_matches('"');
    assert!(world.outcome().unassigned.iter().any(|s| s.id == id));
}

#[then("vehicle {vehicle} reports {remaining} capacity left")]
fn then_capacity_left(world: &NegotiationWorld, vehicle: String, remaining: u32) {
    let id = vehicle.trim_matches('"');
    let survey = world.survey.borrow();
    let status = survey.iter().find(|status| status.vehicle_id == id);
    assert_eq!(status.map(|s| s.remaining_capacity), Some(remaining));
}

#[then("every route respects its vehicle limits")]
#[expect(clippy::expect_used, reason = "feature vehicles have distinct ids")]
fn then_routes_respect_limits(world: &NegotiationWorld) {
    let vehicles = world
        .endpoints
        .borrow()
        .iter()
        .map(|config| VehicleSpec {
            id: config.id.clone(),
            capacity: config.capacity,
            max_distance: config.range_km,
        })
        .collect();
    let fleet = FleetRegistry::new(vehicles).expect("fleet");
    let stops = world.stops.borrow();
    let violations = solution_violations(&world.outcome().solution, &stops, &fleet);
    assert!(violations.is_empty(), "{violations:?}");
}

#[then("negotiation fails because no vehicles are registered")]
fn then_no_vehicles(world: &NegotiationWorld) {
    assert!(matches!(
        world.result.borrow().as_ref(),
        Some(Err(NegotiationError::NoVehiclesRegistered))
    ));
}

#[scenario(path = "tests/features/negotiation.feature", index = 0)]
fn fastest_bidder_wins(world: NegotiationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/negotiation.feature", index = 1)]
fn late_stop_unassigned(world: NegotiationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/negotiation.feature", index = 2)]
fn capacity_runs_out(world: NegotiationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/negotiation.feature", index = 3)]
fn no_vehicles(world: NegotiationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/negotiation.feature", index = 4)]
fn range_spans_the_whole_route(world: NegotiationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/negotiation.feature", index = 5)]
fn window_missed_after_earlier_stop(world: NegotiationWorld) {
    let _ = world;
}
