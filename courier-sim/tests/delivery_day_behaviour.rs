//! Behavioural tests for load planning and delayed releases.

use std::cell::RefCell;

use courier_core::test_support::{package, registry_with, sample_distances};
use courier_core::{
    ClockTime, DistanceIndex, PackageId, PackageRegistry, PackageStatus, PackageStore,
    TruckNumber,
};
use courier_sim::{
    Constraints, DeadlineGroup, Simulation, SimulationConfig, SimulationEvent, TimedRequest,
    TruckPin,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

type DaySimulation = Simulation<PackageRegistry, DistanceIndex>;

#[derive(Debug, Default)]
struct DayWorld {
    simulation: RefCell<Option<DaySimulation>>,
    paused: RefCell<Option<DaySimulation>>,
    loaded: RefCell<Vec<(TruckNumber, Vec<PackageId>)>>,
}

impl DayWorld {
    fn with_simulation<T>(&self, action: impl FnOnce(&mut DaySimulation) -> T) -> T {
        let mut slot = self.simulation.borrow_mut();
        let Some(simulation) = slot.as_mut() else {
            panic!("a simulation should be configured first");
        };
        action(simulation)
    }
}

#[fixture]
fn world() -> DayWorld {
    DayWorld::default()
}

#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn clock(text: &str) -> ClockTime {
    text.parse().expect("valid clock")
}

fn ids(values: &[u32]) -> Vec<PackageId> {
    values.iter().copied().map(PackageId).collect()
}

#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn build(
    packages: Vec<courier_core::Package>,
    constraints: Constraints,
    stop_at: Option<ClockTime>,
) -> DaySimulation {
    let config = SimulationConfig {
        speed_mph: 6.0,
        stop_at,
        ..SimulationConfig::default()
    };
    Simulation::new(
        registry_with(packages),
        sample_distances(),
        config,
        constraints,
    )
    .expect("valid simulation")
}

fn install(world: &DayWorld, packages: Vec<courier_core::Package>, constraints: Constraints) {
    world
        .simulation
        .replace(Some(build(packages, constraints, None)));
}

fn delayed_day() -> (Vec<courier_core::Package>, Constraints) {
    let pin = |truck, id| TruckPin {
        truck: TruckNumber(truck),
        package: PackageId(id),
    };
    let constraints = Constraints {
        pinned: vec![pin(1, 1), pin(2, 2), pin(2, 5)],
        timed: vec![TimedRequest::new(courier_core::TimeConstraint::new(
            clock("09:05"),
            courier_core::Direction::After,
            PackageId(3),
        ))],
        ..Constraints::default()
    };
    (
        vec![package(1, 7), package(2, 1), package(3, 3), package(5, 5)],
        constraints,
    )
}

#[given("two trucks where package 3 is available after 09:05")]
fn given_delayed_package(world: &DayWorld) {
    let (packages, constraints) = delayed_day();
    install(world, packages, constraints);
}

#[given("the same day is also run with a stop at 09:00")]
fn given_paused_copy(world: &DayWorld) {
    let (packages, constraints) = delayed_day();
    world
        .paused
        .replace(Some(build(packages, constraints, Some(clock("09:00")))));
}

#[given("six packages sharing a 10:30 deadline across trucks 1 and 2")]
fn given_deadline_group(world: &DayWorld) {
    let constraints = Constraints {
        groups: vec![DeadlineGroup {
            deadline: clock("10:30"),
            trucks: vec![TruckNumber(1), TruckNumber(2)],
            packages: ids(&[4, 1, 6, 3, 5, 2]),
        }],
        ..Constraints::default()
    };
    install(
        world,
        (1..=6).map(|id| package(id, id as usize)).collect(),
        constraints,
    );
}

#[when("the initial load is planned")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn when_planned(world: &DayWorld) {
    let events = world.with_simulation(|simulation| simulation.step().expect("planning succeeds"));
    let loaded = events
        .into_iter()
        .filter_map(|event| match event {
            SimulationEvent::Loaded { truck, packages } => Some((truck, packages)),
            _ => None,
        })
        .collect();
    world.loaded.replace(loaded);
}

#[when("the day runs to completion")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn when_run(world: &DayWorld) {
    world.with_simulation(|simulation| {
        simulation.run().expect("run succeeds");
    });
}

#[when("both days run")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn when_both_run(world: &DayWorld) {
    world.with_simulation(|simulation| {
        simulation.run().expect("run succeeds");
    });
    let mut slot = world.paused.borrow_mut();
    let Some(paused) = slot.as_mut() else {
        panic!("a paused simulation should be configured first");
    };
    paused.run().expect("paused run succeeds");
}

#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn delivered_by(simulation: &DaySimulation, stop: ClockTime) -> Vec<(PackageId, PackageStatus)> {
    simulation
        .store()
        .ids()
        .into_iter()
        .filter_map(|id| {
            let status = simulation.store().find(id).expect("registered").status;
            match status {
                PackageStatus::Delivered { at, .. } if at <= stop => Some((id, status)),
                _ => None,
            }
        })
        .collect()
}

#[then("the paused day shows exactly the deliveries the full day makes by 09:00")]
fn then_paused_matches(world: &DayWorld) {
    let stop = clock("09:00");
    let slot = world.paused.borrow();
    let Some(paused) = slot.as_ref() else {
        panic!("a paused simulation should be configured first");
    };
    let expected = world.with_simulation(|full| delivered_by(full, stop));
    assert_eq!(delivered_by(paused, stop), expected);
    assert_eq!(expected.len(), 2);
}

#[then("package 3 is still parked in the paused day")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_still_parked(world: &DayWorld) {
    let slot = world.paused.borrow();
    let Some(paused) = slot.as_ref() else {
        panic!("a paused simulation should be configured first");
    };
    let record = paused.store().find(PackageId(3)).expect("registered");
    assert_eq!(record.status, PackageStatus::Delayed);
    assert!(paused.census().is_conserved());
}

#[then("package 3 is on no truck")]
fn then_not_loaded(world: &DayWorld) {
    assert!(
        world
            .loaded
            .borrow()
            .iter()
            .all(|(_, packages)| !packages.contains(&PackageId(3)))
    );
    world.with_simulation(|simulation| {
        assert_eq!(simulation.parked().len(), 1);
        assert!(
            simulation
                .trucks()
                .iter()
                .all(|truck| !truck.aboard().contains(&PackageId(3)))
        );
    });
}

#[then("package 3 is released to truck 1, the least-loaded truck")]
fn then_released(world: &DayWorld) {
    world.with_simulation(|simulation| {
        let released: Vec<_> = simulation
            .events()
            .iter()
            .filter_map(|event| match event {
                SimulationEvent::Released { truck, package, at } => Some((*truck, *package, *at)),
                _ => None,
            })
            .collect();
        assert_eq!(
            released,
            vec![(TruckNumber(1), PackageId(3), clock("09:10"))]
        );
    });
}

#[then("package 3 is delivered after 09:05")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_delivered_late(world: &DayWorld) {
    world.with_simulation(|simulation| {
        let record = simulation.store().find(PackageId(3)).expect("registered");
        assert!(matches!(
            record.status,
            PackageStatus::Delivered { at, truck: TruckNumber(1) } if at.has_reached(clock("09:05"))
        ));
    });
}

#[then("every package is delivered")]
fn then_all_delivered(world: &DayWorld) {
    world.with_simulation(|simulation| {
        let census = simulation.census();
        assert_eq!(census.delivered, census.total);
        assert!(simulation.parked().is_empty());
    });
}

fn assert_group_run(world: &DayWorld, truck: u32, expected: &[u32]) {
    let loaded = world.loaded.borrow();
    let packages = loaded
        .iter()
        .find(|(number, _)| *number == TruckNumber(truck))
        .map(|(_, packages)| packages.clone());
    assert_eq!(packages, Some(ids(expected)));
}

#[then("truck 1 carries packages 1, 2 and 3 in route order")]
fn then_first_run(world: &DayWorld) {
    assert_group_run(world, 1, &[1, 2, 3]);
}

#[then("truck 2 carries packages 4, 5 and 6 in route order")]
fn then_second_run(world: &DayWorld) {
    assert_group_run(world, 2, &[4, 5, 6]);
}

#[scenario(path = "tests/features/delivery_day.feature", index = 0)]
fn delayed_packages_wait_for_release(world: DayWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/delivery_day.feature", index = 1)]
fn deadline_groups_split_at_the_midpoint(world: DayWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/delivery_day.feature", index = 2)]
fn paused_days_match_the_full_day(world: DayWorld) {
    let _ = world;
}
