//! Property-based tests for routing and simulation.
//!
//! # Invariants tested
//!
//! - **Permutation:** nearest-neighbour ordering returns every input stop
//!   exactly once.
//! - **Greedy choice:** each chosen stop is no farther from the previous
//!   position than any stop chosen after it.
//! - **Conservation:** after every simulation step each package is at the
//!   hub, aboard a truck, parked or delivered, exactly once.
//! - **Monotonic clocks:** no truck's clock ever moves backwards.
//! - **Capacity:** no truck ever carries more than its capacity.
//! - **Completion:** without a stop time, every package is delivered.
//! - **Pause agreement:** a day stopped at `T` shows the same deliveries
//!   before `T` as the day run to completion.

use std::collections::BTreeSet;

use courier_core::test_support::{SAMPLE_LOCATIONS, package, registry_with, sample_distances};
use courier_core::{
    ClockTime, DistanceIndex, Direction, DistanceLookup, LocationCode, PackageId,
    PackageRegistry, PackageStatus, PackageStore, TimeConstraint,
};
use courier_sim::{
    Constraints, NearestNeighbour, RoutingHeuristic, Simulation, SimulationConfig, Stop,
    TimedRequest,
};
use proptest::prelude::*;

const MAX_STEPS: usize = 10_000;

fn stops_strategy() -> impl Strategy<Value = Vec<Stop>> {
    proptest::collection::vec(0..SAMPLE_LOCATIONS, 0..24).prop_map(|locations| {
        locations
            .into_iter()
            .zip(1_u32..)
            .map(|(location, id)| Stop::new(PackageId(id), LocationCode(location)))
            .collect()
    })
}

/// Package locations paired with an optional release delay in minutes.
fn day_strategy() -> impl Strategy<Value = Vec<(usize, Option<u32>)>> {
    proptest::collection::vec(
        (1..SAMPLE_LOCATIONS, proptest::option::of(0_u32..180)),
        1..=20,
    )
}

fn constraints_for(day: &[(usize, Option<u32>)], start: ClockTime) -> Constraints {
    let timed = day
        .iter()
        .zip(1_u32..)
        .filter_map(|((_, delay), id)| {
            delay.map(|minutes| {
                TimedRequest::new(TimeConstraint::new(
                    start.advance(minutes * 60),
                    Direction::After,
                    PackageId(id),
                ))
            })
        })
        .collect();
    Constraints {
        timed,
        ..Constraints::default()
    }
}

#[expect(clippy::expect_used, reason = "fixtures fail loudly on misuse")]
fn simulated_day(
    day: &[(usize, Option<u32>)],
    stop_at: Option<ClockTime>,
) -> Simulation<PackageRegistry, DistanceIndex> {
    let config = SimulationConfig {
        stop_at,
        ..SimulationConfig::default()
    };
    let constraints = constraints_for(day, config.day_start);
    let packages = day
        .iter()
        .zip(1_u32..)
        .map(|((location, _), id)| package(id, *location))
        .collect();
    Simulation::new(
        registry_with(packages),
        sample_distances(),
        config,
        constraints,
    )
    .expect("valid simulation")
}

/// Deliveries made strictly before `stop`, keyed by package.
fn delivered_before(
    simulation: &Simulation<PackageRegistry, DistanceIndex>,
    stop: ClockTime,
) -> Vec<(PackageId, PackageStatus)> {
    simulation
        .store()
        .snapshot()
        .into_iter()
        .filter(|record| matches!(record.status, PackageStatus::Delivered { at, .. } if at < stop))
        .map(|record| (record.id, record.status))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ordering_is_a_permutation(start in 0..SAMPLE_LOCATIONS, stops in stops_strategy()) {
        let order = NearestNeighbour
            .order(LocationCode(start), &stops, &sample_distances())
            .expect("sample locations are known");
        prop_assert_eq!(order.len(), stops.len());
        let expected: BTreeSet<PackageId> = stops.iter().map(|stop| stop.package).collect();
        let actual: BTreeSet<PackageId> = order.iter().map(|stop| stop.package).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn each_pick_is_the_nearest_remaining(
        start in 0..SAMPLE_LOCATIONS,
        stops in stops_strategy(),
    ) {
        let distances = sample_distances();
        let order = NearestNeighbour
            .order(LocationCode(start), &stops, &distances)
            .expect("sample locations are known");
        let mut position = LocationCode(start);
        for (index, chosen) in order.iter().enumerate() {
            let picked = distances.distance(position, chosen.location).expect("known");
            for later in order.iter().skip(index + 1) {
                let other = distances.distance(position, later.location).expect("known");
                prop_assert!(picked <= other);
            }
            position = chosen.location;
        }
    }

    #[test]
    fn ordering_is_deterministic(stops in stops_strategy()) {
        let distances = sample_distances();
        let first = NearestNeighbour.order(LocationCode::DEPOT, &stops, &distances);
        let second = NearestNeighbour.order(LocationCode::DEPOT, &stops, &distances);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn paused_days_agree_with_the_full_day(day in day_strategy(), minutes in 0_u32..240) {
        let stop = SimulationConfig::default().day_start.advance(minutes * 60);
        let mut full = simulated_day(&day, None);
        full.run().expect("full day succeeds");
        let mut paused = simulated_day(&day, Some(stop));
        paused.run().expect("paused day succeeds");

        prop_assert_eq!(delivered_before(&paused, stop), delivered_before(&full, stop));
        prop_assert!(paused.census().is_conserved());
    }

    #[test]
    fn simulated_days_conserve_packages_and_time(day in day_strategy()) {
        let mut simulation = simulated_day(&day, None);

        let mut clocks: Vec<ClockTime> = simulation.trucks().iter().map(|truck| truck.clock()).collect();
        let mut steps = 0;
        while !simulation.is_finished() {
            prop_assert!(steps < MAX_STEPS, "simulation did not settle");
            simulation.step().expect("step succeeds");
            steps += 1;

            let census = simulation.census();
            prop_assert!(census.is_conserved(), "census {:?}", census);
            for (truck, previous) in simulation.trucks().iter().zip(clocks.iter_mut()) {
                prop_assert!(truck.clock() >= *previous);
                prop_assert!(truck.pending() <= truck.capacity());
                *previous = truck.clock();
            }
        }
        let census = simulation.census();
        prop_assert_eq!(census.delivered, day.len());
        prop_assert!(simulation.parked().is_empty());
    }
}
