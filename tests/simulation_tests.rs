//! State machine and full-run validation
//!
//! Runs are driven on the simulated clock, so a ten-minute trip takes
//! milliseconds of real time.

use chrono::{TimeZone, Utc};
use ev_trip_sim::simulation::{
    find_route, Checkpoint, Coordinate, EcoScore, EngineConfig, RouteInfo, SimError, SimEvent,
    SimState, Simulation, SimulationSettings, SpeedMode, StopReason, Terrain, Traffic, Weather,
    BADGE_ECO_CHAMPION, BADGE_SAFE_DRIVER, BADGE_SPEED_DEMON,
};

const MINUTE_MS: u64 = 60_000;

/// Engine with obstacles switched off
fn quiet_sim() -> Simulation {
    Simulation::with_config(EngineConfig {
        obstacle_probability: 0.0,
        seed: Some(1),
        epoch: Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()),
    })
}

fn obstacle_sim() -> Simulation {
    Simulation::with_config(EngineConfig {
        obstacle_probability: 1.0,
        seed: Some(1),
        epoch: None,
    })
}

/// 1 km straight north with one checkpoint on the way and one off to the side
fn straight_route() -> RouteInfo {
    RouteInfo {
        start_location: "South Gate".to_string(),
        start_coords: Coordinate::new(0.0, 0.0),
        end_location: "North Gate".to_string(),
        end_coords: Coordinate::new(0.01, 0.0),
        checkpoints: vec![
            Checkpoint::new(1, "Fountain", Coordinate::new(0.005, 0.0)),
            Checkpoint::new(2, "Library", Coordinate::new(0.0095, 0.0)),
            Checkpoint::new(3, "Stadium", Coordinate::new(0.005, 0.5)),
        ],
        distance_km: 1.0,
        estimated_minutes: 3.0,
    }
}

fn settings(route: RouteInfo) -> SimulationSettings {
    SimulationSettings {
        driver_name: "Tester".to_string(),
        route: Some(route),
        ..SimulationSettings::default()
    }
}

fn started(mut sim: Simulation, route: RouteInfo, target_speed: f64) -> Simulation {
    sim.configure(settings(route)).expect("configure");
    sim.set_target_speed(target_speed);
    sim.start().expect("start");
    sim
}

#[test]
fn test_start_without_configure_is_rejected() {
    let mut sim = quiet_sim();
    assert_eq!(sim.start(), Err(SimError::NotConfigured));
    assert_eq!(sim.state(), SimState::Uninitialized);
    assert_eq!(sim.active_timers(), 0);
    assert!(sim.take_events().contains(&SimEvent::StartRejected));
}

#[test]
fn test_configure_rejects_malformed_routes() {
    let mut sim = quiet_sim();

    let no_route = SimulationSettings::default();
    assert!(matches!(
        sim.configure(no_route),
        Err(SimError::MalformedRoute(_))
    ));

    let mut zero = straight_route();
    zero.distance_km = 0.0;
    assert!(matches!(
        sim.configure(settings(zero)),
        Err(SimError::MalformedRoute(_))
    ));

    let mut nan = straight_route();
    nan.end_coords = Coordinate::new(f64::NAN, 0.0);
    assert!(matches!(
        sim.configure(settings(nan)),
        Err(SimError::MalformedRoute(_))
    ));

    assert_eq!(sim.state(), SimState::Uninitialized);
}

#[test]
fn test_configure_seeds_metrics_and_position() {
    let mut sim = quiet_sim();
    let route = straight_route();
    sim.configure(settings(route.clone())).expect("configure");

    assert_eq!(sim.state(), SimState::Configured);
    assert_eq!(sim.metrics().total_checkpoints, 3);
    assert_eq!(sim.metrics().battery, 100.0);
    assert_eq!(sim.current_position(), Some(route.start_coords));
    assert!(matches!(
        sim.take_events().as_slice(),
        [SimEvent::Configured { .. }]
    ));
}

#[test]
fn test_lifecycle_transitions() {
    let mut sim = started(quiet_sim(), straight_route(), 20.0);
    assert_eq!(sim.state(), SimState::Running);
    assert_eq!(sim.active_timers(), 3);

    // Starting again while running changes nothing
    assert_eq!(sim.start(), Ok(()));
    assert_eq!(sim.active_timers(), 3);

    assert!(matches!(
        sim.resume(),
        Err(SimError::InvalidTransition { action: "resume", state: SimState::Running })
    ));

    sim.pause().expect("pause");
    assert_eq!(sim.state(), SimState::Paused);
    // Timers stay registered while paused
    assert_eq!(sim.active_timers(), 3);
    assert!(sim.pause().is_err());

    sim.resume().expect("resume");
    sim.emergency_stop().expect("emergency stop");
    assert_eq!(sim.state(), SimState::Stopped);
    assert_eq!(sim.stop_reason(), Some(StopReason::Emergency));
    assert!(sim.stop().is_err());
    assert!(sim.start().is_err());
}

#[test]
fn test_stop_from_configured_is_invalid() {
    let mut sim = quiet_sim();
    sim.configure(settings(straight_route())).expect("configure");
    assert!(matches!(
        sim.stop(),
        Err(SimError::InvalidTransition { state: SimState::Configured, .. })
    ));
    assert_eq!(sim.state(), SimState::Configured);
}

#[test]
fn test_pause_freezes_progress() {
    let mut sim = started(quiet_sim(), straight_route(), 20.0);
    sim.advance(30_000);
    assert!(sim.metrics().distance > 0.0);

    sim.pause().expect("pause");
    let frozen = sim.snapshot();
    sim.advance(5 * MINUTE_MS);
    assert_eq!(sim.metrics().distance, frozen.metrics.distance);
    assert_eq!(sim.metrics().battery, frozen.metrics.battery);
    assert_eq!(sim.metrics().speed, frozen.metrics.speed);
    assert_eq!(sim.current_position(), frozen.position);

    sim.resume().expect("resume");
    assert_eq!(sim.metrics().distance, frozen.metrics.distance);
    assert_eq!(sim.metrics().battery, frozen.metrics.battery);

    sim.advance(5_000);
    assert!(sim.metrics().distance > frozen.metrics.distance);
}

#[test]
fn test_no_obstacles_while_paused() {
    let mut sim = started(obstacle_sim(), straight_route(), 20.0);
    sim.pause().expect("pause");
    sim.advance(2 * MINUTE_MS);
    assert_eq!(sim.metrics().obstacles_encountered, 0);
    assert_eq!(sim.target_speed(), 20.0);
}

#[test]
fn test_obstacle_slows_target_speed() {
    let mut sim = started(obstacle_sim(), straight_route(), 20.0);
    sim.take_events();

    sim.advance(10_000);
    assert_eq!(sim.metrics().obstacles_encountered, 1);
    assert_eq!(sim.target_speed(), 15.0);
    assert!(sim
        .take_events()
        .iter()
        .any(|e| matches!(e, SimEvent::ObstacleDetected { .. })));

    // Target speed floors at zero
    sim.advance(40_000);
    assert_eq!(sim.metrics().obstacles_encountered, 5);
    assert_eq!(sim.target_speed(), 0.0);
}

#[test]
fn test_stop_cancels_everything() {
    let mut sim = started(quiet_sim(), straight_route(), 20.0);
    sim.advance(20_000);
    sim.stop().expect("stop");

    assert_eq!(sim.active_timers(), 0);
    let after_stop = sim.metrics().clone();
    sim.advance(10 * MINUTE_MS);
    assert_eq!(sim.metrics(), &after_stop);
    assert!(sim.trip_history().is_empty());
    assert!(sim.current_trip().is_none());
    assert_eq!(sim.outcome(), Some(Err(SimError::ManualAbort)));
}

#[test]
fn test_reconfigure_cancels_stale_timers() {
    let mut sim = started(quiet_sim(), straight_route(), 20.0);
    sim.advance(15_000);

    sim.configure(settings(straight_route())).expect("configure");
    assert_eq!(sim.state(), SimState::Configured);
    assert_eq!(sim.active_timers(), 0);
    assert_eq!(sim.metrics().distance, 0.0);

    sim.advance(MINUTE_MS);
    assert_eq!(sim.metrics().distance, 0.0);

    sim.start().expect("start");
    assert_eq!(sim.active_timers(), 3);
}

#[test]
fn test_reset_restores_defaults_without_leaving_state() {
    let mut sim = quiet_sim();
    assert_eq!(sim.reset(), Err(SimError::NotConfigured));

    let route = straight_route();
    let mut sim = started(sim, route.clone(), 20.0);
    sim.advance(45_000);
    sim.pause().expect("pause");

    sim.reset().expect("reset");
    assert_eq!(sim.state(), SimState::Paused);
    assert_eq!(sim.metrics().distance, 0.0);
    assert_eq!(sim.metrics().battery, 100.0);
    assert_eq!(sim.metrics().total_checkpoints, 3);
    assert_eq!(sim.target_speed(), 0.0);
    assert_eq!(sim.current_position(), Some(route.start_coords));
    assert_eq!(sim.active_timers(), 3);
}

#[test]
fn test_checkpoints_reached_once_and_in_bounds() {
    let mut sim = started(quiet_sim(), straight_route(), 36.0);
    assert_eq!(sim.run_until_finished(30 * MINUTE_MS), SimState::Completed);

    let route = sim.route().expect("route");
    assert!(route.checkpoints[0].reached);
    assert!(route.checkpoints[1].reached);
    assert!(!route.checkpoints[2].reached);
    assert_eq!(sim.metrics().checkpoints_passed, 2);

    let reached: Vec<u32> = sim
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            SimEvent::CheckpointReached { id, .. } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(reached, vec![1, 2]);

    let frames = sim.take_telemetry();
    assert!(!frames.is_empty());
    for pair in frames.windows(2) {
        assert!(pair[1].metrics.checkpoints_passed >= pair[0].metrics.checkpoints_passed);
        assert!(pair[1].metrics.distance >= pair[0].metrics.distance);
        assert!(pair[1].metrics.battery <= pair[0].metrics.battery);
    }
    for frame in &frames {
        assert!(frame.metrics.checkpoints_passed <= frame.metrics.total_checkpoints);
    }
}

#[test]
fn test_constant_speed_run_completes_in_expected_time() {
    let epoch = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let mut sim = started(quiet_sim(), straight_route(), 36.0);
    assert_eq!(sim.run_until_finished(30 * MINUTE_MS), SimState::Completed);

    let trip = sim.current_trip().expect("summary").clone();
    // 1 km at 36 km/h is 100 s plus a short ramp up from standstill
    assert!(trip.total_minutes > 100.0 / 60.0);
    assert!(trip.total_minutes < 130.0 / 60.0);
    assert_eq!(trip.start_time, epoch);
    assert!(trip.end_time > trip.start_time);
    assert!(trip.distance() >= 1.0);
    assert!(trip.average_speed > 25.0 && trip.average_speed < 36.0);
    assert_eq!(trip.max_speed, 36.0);
    assert!(trip.has_badge(BADGE_SAFE_DRIVER));
    assert_eq!(sim.trip_history().len(), 1);
    assert_eq!(sim.active_timers(), 0);
    assert!(matches!(sim.outcome(), Some(Ok(_))));
}

#[test]
fn test_demo_route_scenario() {
    let route = find_route("Central Park to Union Square").expect("preset route");
    let mut sim = quiet_sim();
    sim.configure(SimulationSettings {
        terrain: Terrain::Flat,
        weather: Weather::Sunny,
        traffic: Traffic::Low,
        driver_name: "Demo".to_string(),
        route: Some(route),
        ..SimulationSettings::default()
    })
    .expect("configure");
    sim.set_target_speed(25.0);
    sim.start().expect("start");

    assert_eq!(sim.run_until_finished(30 * MINUTE_MS), SimState::Completed);
    let trip = sim.current_trip().expect("summary");

    assert!(trip.total_minutes > 10.0 && trip.total_minutes < 10.5);
    assert!(matches!(trip.eco_score(), EcoScore::A | EcoScore::B));
    assert!(trip.has_badge(BADGE_SAFE_DRIVER));
    assert!(trip.has_badge(BADGE_ECO_CHAMPION));
    assert!(!trip.has_badge(BADGE_SPEED_DEMON));
    assert_eq!(trip.points_earned, 142);
    assert!(trip.metrics.battery > 0.0);
    assert!(trip.metrics.checkpoints_passed <= trip.metrics.total_checkpoints);
    assert_eq!(trip.driver_name, "Demo");
}

#[test]
fn test_fast_run_earns_speed_demon() {
    let mut sim = started(quiet_sim(), straight_route(), 40.0);
    assert_eq!(sim.run_until_finished(30 * MINUTE_MS), SimState::Completed);

    let trip = sim.current_trip().expect("summary");
    assert_eq!(trip.eco_score(), EcoScore::B);
    assert!(trip.has_badge(BADGE_SPEED_DEMON));
    assert!(trip.has_badge(BADGE_SAFE_DRIVER));
    assert!(!trip.has_badge(BADGE_ECO_CHAMPION));
    assert_eq!(trip.points_earned, 90);
}

#[test]
fn test_battery_depletion_stops_without_summary() {
    let mut route = straight_route();
    route.distance_km = 50.0;

    let mut sim = quiet_sim();
    sim.configure(SimulationSettings {
        terrain: Terrain::Uphill,
        weather: Weather::Rainy,
        route: Some(route),
        ..SimulationSettings::default()
    })
    .expect("configure");
    sim.set_target_speed(40.0);
    sim.start().expect("start");

    assert_eq!(sim.run_until_finished(120 * MINUTE_MS), SimState::Stopped);
    assert_eq!(sim.stop_reason(), Some(StopReason::BatteryDepleted));
    assert_eq!(sim.metrics().battery, 0.0);
    assert!(sim.metrics().distance < 50.0);
    assert!(sim.trip_history().is_empty());
    assert_eq!(sim.outcome(), Some(Err(SimError::BatteryDepleted)));
    assert_eq!(sim.active_timers(), 0);
    assert!(sim.take_events().contains(&SimEvent::Stopped {
        reason: StopReason::BatteryDepleted
    }));
}

#[test]
fn test_auto_pilot_converges_to_optimal_speed() {
    let mut route = straight_route();
    route.distance_km = 20.0;

    let mut sim = quiet_sim();
    sim.configure(SimulationSettings {
        terrain: Terrain::Uphill,
        weather: Weather::Rainy,
        traffic: Traffic::High,
        route: Some(route),
        ..SimulationSettings::default()
    })
    .expect("configure");
    sim.set_target_speed(30.0);
    sim.start().expect("start");
    sim.advance(20_000);
    assert_eq!(sim.metrics().speed, 30.0);

    assert_eq!(sim.toggle_auto_pilot(), SpeedMode::AutoPilot);
    assert!(sim.is_auto_pilot());
    // The manual controller is replaced, not joined
    assert_eq!(sim.active_timers(), 3);

    sim.advance(2 * MINUTE_MS);
    assert_eq!(sim.metrics().speed, 5.0);

    assert_eq!(sim.toggle_auto_pilot(), SpeedMode::Manual);
    assert_eq!(sim.active_timers(), 3);
    sim.advance(20_000);
    assert_eq!(sim.metrics().speed, 30.0);
}

#[test]
fn test_history_accumulates_across_runs() {
    let mut sim = started(quiet_sim(), straight_route(), 36.0);
    sim.run_until_finished(30 * MINUTE_MS);

    // Checkpoints start unreached again on a new setup
    sim.configure(settings(sim.route().cloned().expect("route")))
        .expect("configure");
    assert!(sim.current_trip().is_none());
    assert!(sim.route().expect("route").checkpoints.iter().all(|cp| !cp.reached));

    sim.set_target_speed(36.0);
    sim.start().expect("start");
    assert_eq!(sim.run_until_finished(30 * MINUTE_MS), SimState::Completed);
    assert_eq!(sim.trip_history().len(), 2);
    assert!(sim.trip_history()[1].start_time >= sim.trip_history()[0].end_time);
}
