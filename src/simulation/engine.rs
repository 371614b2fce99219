//! The simulation state machine
//!
//! A single [`Simulation`] owns the metrics, the route, and the timers of one
//! run. Every mutation goes through it. Timer callbacks re-check the state
//! when they fire, so a tick that was already queued when the run paused or
//! stopped does nothing.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::error::SimError;
use super::events::{SimEvent, StopReason, TelemetryFrame};
use super::metrics::PerformanceMetrics;
use super::obstacle::{self, ObstacleGenerator, OBSTACLE_PROBABILITY};
use super::position;
use super::routes;
use super::scheduler::{Scheduler, TaskId, TaskKind};
use super::speed::{self, SpeedMode};
use super::summary::{TripSummary, TripSummaryBuilder};
use super::types::{Coordinate, RouteInfo, SimulationSettings};

/// Physics update period (ms)
pub const TICK_INTERVAL_MS: u64 = 1_000;

/// Obstacle roll period (ms)
pub const OBSTACLE_INTERVAL_MS: u64 = 10_000;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimState {
    Uninitialized,
    Configured,
    Running,
    Paused,
    /// Destination reached; a summary was recorded
    Completed,
    /// Aborted or out of battery; no summary
    Stopped,
}

impl SimState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimState::Completed | SimState::Stopped)
    }
}

impl std::fmt::Display for SimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SimState::Uninitialized => "uninitialized",
            SimState::Configured => "configured",
            SimState::Running => "running",
            SimState::Paused => "paused",
            SimState::Completed => "completed",
            SimState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Engine tunables
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Chance of an obstacle per check
    pub obstacle_probability: f64,
    /// Seed for reproducible obstacle draws
    pub seed: Option<u64>,
    /// Real instant that simulated time zero maps to; now if unset
    pub epoch: Option<DateTime<Utc>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            obstacle_probability: OBSTACLE_PROBABILITY,
            seed: None,
            epoch: None,
        }
    }
}

/// Copy of what the readouts display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: SimState,
    pub metrics: PerformanceMetrics,
    pub position: Option<Coordinate>,
    pub speed_mode: SpeedMode,
    pub target_speed: f64,
}

/// Tasks registered while a run is live
#[derive(Debug, Clone, Copy)]
struct Timers {
    tick: TaskId,
    obstacle: TaskId,
    speed: TaskId,
}

pub struct Simulation {
    state: SimState,
    settings: SimulationSettings,
    metrics: PerformanceMetrics,
    position: Option<Coordinate>,
    target_speed: f64,
    speed_mode: SpeedMode,

    scheduler: Scheduler,
    timers: Option<Timers>,
    obstacles: ObstacleGenerator,

    epoch: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    stop_reason: Option<StopReason>,

    trip_history: Vec<TripSummary>,
    current_trip: Option<TripSummary>,

    events: Vec<SimEvent>,
    telemetry: Vec<TelemetryFrame>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine whose obstacle draws are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            state: SimState::Uninitialized,
            settings: SimulationSettings::default(),
            metrics: PerformanceMetrics::default(),
            position: None,
            target_speed: 0.0,
            speed_mode: SpeedMode::default(),
            scheduler: Scheduler::new(),
            timers: None,
            obstacles: ObstacleGenerator::new(config.obstacle_probability, config.seed),
            epoch: config.epoch.unwrap_or_else(Utc::now),
            started_at: None,
            stop_reason: None,
            trip_history: Vec::new(),
            current_trip: None,
            events: Vec::new(),
            telemetry: Vec::new(),
        }
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn route(&self) -> Option<&RouteInfo> {
        self.settings.route.as_ref()
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn current_position(&self) -> Option<Coordinate> {
        self.position
    }

    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    pub fn is_auto_pilot(&self) -> bool {
        self.speed_mode == SpeedMode::AutoPilot
    }

    pub fn trip_history(&self) -> &[TripSummary] {
        &self.trip_history
    }

    /// Summary of the most recent run, cleared by `configure()`
    pub fn current_trip(&self) -> Option<&TripSummary> {
        self.current_trip.as_ref()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Number of live timers; zero whenever the run is not active
    pub fn active_timers(&self) -> usize {
        self.scheduler.active_count()
    }

    /// Simulated ms since the engine was created
    pub fn elapsed_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Current simulated instant
    pub fn now(&self) -> DateTime<Utc> {
        self.epoch + chrono::Duration::milliseconds(self.scheduler.now_ms() as i64)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            metrics: self.metrics.clone(),
            position: self.position,
            speed_mode: self.speed_mode,
            target_speed: self.target_speed,
        }
    }

    /// How the last run ended, once it has
    pub fn outcome(&self) -> Option<Result<&TripSummary, SimError>> {
        match self.state {
            SimState::Completed => self.current_trip.as_ref().map(Ok),
            SimState::Stopped => Some(Err(match self.stop_reason {
                Some(StopReason::BatteryDepleted) => SimError::BatteryDepleted,
                _ => SimError::ManualAbort,
            })),
            _ => None,
        }
    }

    /// Drain queued notifications
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain per-tick telemetry
    pub fn take_telemetry(&mut self) -> Vec<TelemetryFrame> {
        std::mem::take(&mut self.telemetry)
    }

    fn emit(&mut self, event: SimEvent) {
        let (title, body) = event.message();
        info!("{}: {}", title, body);
        self.events.push(event);
    }

    fn invalid(&self, action: &'static str) -> SimError {
        warn!("Rejected {} while {}", action, self.state);
        SimError::InvalidTransition {
            action,
            state: self.state,
        }
    }

    /// Load settings for a new run. Any previous run's timers are cancelled.
    pub fn configure(&mut self, mut settings: SimulationSettings) -> Result<(), SimError> {
        let route = settings
            .route
            .as_mut()
            .ok_or_else(|| SimError::MalformedRoute("no route selected".to_string()))?;
        route.validate()?;
        for checkpoint in &mut route.checkpoints {
            checkpoint.reached = false;
        }

        let route_name = routes::route_name(route);
        let start = route.start_coords;
        let total_checkpoints = route.checkpoints.len();

        self.cancel_timers();
        self.settings = settings;
        self.metrics = PerformanceMetrics::for_route(total_checkpoints);
        self.position = Some(start);
        self.state = SimState::Configured;
        self.started_at = None;
        self.stop_reason = None;
        self.current_trip = None;

        self.emit(SimEvent::Configured { route: route_name });
        Ok(())
    }

    /// Begin driving. A no-op if already running.
    pub fn start(&mut self) -> Result<(), SimError> {
        match self.state {
            SimState::Running => Ok(()),
            SimState::Configured => {
                self.started_at = Some(self.now());
                self.state = SimState::Running;
                self.arm_timers();
                self.emit(SimEvent::Started);
                Ok(())
            }
            SimState::Uninitialized => {
                warn!("Start requested before setup");
                self.emit(SimEvent::StartRejected);
                Err(SimError::NotConfigured)
            }
            _ => Err(self.invalid("start")),
        }
    }

    pub fn pause(&mut self) -> Result<(), SimError> {
        if self.state != SimState::Running {
            return Err(self.invalid("pause"));
        }
        self.state = SimState::Paused;
        self.emit(SimEvent::Paused);
        Ok(())
    }

    /// Continue from the accumulated state; time spent paused is not made up.
    pub fn resume(&mut self) -> Result<(), SimError> {
        if self.state != SimState::Paused {
            return Err(self.invalid("resume"));
        }
        self.state = SimState::Running;
        self.emit(SimEvent::Resumed);
        Ok(())
    }

    /// Abort the run. No summary is recorded.
    pub fn stop(&mut self) -> Result<(), SimError> {
        self.abort(StopReason::Manual, "stop")
    }

    pub fn emergency_stop(&mut self) -> Result<(), SimError> {
        self.abort(StopReason::Emergency, "emergency stop")
    }

    fn abort(&mut self, reason: StopReason, action: &'static str) -> Result<(), SimError> {
        if !matches!(self.state, SimState::Running | SimState::Paused) {
            return Err(self.invalid(action));
        }
        self.halt(reason);
        Ok(())
    }

    /// Put the displayed metrics and position back to the start of the route.
    ///
    /// The run state and timers are left alone, so resetting a running
    /// simulation is overwritten by the next tick.
    pub fn reset(&mut self) -> Result<(), SimError> {
        let Some(route) = self.settings.route.as_ref() else {
            return Err(SimError::NotConfigured);
        };
        if self.state == SimState::Uninitialized {
            return Err(SimError::NotConfigured);
        }

        let start = route.start_coords;
        self.metrics = PerformanceMetrics::for_route(route.checkpoints.len());
        self.position = Some(start);
        self.target_speed = 0.0;
        self.emit(SimEvent::Reset);
        Ok(())
    }

    /// Speed the manual controller steers toward (km/h, at least 0)
    pub fn set_target_speed(&mut self, speed: f64) {
        self.target_speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
    }

    /// Switch between manual and auto-pilot control.
    ///
    /// The old controller's timer is cancelled and the new one registered in
    /// the same call, so the two never run together.
    pub fn toggle_auto_pilot(&mut self) -> SpeedMode {
        self.speed_mode = self.speed_mode.toggled();
        if let Some(timers) = self.timers.as_mut() {
            self.scheduler.cancel(timers.speed);
            timers.speed = self
                .scheduler
                .schedule_every(TaskKind::SpeedControl, self.speed_mode.interval_ms());
        }
        self.emit(SimEvent::SpeedModeChanged {
            mode: self.speed_mode,
        });
        self.speed_mode
    }

    /// Run the clock forward, firing every task that falls due
    pub fn advance(&mut self, duration_ms: u64) {
        let until = self.scheduler.now_ms() + duration_ms;
        while let Some((_, kind)) = self.scheduler.pop_due(until) {
            self.dispatch(kind);
        }
        self.scheduler.advance_to(until);
    }

    /// Advance a second at a time until the run ends or `limit_ms` passes.
    /// Returns the state reached.
    pub fn run_until_finished(&mut self, limit_ms: u64) -> SimState {
        let deadline = self.scheduler.now_ms() + limit_ms;
        while !self.state.is_terminal() && self.scheduler.now_ms() < deadline {
            let step = TICK_INTERVAL_MS.min(deadline - self.scheduler.now_ms());
            self.advance(step);
        }
        self.state
    }

    fn arm_timers(&mut self) {
        self.cancel_timers();
        let tick = self
            .scheduler
            .schedule_every(TaskKind::Tick, TICK_INTERVAL_MS);
        let obstacle = self
            .scheduler
            .schedule_every(TaskKind::ObstacleCheck, OBSTACLE_INTERVAL_MS);
        let speed = self
            .scheduler
            .schedule_every(TaskKind::SpeedControl, self.speed_mode.interval_ms());
        self.timers = Some(Timers {
            tick,
            obstacle,
            speed,
        });
    }

    fn cancel_timers(&mut self) {
        if let Some(timers) = self.timers.take() {
            debug!(
                "Cancelling timers {:?}, {:?}, {:?}",
                timers.tick, timers.obstacle, timers.speed
            );
        }
        self.scheduler.cancel_all();
    }

    fn dispatch(&mut self, kind: TaskKind) {
        if self.state != SimState::Running {
            return;
        }
        match kind {
            TaskKind::Tick => self.tick(),
            TaskKind::ObstacleCheck => self.check_obstacle(),
            TaskKind::SpeedControl => self.control_speed(),
        }
    }

    fn tick(&mut self) {
        let terrain = self.settings.terrain;
        let weather = self.settings.weather;
        let Some(route) = self.settings.route.as_mut() else {
            return;
        };
        let route_distance = route.distance_km;

        self.metrics.advance_tick(terrain, weather, route_distance);

        let position = position::interpolate(route, self.metrics.distance);
        let reached = position::mark_reached(&mut route.checkpoints, &position);
        self.position = Some(position);

        for checkpoint in reached {
            self.metrics.checkpoints_passed =
                (self.metrics.checkpoints_passed + 1).min(self.metrics.total_checkpoints);
            self.emit(SimEvent::CheckpointReached {
                id: checkpoint.id,
                name: checkpoint.name,
            });
        }

        debug!("{}", self.metrics.summary());
        self.telemetry.push(TelemetryFrame {
            at_ms: self.scheduler.now_ms(),
            metrics: self.metrics.clone(),
            position,
        });

        if self.metrics.is_battery_depleted() {
            warn!(
                "Battery depleted after {:.2} km of {:.2} km",
                self.metrics.distance, route_distance
            );
            self.halt(StopReason::BatteryDepleted);
        } else if self.metrics.distance >= route_distance {
            self.complete();
        }
    }

    fn check_obstacle(&mut self) {
        if let Some(kind) = self.obstacles.check() {
            self.target_speed = obstacle::slowed_target(self.target_speed);
            self.metrics.obstacles_encountered += 1;
            self.emit(SimEvent::ObstacleDetected { kind });
        }
    }

    fn control_speed(&mut self) {
        let target = speed::controller_target(self.speed_mode, &self.settings, self.target_speed);
        self.metrics.speed = speed::step_toward(self.metrics.speed, target);
    }

    fn halt(&mut self, reason: StopReason) {
        self.cancel_timers();
        self.state = SimState::Stopped;
        self.stop_reason = Some(reason);
        self.emit(SimEvent::Stopped { reason });
    }

    /// Freeze the run into a summary and record it
    fn complete(&mut self) {
        let (Some(started_at), Some(route)) = (self.started_at, self.settings.route.clone()) else {
            return;
        };

        let summary = TripSummaryBuilder::new(self.metrics.clone(), route, started_at)
            .driver(self.settings.driver_name.clone(), self.settings.vehicle_type)
            .finish(self.now());

        self.cancel_timers();
        info!(
            "Trip complete: {:.2} km in {:.1} min, {} points, badges {:?}",
            summary.distance(),
            summary.total_minutes,
            summary.points_earned,
            summary.badges
        );

        let points_earned = summary.points_earned;
        self.trip_history.push(summary.clone());
        self.current_trip = Some(summary);
        self.state = SimState::Completed;
        self.emit(SimEvent::DestinationReached { points_earned });
    }
}
