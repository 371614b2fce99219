//! Standalone trip simulation module
//!
//! Everything needed to drive a simulated trip from setup to summary:
//! the physics model, obstacle and speed control, the state machine that
//! ties them together on a simulated clock, and the gamification layer that
//! consumes finished trips. Rendering lives elsewhere and only reads
//! snapshots, events, and telemetry.

mod engine;
mod error;
mod events;
mod game_state;
mod metrics;
mod obstacle;
pub mod physics;
mod position;
mod routes;
mod scheduler;
mod speed;
mod summary;
mod types;

pub use engine::{
    EngineConfig, SimState, Simulation, Snapshot, OBSTACLE_INTERVAL_MS, TICK_INTERVAL_MS,
};
pub use error::SimError;
pub use events::{SimEvent, StopReason, TelemetryFrame};
pub use game_state::{
    default_challenges, demo_roster, leaderboard, Award, Challenge, ChallengeKind, GameState,
    LeaderboardEntry, UserProfile,
};
pub use metrics::PerformanceMetrics;
pub use obstacle::{ObstacleGenerator, ObstacleKind, OBSTACLE_PROBABILITY, OBSTACLE_SLOWDOWN};
pub use position::{interpolate, mark_reached, progress};
pub use routes::{find_route, preset_routes, route_name};
pub use scheduler::{Scheduler, TaskId, TaskKind};
pub use speed::{step_toward, SpeedMode, AUTO_PILOT_INTERVAL_MS, MANUAL_INTERVAL_MS};
pub use summary::{
    earned_badges, points_earned, TripSummary, TripSummaryBuilder, BADGE_ECO_CHAMPION,
    BADGE_SAFE_DRIVER, BADGE_SPEED_DEMON,
};
pub use types::{
    Checkpoint, Coordinate, EcoScore, RouteInfo, SimulationSettings, Terrain, Traffic,
    VehicleType, Weather, CHECKPOINT_TOLERANCE_DEG, FULL_CHARGE_RANGE_KM,
};
