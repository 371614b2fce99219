//! Outbound notifications and telemetry
//!
//! The engine queues these; rendering surfaces and toasts drain them.

use serde::{Deserialize, Serialize};

use super::metrics::PerformanceMetrics;
use super::obstacle::ObstacleKind;
use super::speed::SpeedMode;
use super::types::Coordinate;

/// Why a run ended without reaching its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    BatteryDepleted,
    Manual,
    Emergency,
}

/// A user-facing notification. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Configured { route: String },
    StartRejected,
    Started,
    Paused,
    Resumed,
    Reset,
    Stopped { reason: StopReason },
    CheckpointReached { id: u32, name: String },
    ObstacleDetected { kind: ObstacleKind },
    SpeedModeChanged { mode: SpeedMode },
    DestinationReached { points_earned: i64 },
}

impl SimEvent {
    /// Title and body as shown to the driver
    pub fn message(&self) -> (&'static str, String) {
        match self {
            SimEvent::Configured { route } => (
                "Simulation Setup Complete",
                format!("You're ready to start your journey on {}!", route),
            ),
            SimEvent::StartRejected => (
                "Simulation Not Setup",
                "Please complete the simulation setup first.".to_string(),
            ),
            SimEvent::Started => ("Simulation Started", "Your journey has begun!".to_string()),
            SimEvent::Paused => (
                "Simulation Paused",
                "Your journey is paused. Resume when ready.".to_string(),
            ),
            SimEvent::Resumed => ("Simulation Resumed", "Your journey continues!".to_string()),
            SimEvent::Reset => (
                "Simulation Reset",
                "All metrics have been reset to initial values.".to_string(),
            ),
            SimEvent::Stopped { reason } => match reason {
                StopReason::BatteryDepleted => (
                    "Battery Depleted",
                    "Your vehicle has run out of battery. Simulation stopped.".to_string(),
                ),
                StopReason::Manual => (
                    "Simulation Stopped",
                    "Your journey has been stopped.".to_string(),
                ),
                StopReason::Emergency => (
                    "Emergency Stop Activated",
                    "Simulation has been stopped immediately.".to_string(),
                ),
            },
            SimEvent::CheckpointReached { name, .. } => {
                ("Checkpoint Reached", format!("You've reached {}", name))
            }
            SimEvent::ObstacleDetected { kind } => (
                "Obstacle Detected",
                format!("{} ahead! Slowing down.", kind.label()),
            ),
            SimEvent::SpeedModeChanged { mode } => match mode {
                SpeedMode::AutoPilot => (
                    "Auto-Pilot Activated",
                    "The vehicle will now drive automatically.".to_string(),
                ),
                SpeedMode::Manual => (
                    "Manual Control Activated",
                    "You now have manual control of your vehicle.".to_string(),
                ),
            },
            SimEvent::DestinationReached { points_earned } => (
                "Destination Reached",
                format!(
                    "Congratulations! You've completed your journey and earned {} points.",
                    points_earned
                ),
            ),
        }
    }
}

/// One tick's worth of data for the map and charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    /// Simulated ms since the engine was created
    pub at_ms: u64,
    pub metrics: PerformanceMetrics,
    pub position: Coordinate,
}
