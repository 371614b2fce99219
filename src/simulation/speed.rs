//! Speed control: auto-pilot or manual target tracking

use serde::{Deserialize, Serialize};

use super::physics;
use super::types::SimulationSettings;

/// How often the auto-pilot adjusts speed (ms)
pub const AUTO_PILOT_INTERVAL_MS: u64 = 2_000;

/// How often manual control adjusts speed (ms)
pub const MANUAL_INTERVAL_MS: u64 = 500;

/// Speed change per controller step (km/h)
pub const SPEED_STEP: f64 = 1.0;

/// Which controller owns the speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedMode {
    #[default]
    Manual,
    AutoPilot,
}

impl SpeedMode {
    pub fn interval_ms(&self) -> u64 {
        match self {
            SpeedMode::Manual => MANUAL_INTERVAL_MS,
            SpeedMode::AutoPilot => AUTO_PILOT_INTERVAL_MS,
        }
    }

    pub fn toggled(&self) -> SpeedMode {
        match self {
            SpeedMode::Manual => SpeedMode::AutoPilot,
            SpeedMode::AutoPilot => SpeedMode::Manual,
        }
    }
}

/// Move `current` one step toward `target`, landing on it once within a step
pub fn step_toward(current: f64, target: f64) -> f64 {
    if (current - target).abs() > SPEED_STEP {
        if current < target {
            current + SPEED_STEP
        } else {
            current - SPEED_STEP
        }
    } else {
        target
    }
}

/// Speed the active controller is steering toward
pub fn controller_target(mode: SpeedMode, settings: &SimulationSettings, target_speed: f64) -> f64 {
    match mode {
        SpeedMode::AutoPilot => {
            physics::optimal_speed(settings.terrain, settings.traffic, settings.weather)
        }
        SpeedMode::Manual => target_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_never_overshoot() {
        assert_eq!(step_toward(0.0, 25.0), 1.0);
        assert_eq!(step_toward(24.5, 25.0), 25.0);
        assert_eq!(step_toward(25.6, 25.0), 25.0);
        assert_eq!(step_toward(30.0, 25.0), 29.0);
    }

    #[test]
    fn toggle_swaps_intervals() {
        assert_eq!(SpeedMode::Manual.toggled(), SpeedMode::AutoPilot);
        assert_eq!(SpeedMode::AutoPilot.toggled().interval_ms(), MANUAL_INTERVAL_MS);
    }
}
