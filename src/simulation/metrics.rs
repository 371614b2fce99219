//! Live performance readout for a run

use serde::{Deserialize, Serialize};

use super::physics;
use super::types::{EcoScore, Terrain, Weather, FULL_CHARGE_RANGE_KM};

/// Snapshot of the vehicle and trip state
///
/// The engine owns the only mutable copy; everything else gets a clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// km/h
    pub speed: f64,
    /// Percent, 0..=100
    pub battery: f64,
    /// km travelled so far
    pub distance: f64,
    /// °C
    pub motor_temp: f64,
    /// km
    pub estimated_range: f64,
    /// Percent
    pub battery_used: f64,
    /// Minutes
    pub time_remaining: f64,
    pub checkpoints_passed: usize,
    pub total_checkpoints: usize,
    /// kg CO2
    pub carbon_saved: f64,
    pub eco_score: EcoScore,
    pub obstacles_encountered: u32,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            speed: 0.0,
            battery: 100.0,
            distance: 0.0,
            motor_temp: physics::BASE_MOTOR_TEMP,
            estimated_range: FULL_CHARGE_RANGE_KM,
            battery_used: 0.0,
            time_remaining: 0.0,
            checkpoints_passed: 0,
            total_checkpoints: 0,
            carbon_saved: 0.0,
            eco_score: EcoScore::A,
            obstacles_encountered: 0,
        }
    }
}

impl PerformanceMetrics {
    /// Fresh metrics for a route with `total_checkpoints` waypoints
    pub fn for_route(total_checkpoints: usize) -> Self {
        Self {
            total_checkpoints,
            ..Self::default()
        }
    }

    /// Advance the physical state by one tick.
    ///
    /// Speed is left alone; the speed controller owns it. Everything that
    /// depends on speed uses the speed held at the start of the tick.
    pub fn advance_tick(&mut self, terrain: Terrain, weather: Weather, route_distance: f64) {
        let speed = self.speed;

        self.battery = (self.battery - physics::battery_drain_per_tick(speed, terrain, weather))
            .clamp(0.0, 100.0);
        self.distance += physics::distance_per_tick(speed);
        self.motor_temp = physics::motor_temp(speed, terrain, weather);
        self.carbon_saved = physics::carbon_saved(self.distance);
        self.eco_score = physics::eco_score(speed, self.motor_temp);
        self.time_remaining = physics::time_remaining(route_distance, self.distance, speed);
        self.estimated_range = physics::estimated_range(self.battery);
        self.battery_used = 100.0 - self.battery;
    }

    pub fn is_battery_depleted(&self) -> bool {
        self.battery <= 0.0
    }

    /// One-line readout for console output
    pub fn summary(&self) -> String {
        format!(
            "Speed: {:.1} km/h | Battery: {:.1}% | Distance: {:.2} km | Temp: {:.1}°C | Eco: {} | Checkpoints: {}/{} | Obstacles: {}",
            self.speed,
            self.battery,
            self.distance,
            self.motor_temp,
            self.eco_score,
            self.checkpoints_passed,
            self.total_checkpoints,
            self.obstacles_encountered
        )
    }
}
