//! Final record of a completed trip and how it is scored

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::PerformanceMetrics;
use super::types::{EcoScore, RouteInfo, VehicleType};

pub const BADGE_ECO_CHAMPION: &str = "Eco Champion";
pub const BADGE_SAFE_DRIVER: &str = "Safe Driver";
pub const BADGE_SPEED_DEMON: &str = "Speed Demon";

/// Finishing faster than this earns "Speed Demon" (km/h)
pub const SPEED_DEMON_THRESHOLD: f64 = 30.0;

/// Points per km driven
pub const POINTS_PER_KM: f64 = 10.0;
pub const ECO_BONUS_A: f64 = 50.0;
pub const ECO_BONUS_B: f64 = 30.0;
/// Bonus for a trip without obstacles
pub const SAFETY_BONUS: f64 = 50.0;

/// Immutable record of one completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    /// Metrics as they stood when the destination was reached
    pub metrics: PerformanceMetrics,
    pub driver_name: String,
    pub vehicle_type: VehicleType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Minutes between start and end
    pub total_minutes: f64,
    /// km/h
    pub average_speed: f64,
    /// Speed at arrival; peak speed is not tracked
    pub max_speed: f64,
    pub route: RouteInfo,
    pub badges: Vec<String>,
    pub points_earned: i64,
}

impl TripSummary {
    pub fn distance(&self) -> f64 {
        self.metrics.distance
    }

    pub fn eco_score(&self) -> EcoScore {
        self.metrics.eco_score
    }

    pub fn obstacles_encountered(&self) -> u32 {
        self.metrics.obstacles_encountered
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.iter().any(|b| b == badge)
    }
}

/// Badges earned by the final metrics of a run
pub fn earned_badges(metrics: &PerformanceMetrics) -> Vec<String> {
    let mut badges = Vec::new();
    if metrics.eco_score == EcoScore::A {
        badges.push(BADGE_ECO_CHAMPION.to_string());
    }
    if metrics.obstacles_encountered == 0 {
        badges.push(BADGE_SAFE_DRIVER.to_string());
    }
    if metrics.speed > SPEED_DEMON_THRESHOLD {
        badges.push(BADGE_SPEED_DEMON.to_string());
    }
    badges
}

/// round(distance * 10 + eco bonus + safety bonus)
pub fn points_earned(metrics: &PerformanceMetrics) -> i64 {
    let eco_bonus = match metrics.eco_score {
        EcoScore::A => ECO_BONUS_A,
        EcoScore::B => ECO_BONUS_B,
        _ => 0.0,
    };
    let safety_bonus = if metrics.obstacles_encountered == 0 {
        SAFETY_BONUS
    } else {
        0.0
    };
    (metrics.distance * POINTS_PER_KM + eco_bonus + safety_bonus).round() as i64
}

/// Freezes a finished run into a [`TripSummary`]
#[derive(Debug, Clone)]
pub struct TripSummaryBuilder {
    metrics: PerformanceMetrics,
    route: RouteInfo,
    driver_name: String,
    vehicle_type: VehicleType,
    start_time: DateTime<Utc>,
}

impl TripSummaryBuilder {
    pub fn new(metrics: PerformanceMetrics, route: RouteInfo, start_time: DateTime<Utc>) -> Self {
        Self {
            metrics,
            route,
            driver_name: String::new(),
            vehicle_type: VehicleType::default(),
            start_time,
        }
    }

    pub fn driver(mut self, driver_name: impl Into<String>, vehicle_type: VehicleType) -> Self {
        self.driver_name = driver_name.into();
        self.vehicle_type = vehicle_type;
        self
    }

    pub fn finish(self, end_time: DateTime<Utc>) -> TripSummary {
        let elapsed_ms = (end_time - self.start_time).num_milliseconds().max(0);
        let total_minutes = elapsed_ms as f64 / 60_000.0;
        let average_speed = if total_minutes > 0.0 {
            self.metrics.distance / (total_minutes / 60.0)
        } else {
            0.0
        };

        TripSummary {
            badges: earned_badges(&self.metrics),
            points_earned: points_earned(&self.metrics),
            max_speed: self.metrics.speed,
            average_speed,
            total_minutes,
            start_time: self.start_time,
            end_time,
            driver_name: self.driver_name,
            vehicle_type: self.vehicle_type,
            route: self.route,
            metrics: self.metrics,
        }
    }
}
