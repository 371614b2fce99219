//! Random obstacles along the route

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Chance of an obstacle on each check
pub const OBSTACLE_PROBABILITY: f64 = 0.10;

/// Target speed lost when an obstacle appears (km/h)
pub const OBSTACLE_SLOWDOWN: f64 = 5.0;

/// Something the vehicle has to slow down for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObstacleKind {
    Pedestrian,
    Pothole,
    Car,
    TrafficLight,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Pedestrian,
        ObstacleKind::Pothole,
        ObstacleKind::Car,
        ObstacleKind::TrafficLight,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ObstacleKind::Pedestrian => "Pedestrian",
            ObstacleKind::Pothole => "Pothole",
            ObstacleKind::Car => "Car",
            ObstacleKind::TrafficLight => "Traffic light",
        }
    }
}

/// Draws obstacles with a fixed probability per check
#[derive(Debug, Clone)]
pub struct ObstacleGenerator {
    probability: f64,
    /// Seeded RNG for reproducible runs; thread RNG otherwise
    rng: Option<StdRng>,
}

impl Default for ObstacleGenerator {
    fn default() -> Self {
        Self::new(OBSTACLE_PROBABILITY, None)
    }
}

impl ObstacleGenerator {
    pub fn new(probability: f64, seed: Option<u64>) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: seed.map(StdRng::seed_from_u64),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    fn sample(&mut self) -> f64 {
        match &mut self.rng {
            Some(rng) => rng.random::<f64>(),
            None => rand::rng().random::<f64>(),
        }
    }

    fn choose_kind(&mut self) -> Option<ObstacleKind> {
        match &mut self.rng {
            Some(rng) => ObstacleKind::ALL.choose(rng).copied(),
            None => ObstacleKind::ALL.choose(&mut rand::rng()).copied(),
        }
    }

    /// One check: `Some(kind)` when an obstacle appears
    pub fn check(&mut self) -> Option<ObstacleKind> {
        if self.sample() < self.probability {
            self.choose_kind()
        } else {
            None
        }
    }
}

/// Target speed after slowing for an obstacle, floored at zero
pub fn slowed_target(target_speed: f64) -> f64 {
    (target_speed - OBSTACLE_SLOWDOWN).max(0.0)
}
