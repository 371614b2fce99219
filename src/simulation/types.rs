//! Core types for the trip simulation
//!
//! Settings enums, coordinates, and the route a run follows.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::error::SimError;

/// Kind of vehicle being driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleType {
    #[default]
    Scooter,
    #[value(name = "ebike")]
    #[serde(rename = "ebike")]
    EBike,
    DeliveryRobot,
}

/// Terrain along the route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Terrain {
    #[default]
    Flat,
    Uphill,
    Bumpy,
}

/// Weather during the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Weather {
    #[default]
    Sunny,
    Rainy,
    Night,
}

/// Traffic density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Traffic {
    #[default]
    Low,
    Medium,
    High,
}

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Interpolate each axis independently; `t` is not clamped
    pub fn lerp(&self, other: &Coordinate, t: f64) -> Coordinate {
        Coordinate {
            lat: self.lat + (other.lat - self.lat) * t,
            lng: self.lng + (other.lng - self.lng) * t,
        }
    }

    /// True when both axes are strictly within `tolerance` degrees of `other`
    pub fn within_box(&self, other: &Coordinate, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() < tolerance && (self.lng - other.lng).abs() < tolerance
    }

    fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// A named waypoint along a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: u32,
    pub coords: Coordinate,
    pub name: String,
    pub reached: bool,
}

impl Checkpoint {
    pub fn new(id: u32, name: impl Into<String>, coords: Coordinate) -> Self {
        Self {
            id,
            coords,
            name: name.into(),
            reached: false,
        }
    }
}

/// A route from a named start to a named end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub start_location: String,
    pub start_coords: Coordinate,
    pub end_location: String,
    pub end_coords: Coordinate,
    pub checkpoints: Vec<Checkpoint>,
    /// Total length in km
    pub distance_km: f64,
    /// Estimated duration in minutes
    pub estimated_minutes: f64,
}

impl RouteInfo {
    /// Reject routes the engine cannot drive: non-positive distance or
    /// non-finite coordinates.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.distance_km.is_finite() && self.distance_km > 0.0) {
            return Err(SimError::MalformedRoute(format!(
                "distance must be positive, got {}",
                self.distance_km
            )));
        }
        if !self.start_coords.is_finite() || !self.end_coords.is_finite() {
            return Err(SimError::MalformedRoute(
                "start and end coordinates must be finite".to_string(),
            ));
        }
        if let Some(cp) = self.checkpoints.iter().find(|cp| !cp.coords.is_finite()) {
            return Err(SimError::MalformedRoute(format!(
                "checkpoint {} has non-finite coordinates",
                cp.name
            )));
        }
        Ok(())
    }

    pub fn checkpoints_reached(&self) -> usize {
        self.checkpoints.iter().filter(|cp| cp.reached).count()
    }
}

/// Everything chosen on the setup screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub vehicle_type: VehicleType,
    pub terrain: Terrain,
    pub weather: Weather,
    pub traffic: Traffic,
    pub driver_name: String,
    pub route: Option<RouteInfo>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            vehicle_type: VehicleType::default(),
            terrain: Terrain::default(),
            weather: Weather::default(),
            traffic: Traffic::default(),
            driver_name: "User".to_string(),
            route: None,
        }
    }
}

/// Letter grade for energy efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum EcoScore {
    #[default]
    A,
    B,
    C,
    D,
    F,
}

impl EcoScore {
    pub fn as_str(&self) -> &'static str {
        match self {
            EcoScore::A => "A",
            EcoScore::B => "B",
            EcoScore::C => "C",
            EcoScore::D => "D",
            EcoScore::F => "F",
        }
    }
}

impl std::fmt::Display for EcoScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-width in degrees of the box around a checkpoint that counts as reaching it
pub const CHECKPOINT_TOLERANCE_DEG: f64 = 0.001;

/// Range on a full battery in km
pub const FULL_CHARGE_RANGE_KM: f64 = 30.0;
