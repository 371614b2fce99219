//! Vehicle physics and efficiency model
//!
//! Pure functions of the current state and the environment. Nothing here
//! touches the engine, so each can be tested on its own.

use super::types::{EcoScore, Terrain, Traffic, Weather, FULL_CHARGE_RANGE_KM};

/// Battery percentage drained per tick at zero speed on flat ground
pub const BASE_DRAIN_PER_TICK: f64 = 0.05;

/// Motor temperature at rest in °C
pub const BASE_MOTOR_TEMP: f64 = 25.0;

/// Motor temperature ceiling in °C
pub const MAX_MOTOR_TEMP: f64 = 80.0;

/// CO2 an average fossil-fuel car emits per km, in kg
pub const CAR_CO2_KG_PER_KM: f64 = 0.12;

/// Cruising speed the auto-pilot aims for in ideal conditions (km/h)
pub const BASE_OPTIMAL_SPEED: f64 = 25.0;

/// Battery percentage drained by one tick at `speed` km/h.
///
/// Never negative for non-negative speeds; the caller clamps the battery.
pub fn battery_drain_per_tick(speed: f64, terrain: Terrain, weather: Weather) -> f64 {
    let mut rate = BASE_DRAIN_PER_TICK;

    match terrain {
        Terrain::Uphill => rate *= 2.0,
        Terrain::Bumpy => rate *= 1.5,
        Terrain::Flat => {}
    }

    rate *= speed.max(0.0) / 15.0 + 0.5;

    if weather == Weather::Rainy {
        rate *= 1.2;
    }

    rate
}

/// Motor temperature in °C, capped at [`MAX_MOTOR_TEMP`]
pub fn motor_temp(speed: f64, terrain: Terrain, weather: Weather) -> f64 {
    let mut increase = speed * 0.2;

    increase += match terrain {
        Terrain::Uphill => 5.0,
        Terrain::Bumpy => 3.0,
        Terrain::Flat => 0.0,
    };

    increase += match weather {
        Weather::Sunny => 2.0,
        Weather::Rainy => -1.0,
        Weather::Night => 0.0,
    };

    (BASE_MOTOR_TEMP + increase).min(MAX_MOTOR_TEMP)
}

/// kg of CO2 saved against driving the same distance by car
pub fn carbon_saved(distance_km: f64) -> f64 {
    distance_km * CAR_CO2_KG_PER_KM
}

/// Raw 0..=100 efficiency score before grading
pub fn eco_points(speed: f64, motor_temp: f64) -> f64 {
    let mut score = 100.0;
    if speed > 30.0 {
        score -= (speed - 30.0) * 2.0;
    }
    if motor_temp > 50.0 {
        score -= (motor_temp - 50.0) * 1.5;
    }
    score
}

/// Letter grade for the given speed and motor temperature
pub fn eco_score(speed: f64, motor_temp: f64) -> EcoScore {
    let score = eco_points(speed, motor_temp);
    if score >= 90.0 {
        EcoScore::A
    } else if score >= 80.0 {
        EcoScore::B
    } else if score >= 70.0 {
        EcoScore::C
    } else if score >= 60.0 {
        EcoScore::D
    } else {
        EcoScore::F
    }
}

/// km left on the given battery percentage
pub fn estimated_range(battery: f64) -> f64 {
    (battery / 100.0) * FULL_CHARGE_RANGE_KM
}

/// Minutes to the destination at the current speed; 0 when stationary
pub fn time_remaining(route_distance: f64, distance_so_far: f64, speed: f64) -> f64 {
    if speed <= 0.0 {
        return 0.0;
    }
    ((route_distance - distance_so_far) / speed * 60.0).max(0.0)
}

/// Speed the auto-pilot converges to under the given conditions
pub fn optimal_speed(terrain: Terrain, traffic: Traffic, weather: Weather) -> f64 {
    let mut speed = BASE_OPTIMAL_SPEED;

    speed -= match terrain {
        Terrain::Uphill => 5.0,
        Terrain::Bumpy => 3.0,
        Terrain::Flat => 0.0,
    };

    speed -= match traffic {
        Traffic::Medium => 5.0,
        Traffic::High => 10.0,
        Traffic::Low => 0.0,
    };

    speed -= match weather {
        Weather::Rainy => 5.0,
        Weather::Night => 3.0,
        Weather::Sunny => 0.0,
    };

    speed
}

/// km covered in one second at `speed` km/h
pub fn distance_per_tick(speed: f64) -> f64 {
    speed.max(0.0) / 3600.0
}
