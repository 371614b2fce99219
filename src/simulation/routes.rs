//! Preset demo routes offered on the setup screen

use super::error::SimError;
use super::types::{Checkpoint, Coordinate, RouteInfo};

fn route(
    start: (&str, f64, f64),
    end: (&str, f64, f64),
    checkpoints: &[(&str, f64, f64)],
    distance_km: f64,
    estimated_minutes: f64,
) -> RouteInfo {
    RouteInfo {
        start_location: start.0.to_string(),
        start_coords: Coordinate::new(start.1, start.2),
        end_location: end.0.to_string(),
        end_coords: Coordinate::new(end.1, end.2),
        checkpoints: checkpoints
            .iter()
            .zip(1..)
            .map(|(&(name, lat, lng), id)| Checkpoint::new(id, name, Coordinate::new(lat, lng)))
            .collect(),
        distance_km,
        estimated_minutes,
    }
}

/// All preset routes
pub fn preset_routes() -> Vec<RouteInfo> {
    vec![
        route(
            ("Central Park", 40.785091, -73.968285),
            ("Union Square", 40.7359, -73.9911),
            &[
                ("Columbus Circle", 40.7731, -73.9712),
                ("Times Square", 40.7589, -73.9851),
                ("Herald Square", 40.7484, -73.9857),
            ],
            4.2,
            25.0,
        ),
        route(
            ("Brooklyn Bridge", 40.7061, -73.9969),
            ("Battery Park", 40.7033, -74.017),
            &[
                ("City Hall", 40.7077, -74.0021),
                ("World Trade Center", 40.7074, -74.0113),
            ],
            2.1,
            15.0,
        ),
        route(
            ("Grand Central", 40.7527, -73.9772),
            ("Empire State Building", 40.7484, -73.9857),
            &[("Bryant Park", 40.7513, -73.9814)],
            1.5,
            10.0,
        ),
    ]
}

/// Display name of a route, e.g. "Central Park to Union Square"
pub fn route_name(route: &RouteInfo) -> String {
    format!("{} to {}", route.start_location, route.end_location)
}

/// Look up a preset by name, ignoring case
pub fn find_route(name: &str) -> Result<RouteInfo, SimError> {
    let wanted = name.trim().to_lowercase();
    preset_routes()
        .into_iter()
        .find(|route| route_name(route).to_lowercase() == wanted)
        .ok_or_else(|| SimError::UnknownRoute(name.to_string()))
}
