//! Maps distance travelled onto the route and detects checkpoints

use super::types::{Checkpoint, Coordinate, RouteInfo, CHECKPOINT_TOLERANCE_DEG};

/// Fraction of the route covered, clamped to 0..=1
pub fn progress(distance: f64, route_distance: f64) -> f64 {
    if route_distance <= 0.0 {
        return 1.0;
    }
    (distance / route_distance).clamp(0.0, 1.0)
}

/// Position on the straight line from start to end after `distance` km
pub fn interpolate(route: &RouteInfo, distance: f64) -> Coordinate {
    let t = progress(distance, route.distance_km);
    route.start_coords.lerp(&route.end_coords, t)
}

/// Mark every unreached checkpoint whose box contains `position`.
///
/// Returns clones of the checkpoints reached by this call, in route order.
/// Already-reached checkpoints are never touched, so a checkpoint is reported
/// at most once per run. Route order is not enforced.
pub fn mark_reached(checkpoints: &mut [Checkpoint], position: &Coordinate) -> Vec<Checkpoint> {
    let mut newly_reached = Vec::new();
    for checkpoint in checkpoints.iter_mut().filter(|cp| !cp.reached) {
        if position.within_box(&checkpoint.coords, CHECKPOINT_TOLERANCE_DEG) {
            checkpoint.reached = true;
            newly_reached.push(checkpoint.clone());
        }
    }
    newly_reached
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> RouteInfo {
        RouteInfo {
            start_location: "A".to_string(),
            start_coords: Coordinate::new(0.0, 0.0),
            end_location: "B".to_string(),
            end_coords: Coordinate::new(0.01, 0.02),
            checkpoints: vec![
                Checkpoint::new(1, "mid", Coordinate::new(0.005, 0.01)),
                Checkpoint::new(2, "off", Coordinate::new(1.0, 1.0)),
            ],
            distance_km: 2.0,
            estimated_minutes: 5.0,
        }
    }

    #[test]
    fn interpolation_clamps_past_the_end() {
        let route = route();
        assert_eq!(interpolate(&route, 0.0), route.start_coords);
        assert_eq!(interpolate(&route, 5.0), route.end_coords);
        let mid = interpolate(&route, 1.0);
        assert!((mid.lat - 0.005).abs() < 1e-12);
        assert!((mid.lng - 0.01).abs() < 1e-12);
    }

    #[test]
    fn checkpoint_is_reported_once() {
        let mut route = route();
        let pos = Coordinate::new(0.0052, 0.0099);
        let first = mark_reached(&mut route.checkpoints, &pos);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, 1);
        assert!(mark_reached(&mut route.checkpoints, &pos).is_empty());
        assert!(!route.checkpoints[1].reached);
    }
}
