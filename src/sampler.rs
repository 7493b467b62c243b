//! Waypoint downsampling that keeps both endpoints.

/// Reduces `waypoints` to at most `max_points` entries.
///
/// The first and last points are always kept. Interior points are taken at a
/// fixed stride of `(len - 2) / (max_points - 2)`, starting at the stride
/// itself, until `max_points - 1` points are collected. Sequences that
/// already fit are returned unchanged. `max_points` below 2 is treated as 2.
pub fn sample<T: Clone>(waypoints: &[T], max_points: usize) -> Vec<T> {
    let max_points = max_points.max(2);
    let len = waypoints.len();
    if len <= max_points {
        return waypoints.to_vec();
    }

    let (Some(first), Some(last)) = (waypoints.first(), waypoints.last()) else {
        return Vec::new();
    };

    let mut sampled = Vec::with_capacity(max_points);
    sampled.push(first.clone());

    if max_points > 2 {
        let step = ((len - 2) / (max_points - 2)).max(1);
        sampled.extend(
            waypoints[..len - 1]
                .iter()
                .skip(step)
                .step_by(step)
                .take(max_points - 2)
                .cloned(),
        );
    }

    sampled.push(last.clone());
    sampled
}
