use bevy::math::Vec2;

use super::rng::RandomStream;
use crate::config::MAX_TERRAIN_ITERATIONS;
use crate::error::{GenError, GenResult};

fn bad(field: &'static str, value: f32, reason: &'static str) -> GenError {
    GenError::InvalidParameter { field, value, reason }
}

/// Iterative midpoint displacement between two points.
///
/// Every iteration inserts a midpoint between each adjacent pair of the previous
/// iteration, displaced vertically by exactly `±displacement` (a fair coin per
/// midpoint, left to right), then shrinks the displacement by `2^-roughness`.
/// `displacement` defaults to the mean of the two end heights.
///
/// # Returns
/// `2^iterations + 1` points with strictly ascending x, first and last equal to `start` and `end`.
pub fn generate_terrain(
    start: Vec2,
    end: Vec2,
    roughness: f32,
    displacement: Option<f32>,
    iterations: u32,
    rng: &mut RandomStream,
) -> GenResult<Vec<Vec2>> {
    if !roughness.is_finite() || roughness <= 0.0 {
        return Err(bad("roughness", roughness, "must be positive"));
    }
    if !start.is_finite() || !end.is_finite() {
        return Err(bad("endpoint", f32::NAN, "must be finite"));
    }
    if start.x >= end.x {
        return Err(bad("end.x", end.x, "must be greater than start.x"));
    }
    if iterations > MAX_TERRAIN_ITERATIONS {
        return Err(bad("iterations", iterations as f32, "above iteration ceiling"));
    }

    let mut displacement = displacement.unwrap_or((start.y + end.y) / 2.0);
    if !displacement.is_finite() {
        return Err(bad("displacement", displacement, "must be finite"));
    }

    let decay = 2f32.powf(-roughness);
    let mut points = vec![start, end];

    for _ in 0..iterations {
        // rebuild from a snapshot, interleaving the new midpoints keeps x sorted
        let mut next = Vec::with_capacity(points.len() * 2 - 1);
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let sign = if rng.coin_flip() { 1.0 } else { -1.0 };
            next.push(a);
            next.push(Vec2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0 + sign * displacement));
        }
        next.push(end);
        points = next;

        displacement *= decay;
    }

    Ok(points)
}

/// Height of the terrain point closest in x to `x`.
pub fn height_at(terrain: &[Vec2], x: f32) -> Option<f32> {
    terrain
        .iter()
        .min_by(|a, b| (a.x - x).abs().total_cmp(&(b.x - x).abs()))
        .map(|p| p.y)
}
