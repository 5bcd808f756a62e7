//! Difficulty curve derived from score

use crate::consts::*;

/// Fall speed (pixels/s) for the current score. Non-decreasing in score.
#[inline]
pub fn fall_speed(score: u32) -> f32 {
    BASE_FALL_SPEED + score as f32 * SPEED_PER_SCORE
}

/// Seconds between spawns for the current score, floored at `SPAWN_INTERVAL_MIN`
#[inline]
pub fn spawn_interval(score: u32) -> f32 {
    (SPAWN_INTERVAL_BASE - score as f32 * SPAWN_ACCEL_PER_SCORE).max(SPAWN_INTERVAL_MIN)
}
