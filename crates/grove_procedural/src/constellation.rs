//! Constellation nodes.
//!
//! Stars live in normalized page coordinates (`[0, 1)` on both axes) and
//! drift in straight lines, wrapping at the edges, with a small wobble on
//! top. Position and twinkle are closed-form in time.

use std::f32::consts::TAU;

use grove_shared::{clamp01, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Constellation generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstellationSettings {
    /// Number of stars.
    pub count: usize,
    /// Largest drift speed (normalized units per millisecond).
    pub speed_max: f32,
    /// Largest wobble amplitude (normalized units).
    pub wobble_max: f32,
    /// Smallest star radius (CSS pixels).
    pub radius_min: f32,
    /// Largest star radius.
    pub radius_max: f32,
}

impl Default for ConstellationSettings {
    fn default() -> Self {
        Self {
            count: 48,
            speed_max: 0.000_012,
            wobble_max: 0.004,
            radius_min: 0.6,
            radius_max: 1.8,
        }
    }
}

/// One drifting star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Position at t = 0.
    pub origin: Vec2,
    /// Drift velocity.
    pub velocity: Vec2,
    /// Wobble amplitude.
    pub wobble: f32,
    /// Wobble and twinkle phase.
    pub phase: f32,
    /// Twinkle angular rate (radians per millisecond).
    pub twinkle_rate: f32,
    /// Drawn radius.
    pub radius: f32,
}

impl Star {
    /// Normalized position at time `t` (ms), always in `[0, 1)`.
    #[must_use]
    pub fn position(&self, t: f64) -> Vec2 {
        // Drift is wrapped in f64 so long-running pages keep sub-pixel precision.
        let x = f64::from(self.origin.x) + f64::from(self.velocity.x) * t;
        let y = f64::from(self.origin.y) + f64::from(self.velocity.y) * t;
        let phase = f64::from(self.phase);
        let wobble = f64::from(self.wobble);
        let wx = (t * 0.0007 + phase).sin() * wobble;
        let wy = (t * 0.0005 + phase * 1.3).cos() * wobble;
        Vec2::new(wrap01(x + wx), wrap01(y + wy))
    }

    /// Opacity at time `t`, in `[0.25, 0.85]`.
    #[must_use]
    pub fn opacity(&self, t: f64) -> f32 {
        let wave = 0.5 + 0.5 * (t * f64::from(self.twinkle_rate) + f64::from(self.phase)).sin();
        clamp01(0.25 + 0.6 * wave as f32)
    }
}

/// Generates the star field.
pub fn generate_stars<R: Rng + ?Sized>(settings: &ConstellationSettings, rng: &mut R) -> Vec<Star> {
    (0..settings.count)
        .map(|_| {
            let heading = rng.gen::<f32>() * TAU;
            let speed = rng.gen::<f32>() * settings.speed_max;
            Star {
                origin: Vec2::new(rng.gen(), rng.gen()),
                velocity: Vec2::from_angle(heading) * speed,
                wobble: rng.gen::<f32>() * settings.wobble_max,
                phase: rng.gen::<f32>() * TAU,
                twinkle_rate: 0.0006 + rng.gen::<f32>() * 0.0012,
                radius: settings.radius_min
                    + rng.gen::<f32>() * (settings.radius_max - settings.radius_min),
            }
        })
        .collect()
}

fn wrap01(v: f64) -> f32 {
    let w = v.rem_euclid(1.0) as f32;
    // Rounding can land exactly on 1.0 for tiny negatives.
    if w >= 1.0 {
        0.0
    } else {
        w
    }
}
