//! Cloud particles.
//!
//! A particle is generated once and never changes. Each frame derives a
//! screen position and opacity from it; nothing is written back.

use std::f32::consts::TAU;

use grove_shared::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single cloud particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Rest position in scene space.
    pub origin: Vec3,
    /// Base display size before perspective.
    pub size: f32,
    /// Drift phase offset (radians).
    pub phase: f32,
    /// Drift speed multiplier.
    pub speed: f32,
    /// Emphasized node: larger and pulsing.
    pub bright: bool,
    /// Drawn with the accent sprite.
    pub accent: bool,
}

/// Ranges the per-particle attributes are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTraits {
    /// Smallest base size.
    pub size_min: f32,
    /// Added to `size_min` at most.
    pub size_range: f32,
    /// Slowest drift multiplier.
    pub speed_min: f32,
    /// Added to `speed_min` at most.
    pub speed_range: f32,
    /// Probability a particle is emphasized.
    pub bright_chance: f32,
    /// Probability a particle uses the accent colour.
    pub accent_chance: f32,
}

impl Default for ParticleTraits {
    fn default() -> Self {
        Self {
            size_min: 0.7,
            size_range: 1.5,
            speed_min: 0.18,
            speed_range: 0.65,
            bright_chance: 0.09,
            accent_chance: 0.15,
        }
    }
}

impl Particle {
    /// Creates a particle at `origin` with freshly sampled attributes.
    ///
    /// Draw order is fixed (size, phase, speed, bright, accent) so seeded
    /// generators stay reproducible.
    pub fn sample<R: Rng + ?Sized>(origin: Vec3, traits: &ParticleTraits, rng: &mut R) -> Self {
        let size = traits.size_min + rng.gen::<f32>() * traits.size_range;
        let phase = rng.gen::<f32>() * TAU;
        let speed = traits.speed_min + rng.gen::<f32>() * traits.speed_range;
        let bright = rng.gen::<f32>() < traits.bright_chance;
        let accent = rng.gen::<f32>() < traits.accent_chance;
        Self {
            origin,
            size,
            phase,
            speed,
            bright,
            accent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_attributes_within_ranges() {
        let traits = ParticleTraits::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1000 {
            let p = Particle::sample(Vec3::ZERO, &traits, &mut rng);
            assert!(p.size >= 0.7 && p.size <= 2.2);
            assert!(p.phase >= 0.0 && p.phase <= TAU);
            assert!(p.speed >= 0.18 && p.speed <= 0.83);
        }
    }

    #[test]
    fn test_flag_rates_are_plausible() {
        let traits = ParticleTraits::default();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let n = 20_000;
        let mut bright = 0;
        let mut accent = 0;
        for _ in 0..n {
            let p = Particle::sample(Vec3::ZERO, &traits, &mut rng);
            bright += usize::from(p.bright);
            accent += usize::from(p.accent);
        }
        let bright_rate = bright as f32 / n as f32;
        let accent_rate = accent as f32 / n as f32;
        assert!((bright_rate - 0.09).abs() < 0.02, "bright rate {bright_rate}");
        assert!((accent_rate - 0.15).abs() < 0.02, "accent rate {accent_rate}");
    }
}
