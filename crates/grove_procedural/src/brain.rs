//! # Brain Particle Generation
//!
//! Two strategies produce the static particle set:
//!
//! - **Geometric**: two surface-biased hemispheres with anterior tapering,
//!   a posterior bulge and a thin connecting bridge.
//! - **Implicit**: rejection sampling in a thin shell around a blended
//!   ellipsoid SDF (see [`crate::sdf`]).
//!
//! Either way the result has exactly `count` particles.

use std::f32::consts::TAU;

use grove_shared::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ProceduralError, ProceduralResult};
use crate::particle::{Particle, ParticleTraits};
use crate::sdf::{BlendedEllipsoids, ShellSampler};

/// Share of the particles given to each hemisphere in the geometric shape.
const HEMISPHERE_SHARE: f32 = 0.46;

/// Which generator builds the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrainShape {
    /// Ellipsoid sampling with ad hoc tapering.
    #[default]
    Geometric,
    /// SDF shell sampling.
    Implicit,
}

/// Brain cloud generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainSettings {
    /// Number of particles.
    pub count: usize,
    /// Generation strategy.
    pub shape: BrainShape,
    /// Attribute ranges.
    pub traits: ParticleTraits,
    /// Smooth-min blend radius for the implicit shape.
    pub blend: f32,
    /// Shell sampler for the implicit shape.
    pub sampler: ShellSampler,
}

impl Default for BrainSettings {
    fn default() -> Self {
        Self {
            count: 200,
            shape: BrainShape::Geometric,
            traits: ParticleTraits::default(),
            blend: 0.08,
            sampler: ShellSampler::default(),
        }
    }
}

/// Generates the brain cloud.
///
/// # Errors
///
/// `InvalidParameter` for an empty request; the implicit strategy can also
/// fail with `SamplingExhausted`.
pub fn generate_brain<R: Rng + ?Sized>(
    settings: &BrainSettings,
    rng: &mut R,
) -> ProceduralResult<Vec<Particle>> {
    if settings.count == 0 {
        return Err(ProceduralError::InvalidParameter {
            name: "count",
            reason: "a cloud needs at least one particle".into(),
        });
    }

    let particles = match settings.shape {
        BrainShape::Geometric => geometric_brain(settings.count, &settings.traits, rng),
        BrainShape::Implicit => {
            let sdf = BlendedEllipsoids::brain(settings.blend);
            settings
                .sampler
                .sample(&sdf, settings.count, rng)?
                .into_iter()
                .map(|origin| Particle::sample(origin, &settings.traits, rng))
                .collect()
        }
    };

    tracing::debug!(
        count = particles.len(),
        shape = ?settings.shape,
        "brain cloud generated"
    );
    Ok(particles)
}

/// Geometric hemispheres plus a corpus-callosum bridge.
pub fn geometric_brain<R: Rng + ?Sized>(
    count: usize,
    traits: &ParticleTraits,
    rng: &mut R,
) -> Vec<Particle> {
    let per_hemisphere = (count as f32 * HEMISPHERE_SHARE).floor() as usize;
    let mut particles = Vec::with_capacity(count);

    for side in [-1.0, 1.0] {
        for _ in 0..per_hemisphere {
            let origin = hemisphere_point(side, rng);
            particles.push(Particle::sample(origin, traits, rng));
        }
    }

    let bridge = count - per_hemisphere * 2;
    for _ in 0..bridge {
        let origin = Vec3::new(
            (rng.gen::<f32>() - 0.5) * 0.14,
            (rng.gen::<f32>() - 0.5) * 0.38,
            (rng.gen::<f32>() - 0.5) * 0.22,
        );
        particles.push(Particle::sample(origin, traits, rng));
    }

    particles
}

/// One point of a hemisphere; `side` is -1 (left) or +1 (right).
fn hemisphere_point<R: Rng + ?Sized>(side: f32, rng: &mut R) -> Vec3 {
    let theta = TAU * rng.gen::<f32>();
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    // Surface-heavy radius.
    let r = 0.2 + rng.gen::<f32>().powf(0.45) * 0.8;

    let mut x = r * phi.sin() * theta.cos();
    let mut y = r * phi.sin() * theta.sin();
    let mut z = r * phi.cos();

    x = x * 0.42 + side * 0.28;
    y *= 0.55;
    z *= 0.44;

    // Front narrows.
    if y > 0.0 {
        x *= 1.0 - y * 0.18;
        z *= 1.0 - y * 0.12;
    }

    // Back widens.
    if y < -0.2 {
        let bulge = (y + 0.2).abs() * 0.22;
        x *= 1.0 + bulge;
    }

    Vec3::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_geometric_count_matches_request() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for count in [1, 2, 7, 200, 513] {
            let cloud = geometric_brain(count, &ParticleTraits::default(), &mut rng);
            assert_eq!(cloud.len(), count);
        }
    }

    #[test]
    fn test_hemispheres_sit_either_side() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let cloud = geometric_brain(200, &ParticleTraits::default(), &mut rng);
        // 92 left, 92 right, 16 bridge
        let left_mean: f32 = cloud[..92].iter().map(|p| p.origin.x).sum::<f32>() / 92.0;
        let right_mean: f32 = cloud[92..184].iter().map(|p| p.origin.x).sum::<f32>() / 92.0;
        assert!(left_mean < -0.15, "left mean {left_mean}");
        assert!(right_mean > 0.15, "right mean {right_mean}");
        for p in &cloud[184..] {
            assert!(p.origin.x.abs() <= 0.07);
        }
    }

    #[test]
    fn test_implicit_count_matches_request() {
        let settings = BrainSettings {
            count: 150,
            shape: BrainShape::Implicit,
            ..BrainSettings::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let cloud = generate_brain(&settings, &mut rng).unwrap();
        assert_eq!(cloud.len(), 150);
    }

    #[test]
    fn test_empty_request_rejected() {
        let settings = BrainSettings {
            count: 0,
            ..BrainSettings::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        assert!(generate_brain(&settings, &mut rng).is_err());
    }
}
