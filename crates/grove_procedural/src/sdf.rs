//! # Signed Distance Fields
//!
//! Implicit brain surface built from ellipsoids blended with a polynomial
//! smooth minimum, plus a rejection sampler that keeps points inside a thin
//! shell around the zero level set.
//!
//! Distances are the usual ellipsoid *bound* (exact on the axes, an
//! underestimate elsewhere), which is plenty for biasing a point cloud.

use grove_shared::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ProceduralError, ProceduralResult};

/// An implicit surface.
pub trait Sdf {
    /// Signed distance from `p` to the surface (negative inside).
    fn distance(&self, p: Vec3) -> f32;

    /// Axis-aligned box (min, max) guaranteed to contain the surface.
    fn bounds(&self) -> (Vec3, Vec3);
}

/// Polynomial smooth minimum with blend radius `k`.
///
/// Equal to `min(a, b)` once the two distances differ by more than `k`.
#[inline]
#[must_use]
pub fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return a.min(b);
    }
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * k * 0.25
}

/// Axis-aligned ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Centre.
    pub center: Vec3,
    /// Semi-axes.
    pub radii: Vec3,
}

impl Ellipsoid {
    /// Creates an ellipsoid.
    #[must_use]
    pub const fn new(center: Vec3, radii: Vec3) -> Self {
        Self { center, radii }
    }
}

impl Sdf for Ellipsoid {
    fn distance(&self, p: Vec3) -> f32 {
        let local = p - self.center;
        let k0 = local.div_elem(self.radii).length();
        let k1 = local.div_elem(self.radii.mul_elem(self.radii)).length();
        if k1 <= f32::EPSILON {
            // At the centre: deepest point is one shortest radius away.
            return -self.radii.x.min(self.radii.y).min(self.radii.z);
        }
        k0 * (k0 - 1.0) / k1
    }

    fn bounds(&self) -> (Vec3, Vec3) {
        (self.center - self.radii, self.center + self.radii)
    }
}

/// Several ellipsoids fused with `smooth_min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendedEllipsoids {
    /// The primitives.
    pub parts: Vec<Ellipsoid>,
    /// Blend radius.
    pub blend: f32,
}

impl BlendedEllipsoids {
    /// Composite brain: two hemispheres, cerebellum and brain stem.
    ///
    /// Uses the same axis convention as the geometric generator: X is
    /// lateral, Y runs posterior (negative) to anterior, Z is depth.
    #[must_use]
    pub fn brain(blend: f32) -> Self {
        Self {
            parts: vec![
                Ellipsoid::new(Vec3::new(-0.19, 0.02, 0.0), Vec3::new(0.33, 0.52, 0.40)),
                Ellipsoid::new(Vec3::new(0.19, 0.02, 0.0), Vec3::new(0.33, 0.52, 0.40)),
                Ellipsoid::new(Vec3::new(0.0, -0.40, -0.20), Vec3::new(0.30, 0.15, 0.16)),
                Ellipsoid::new(Vec3::new(0.0, -0.30, -0.38), Vec3::new(0.08, 0.10, 0.20)),
            ],
            blend,
        }
    }
}

impl Sdf for BlendedEllipsoids {
    fn distance(&self, p: Vec3) -> f32 {
        self.parts
            .iter()
            .map(|part| part.distance(p))
            .reduce(|acc, d| smooth_min(acc, d, self.blend))
            .unwrap_or(f32::INFINITY)
    }

    fn bounds(&self) -> (Vec3, Vec3) {
        let pad = Vec3::splat(self.blend);
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for part in &self.parts {
            let (lo, hi) = part.bounds();
            min = Vec3::new(min.x.min(lo.x), min.y.min(lo.y), min.z.min(lo.z));
            max = Vec3::new(max.x.max(hi.x), max.y.max(hi.y), max.z.max(hi.z));
        }
        (min - pad, max + pad)
    }
}

/// Rejection sampler for points within `shell` of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSampler {
    /// Half-thickness of the accepted band around the surface.
    pub shell: f32,
    /// Attempt budget per requested point.
    pub attempts_per_point: u32,
}

impl Default for ShellSampler {
    fn default() -> Self {
        Self {
            shell: 0.025,
            attempts_per_point: 2_000,
        }
    }
}

impl ShellSampler {
    /// Draws exactly `count` points with `|sdf(p)| <= shell`.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for a non-positive shell, `SamplingExhausted` when
    /// the attempt budget runs out first.
    pub fn sample<S, R>(&self, sdf: &S, count: usize, rng: &mut R) -> ProceduralResult<Vec<Vec3>>
    where
        S: Sdf + ?Sized,
        R: Rng + ?Sized,
    {
        if self.shell.is_nan() || self.shell <= 0.0 {
            return Err(ProceduralError::InvalidParameter {
                name: "shell",
                reason: format!("must be positive, got {}", self.shell),
            });
        }

        let (min, max) = sdf.bounds();
        let extent = max - min;
        let budget = count as u64 * u64::from(self.attempts_per_point.max(1));
        let mut points = Vec::with_capacity(count);
        let mut attempts = 0u64;

        while points.len() < count {
            if attempts >= budget {
                return Err(ProceduralError::SamplingExhausted {
                    requested: count,
                    placed: points.len(),
                    attempts,
                });
            }
            attempts += 1;

            let p = min + Vec3::new(
                rng.gen::<f32>() * extent.x,
                rng.gen::<f32>() * extent.y,
                rng.gen::<f32>() * extent.z,
            );
            if sdf.distance(p).abs() <= self.shell {
                points.push(p);
            }
        }

        tracing::debug!(count, attempts, "shell sampling complete");
        Ok(points)
    }
}
