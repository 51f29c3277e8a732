//! # Per-Frame Particle Transform
//!
//! drift → rotate → project → depth-sort, once per frame.
//!
//! Every value here is a pure function of the frame time and the static
//! particle array, so two calls with the same `t` produce the same points.
//!
//! ## Depth convention
//!
//! After rotation, positive `z` points at the viewer. The perspective factor
//! `s = d / (d - z)` grows as points come closer, and so does opacity, so the
//! nearest particles are both the largest and the brightest. Sorting by
//! ascending `z` therefore yields back-to-front painter's order.

use grove_procedural::Particle;
use grove_shared::{clamp01, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::surface::Viewport;

/// Smallest perspective denominator; keeps points behind the eye finite.
const MIN_DEPTH_DENOMINATOR: f32 = 0.1;

/// Tunables for the brain cloud. Defaults reproduce the site's look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    /// Drift amplitude on X and Y (scene units).
    pub drift_amplitude_xy: f32,
    /// Drift amplitude on Z.
    pub drift_amplitude_z: f32,
    /// Drift angular rate on X (radians per ms, times particle speed).
    pub drift_rate_x: f32,
    /// Drift angular rate on Y.
    pub drift_rate_y: f32,
    /// Drift angular rate on Z.
    pub drift_rate_z: f32,
    /// Phase offset of the Y drift.
    pub drift_phase_y: f32,
    /// Phase offset of the Z drift.
    pub drift_phase_z: f32,

    /// Spin around Y (radians per ms).
    pub spin_rate: f32,
    /// Nod oscillation rate around X.
    pub nod_rate: f32,
    /// Nod amplitude (radians).
    pub nod_amplitude: f32,
    /// Breathing oscillation rate.
    pub breathe_rate: f32,
    /// Breathing amplitude (fraction of drift).
    pub breathe_amplitude: f32,

    /// Camera distance used for perspective division.
    pub perspective: f32,
    /// Scene-to-screen scale as a fraction of viewport width.
    pub scale: f32,

    /// Opacity of the farthest particles.
    pub alpha_base: f32,
    /// Opacity added across the depth range.
    pub alpha_range: f32,

    /// Size multiplier for emphasized particles.
    pub bright_size: f32,
    /// Opacity multiplier for emphasized particles.
    pub bright_alpha: f32,
    /// Pulse rate of emphasized particles.
    pub pulse_rate: f32,
    /// Pulse amplitude.
    pub pulse_amplitude: f32,
    /// Opacity cap for emphasized particles.
    pub bright_alpha_max: f32,

    /// Link distance as a fraction of viewport width.
    pub link_distance: f32,
    /// Link opacity at zero distance, times the dimmer endpoint.
    pub link_strength: f32,
    /// Links at or below this opacity are skipped.
    pub link_alpha_min: f32,
    /// Link stroke width (CSS px).
    pub link_width: f32,

    /// Glow sprite resolution (px).
    pub sprite_size: u32,
    /// Drawn sprite size as a multiple of particle size.
    pub sprite_scale: f32,

    /// Ambient glow radius as a fraction of viewport width.
    pub glow_radius: f32,
    /// Ambient glow opacity at the centre.
    pub glow_alpha: f32,

    /// Satellite edge opacity relative to particle opacity at the same depth.
    pub satellite_alpha: f32,
    /// Satellite edge width (CSS px).
    pub satellite_width: f32,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            drift_amplitude_xy: 0.028,
            drift_amplitude_z: 0.022,
            drift_rate_x: 0.0008,
            drift_rate_y: 0.000_65,
            drift_rate_z: 0.0006,
            drift_phase_y: 1.5,
            drift_phase_z: 3.1,
            spin_rate: 0.000_07,
            nod_rate: 0.000_035,
            nod_amplitude: 0.2,
            breathe_rate: 0.000_25,
            breathe_amplitude: 0.04,
            perspective: 2.8,
            scale: 0.52,
            alpha_base: 0.08,
            alpha_range: 0.58,
            bright_size: 1.6,
            bright_alpha: 1.5,
            pulse_rate: 0.0018,
            pulse_amplitude: 0.09,
            bright_alpha_max: 0.92,
            link_distance: 0.15,
            link_strength: 0.1,
            link_alpha_min: 0.003,
            link_width: 0.5,
            sprite_size: 32,
            sprite_scale: 3.8,
            glow_radius: 0.38,
            glow_alpha: 0.025,
            satellite_alpha: 0.7,
            satellite_width: 0.6,
        }
    }
}

/// Global breathing and rotation for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Drift scale, oscillating around 1.
    pub breathe: f32,
    cos_y: f32,
    sin_y: f32,
    cos_x: f32,
    sin_x: f32,
}

impl CameraPose {
    /// Pose at time `t` (ms).
    #[must_use]
    pub fn at(t: f64, settings: &CloudSettings) -> Self {
        let breathe =
            1.0 + (t * f64::from(settings.breathe_rate)).sin() as f32 * settings.breathe_amplitude;
        let rot_y = (t * f64::from(settings.spin_rate)) as f32;
        let rot_x = (t * f64::from(settings.nod_rate)).sin() as f32 * settings.nod_amplitude;
        let (sin_y, cos_y) = rot_y.sin_cos();
        let (sin_x, cos_x) = rot_x.sin_cos();
        Self {
            breathe,
            cos_y,
            sin_y,
            cos_x,
            sin_x,
        }
    }

    /// Spin around Y, then nod around X.
    #[inline]
    #[must_use]
    pub fn rotate(&self, p: Vec3) -> Vec3 {
        p.rotate_y(self.cos_y, self.sin_y)
            .rotate_x(self.cos_x, self.sin_x)
    }
}

/// Maps rotated scene points onto the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    center: Vec2,
    scale: f32,
    perspective: f32,
}

impl Projector {
    /// Projector for `viewport`: centred, scaled by its width.
    #[must_use]
    pub fn new(viewport: &Viewport, settings: &CloudSettings) -> Self {
        Self {
            center: viewport.center(),
            scale: viewport.width * settings.scale,
            perspective: settings.perspective,
        }
    }

    /// Perspective factor at depth `z`.
    #[inline]
    #[must_use]
    pub fn depth_scale(&self, z: f32) -> f32 {
        self.perspective / (self.perspective - z).max(MIN_DEPTH_DENOMINATOR)
    }

    /// Screen position and perspective factor of a rotated point.
    #[inline]
    #[must_use]
    pub fn project(&self, p: Vec3) -> (Vec2, f32) {
        let s = self.depth_scale(p.z);
        (
            Vec2::new(
                self.center.x + p.x * s * self.scale,
                self.center.y + p.y * s * self.scale,
            ),
            s,
        )
    }
}

/// Depth-driven opacity shared by particles and satellite edges.
#[inline]
#[must_use]
pub fn depth_alpha(z: f32, settings: &CloudSettings) -> f32 {
    settings.alpha_base + settings.alpha_range * clamp01((z + 0.8) / 1.6)
}

/// A particle after this frame's transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Screen position (CSS px).
    pub screen: Vec2,
    /// Sort key: rotated `z`, larger is nearer.
    pub depth: f32,
    /// Drawn size, never negative.
    pub size: f32,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Drawn with the accent sprite.
    pub accent: bool,
    /// Index into the particle array.
    pub index: usize,
}

/// Transforms every particle for time `t`, writing into `out`.
///
/// `out` is cleared first; reusing one buffer across frames avoids a
/// per-frame allocation.
pub fn transform_particles(
    particles: &[Particle],
    t: f64,
    viewport: &Viewport,
    settings: &CloudSettings,
    out: &mut Vec<ProjectedPoint>,
) {
    out.clear();
    out.reserve(particles.len());

    let pose = CameraPose::at(t, settings);
    let projector = Projector::new(viewport, settings);
    let amp_xy = settings.drift_amplitude_xy * pose.breathe;
    let amp_z = settings.drift_amplitude_z * pose.breathe;
    let pulse_clock = t * f64::from(settings.pulse_rate);

    for (index, p) in particles.iter().enumerate() {
        let speed = f64::from(p.speed);
        let phase = f64::from(p.phase);
        let angle =
            |rate: f32, offset: f32| t * f64::from(rate) * speed + phase + f64::from(offset);
        let drift = Vec3::new(
            angle(settings.drift_rate_x, 0.0).sin() as f32 * amp_xy,
            angle(settings.drift_rate_y, settings.drift_phase_y).cos() as f32 * amp_xy,
            angle(settings.drift_rate_z, settings.drift_phase_z).sin() as f32 * amp_z,
        );

        let rotated = pose.rotate(p.origin + drift);
        let (screen, s) = projector.project(rotated);

        let mut size = p.size * s;
        let mut alpha = depth_alpha(rotated.z, settings);
        if p.bright {
            size *= settings.bright_size;
            let pulse = (pulse_clock + phase).sin() as f32 * settings.pulse_amplitude;
            alpha = (alpha * settings.bright_alpha + pulse).min(settings.bright_alpha_max);
        }

        out.push(ProjectedPoint {
            screen,
            depth: rotated.z,
            size: size.max(0.0),
            alpha: clamp01(alpha),
            accent: p.accent,
            index,
        });
    }
}

/// Sorts back-to-front. Stable: equal depths keep input order.
pub fn depth_sort(points: &mut [ProjectedPoint]) {
    points.sort_by(|a, b| a.depth.total_cmp(&b.depth));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(origin: Vec3, bright: bool) -> Particle {
        Particle {
            origin,
            size: 1.0,
            phase: 0.0,
            speed: 0.5,
            bright,
            accent: false,
        }
    }

    #[test]
    fn test_pose_at_zero_is_identity() {
        let pose = CameraPose::at(0.0, &CloudSettings::default());
        let p = Vec3::new(0.3, -0.2, 0.1);
        let r = pose.rotate(p);
        assert!((r.x - p.x).abs() < 1e-6);
        assert!((r.y - p.y).abs() < 1e-6);
        assert!((r.z - p.z).abs() < 1e-6);
        assert!((pose.breathe - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_near_is_larger_and_brighter() {
        let settings = CloudSettings::default();
        let viewport = Viewport::default();
        let particles = [
            particle(Vec3::new(0.0, 0.0, -0.5), false),
            particle(Vec3::new(0.0, 0.0, 0.5), false),
        ];
        let mut out = Vec::new();
        transform_particles(&particles, 0.0, &viewport, &settings, &mut out);
        let (far, near) = (out[0], out[1]);
        assert!(near.size > far.size);
        assert!(near.alpha > far.alpha);
        assert!(near.depth > far.depth);
    }

    #[test]
    fn test_centre_projects_to_viewport_centre() {
        let settings = CloudSettings::default();
        let viewport = Viewport::new(1000.0, 500.0, 1.0);
        let projector = Projector::new(&viewport, &settings);
        let (screen, s) = projector.project(Vec3::ZERO);
        assert_eq!(screen, Vec2::new(500.0, 250.0));
        assert!((s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_depth_scale_stays_finite_behind_eye() {
        let projector = Projector::new(&Viewport::default(), &CloudSettings::default());
        let s = projector.depth_scale(10.0);
        assert!(s.is_finite());
        assert!(s > 0.0);
    }

    #[test]
    fn test_bright_alpha_capped() {
        let settings = CloudSettings::default();
        let mut out = Vec::new();
        let near_bright = [particle(Vec3::new(0.0, 0.0, 0.6), true)];
        for t in [0.0, 500.0, 872.0, 10_000.0] {
            transform_particles(&near_bright, t, &Viewport::default(), &settings, &mut out);
            assert!(out[0].alpha <= settings.bright_alpha_max + 1e-6);
        }
    }

    #[test]
    fn test_sort_is_stable() {
        let make = |depth, index| ProjectedPoint {
            screen: Vec2::ZERO,
            depth,
            size: 1.0,
            alpha: 1.0,
            accent: false,
            index,
        };
        let mut pts = vec![make(0.2, 0), make(-0.1, 1), make(0.2, 2), make(-0.1, 3)];
        depth_sort(&mut pts);
        let order: Vec<usize> = pts.iter().map(|p| p.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }
}
