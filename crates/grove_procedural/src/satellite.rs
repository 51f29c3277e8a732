//! Orbiting satellites.
//!
//! Small wireframe polyhedra that circle the brain cloud. Each one spins
//! around its own centre while travelling an inclined circular orbit; both
//! motions are closed-form in time.

use std::f32::consts::TAU;

use grove_shared::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Golden ratio, for the icosahedron.
const PHI: f32 = 1.618_034;

/// Supported satellite shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polyhedron {
    /// 4 vertices, 6 edges.
    Tetrahedron,
    /// 6 vertices, 12 edges.
    Octahedron,
    /// 8 vertices, 12 edges.
    Cube,
    /// 12 vertices, 30 edges.
    Icosahedron,
}

impl Polyhedron {
    /// Every shape, in orbit assignment order.
    pub const ALL: [Self; 4] = [
        Self::Tetrahedron,
        Self::Octahedron,
        Self::Cube,
        Self::Icosahedron,
    ];

    /// Vertices on the unit sphere.
    #[must_use]
    pub fn vertices(self) -> Vec<Vec3> {
        let raw: Vec<Vec3> = match self {
            Self::Tetrahedron => vec![
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(-1.0, -1.0, 1.0),
            ],
            Self::Octahedron => vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, -1.0),
            ],
            Self::Cube => {
                let mut v = Vec::with_capacity(8);
                for x in [-1.0, 1.0] {
                    for y in [-1.0, 1.0] {
                        for z in [-1.0, 1.0] {
                            v.push(Vec3::new(x, y, z));
                        }
                    }
                }
                v
            }
            Self::Icosahedron => {
                let mut v = Vec::with_capacity(12);
                for a in [-1.0, 1.0] {
                    for b in [-PHI, PHI] {
                        v.push(Vec3::new(0.0, a, b));
                        v.push(Vec3::new(a, b, 0.0));
                        v.push(Vec3::new(b, 0.0, a));
                    }
                }
                v
            }
        };
        raw.into_iter().map(|p| p * (1.0 / p.length())).collect()
    }
}

/// Vertices plus edge list, ready to project.
#[derive(Debug, Clone, PartialEq)]
pub struct Wireframe {
    /// Unit-circumradius vertices.
    pub vertices: Vec<Vec3>,
    /// Index pairs into `vertices`.
    pub edges: Vec<(usize, usize)>,
}

impl Wireframe {
    /// Builds the wireframe of a regular polyhedron.
    ///
    /// Edges of a regular solid are exactly the vertex pairs at the minimum
    /// pairwise distance.
    #[must_use]
    pub fn of(shape: Polyhedron) -> Self {
        let vertices = shape.vertices();
        let mut shortest = f32::INFINITY;
        for i in 0..vertices.len() {
            for j in i + 1..vertices.len() {
                shortest = shortest.min(vertices[i].distance(vertices[j]));
            }
        }

        let mut edges = Vec::new();
        for i in 0..vertices.len() {
            for j in i + 1..vertices.len() {
                if vertices[i].distance(vertices[j]) <= shortest * 1.001 {
                    edges.push((i, j));
                }
            }
        }
        Self { vertices, edges }
    }
}

/// Satellite generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteSettings {
    /// How many satellites orbit the cloud.
    pub count: usize,
    /// Smallest orbit radius (scene units).
    pub radius_min: f32,
    /// Largest orbit radius.
    pub radius_max: f32,
    /// Smallest circumradius of a satellite.
    pub scale_min: f32,
    /// Largest circumradius.
    pub scale_max: f32,
    /// Slowest orbital speed (radians per millisecond).
    pub speed_min: f32,
    /// Fastest orbital speed.
    pub speed_max: f32,
    /// Largest orbit inclination (radians).
    pub max_inclination: f32,
}

impl Default for SatelliteSettings {
    fn default() -> Self {
        Self {
            count: 3,
            radius_min: 0.72,
            radius_max: 0.95,
            scale_min: 0.045,
            scale_max: 0.075,
            speed_min: 0.000_08,
            speed_max: 0.000_18,
            max_inclination: 0.6,
        }
    }
}

/// One orbiting polyhedron.
#[derive(Debug, Clone, PartialEq)]
pub struct Satellite {
    /// Shape.
    pub shape: Polyhedron,
    /// Geometry at unit size.
    pub wireframe: Wireframe,
    /// Orbit radius.
    pub orbit_radius: f32,
    /// Tilt of the orbit plane around X.
    pub inclination: f32,
    /// Rotation of the orbit plane around Y.
    pub node: f32,
    /// Orbital angular speed (radians per millisecond, signed).
    pub angular_speed: f32,
    /// Orbital angle at t = 0.
    pub phase: f32,
    /// Self-rotation speed (radians per millisecond).
    pub spin_speed: f32,
    /// Circumradius.
    pub scale: f32,
}

impl Satellite {
    /// Centre of the satellite at time `t` (ms).
    #[must_use]
    pub fn center(&self, t: f64) -> Vec3 {
        let angle = (f64::from(self.phase) + f64::from(self.angular_speed) * t) as f32;
        let (sin, cos) = angle.sin_cos();
        let flat = Vec3::new(cos * self.orbit_radius, 0.0, sin * self.orbit_radius);
        let (sin_i, cos_i) = self.inclination.sin_cos();
        let (sin_n, cos_n) = self.node.sin_cos();
        flat.rotate_x(cos_i, sin_i).rotate_y(cos_n, sin_n)
    }

    /// World-space vertices at time `t` (ms), in wireframe order.
    pub fn vertices_at(&self, t: f64) -> impl Iterator<Item = Vec3> + '_ {
        let center = self.center(t);
        let spin = f64::from(self.spin_speed) * t;
        let (sin_a, cos_a) = (spin as f32).sin_cos();
        let (sin_b, cos_b) = ((spin * 0.7) as f32).sin_cos();
        self.wireframe
            .vertices
            .iter()
            .map(move |v| center + (*v * self.scale).rotate_y(cos_a, sin_a).rotate_x(cos_b, sin_b))
    }
}

/// Generates the satellite ring.
///
/// Shapes cycle through [`Polyhedron::ALL`] so small counts stay varied.
pub fn generate_satellites<R: Rng + ?Sized>(
    settings: &SatelliteSettings,
    rng: &mut R,
) -> Vec<Satellite> {
    (0..settings.count)
        .map(|i| {
            let shape = Polyhedron::ALL[i % Polyhedron::ALL.len()];
            let direction = if rng.gen::<bool>() { 1.0 } else { -1.0 };
            Satellite {
                shape,
                wireframe: Wireframe::of(shape),
                orbit_radius: lerp(settings.radius_min, settings.radius_max, rng.gen()),
                inclination: (rng.gen::<f32>() * 2.0 - 1.0) * settings.max_inclination,
                node: rng.gen::<f32>() * TAU,
                angular_speed: direction * lerp(settings.speed_min, settings.speed_max, rng.gen()),
                phase: (i as f32 / settings.count as f32) * TAU + rng.gen::<f32>() * 0.5,
                spin_speed: 0.0004 + rng.gen::<f32>() * 0.0006,
                scale: lerp(settings.scale_min, settings.scale_max, rng.gen()),
            }
        })
        .collect()
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_edge_counts() {
        assert_eq!(Wireframe::of(Polyhedron::Tetrahedron).edges.len(), 6);
        assert_eq!(Wireframe::of(Polyhedron::Octahedron).edges.len(), 12);
        assert_eq!(Wireframe::of(Polyhedron::Cube).edges.len(), 12);
        assert_eq!(Wireframe::of(Polyhedron::Icosahedron).edges.len(), 30);
    }

    #[test]
    fn test_orbit_keeps_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let sats = generate_satellites(&SatelliteSettings::default(), &mut rng);
        assert_eq!(sats.len(), 3);
        for sat in &sats {
            for t in [0.0, 1_000.0, 45_000.0] {
                assert!((sat.center(t).length() - sat.orbit_radius).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_vertices_stay_at_scale() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let sat = generate_satellites(&SatelliteSettings::default(), &mut rng).remove(0);
        let c = sat.center(2_500.0);
        for v in sat.vertices_at(2_500.0) {
            assert!((v.distance(c) - sat.scale).abs() < 1e-4);
        }
    }
}
