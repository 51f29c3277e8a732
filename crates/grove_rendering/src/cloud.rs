//! # Brain Cloud
//!
//! Owns the static particle array and satellites, plus the scratch buffers
//! reused every frame. Draw order per frame:
//!
//! 1. ambient glow
//! 2. satellites behind the cloud centre
//! 3. proximity links
//! 4. particles, back to front
//! 5. satellites in front

use grove_procedural::{Particle, Satellite};
use grove_shared::{palette, Rgba, Vec2};
use tracing::{debug, trace};

use crate::links::{proximity_links, Link, LinkStyle};
use crate::projection::{
    depth_alpha, depth_sort, transform_particles, CameraPose, CloudSettings, ProjectedPoint,
    Projector,
};
use crate::sprite::GlowSprite;
use crate::surface::{Surface, Viewport};

/// What one frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Particles stamped.
    pub particles: usize,
    /// Links stroked.
    pub links: usize,
    /// Satellite edges stroked.
    pub satellite_edges: usize,
}

/// One projected satellite edge.
#[derive(Debug, Clone, Copy)]
struct Edge {
    from: Vec2,
    to: Vec2,
    alpha: f32,
    front: bool,
}

/// The animated brain cloud.
#[derive(Debug, Clone)]
pub struct PointCloud {
    particles: Vec<Particle>,
    satellites: Vec<Satellite>,
    settings: CloudSettings,
    viewport: Viewport,
    olive: GlowSprite,
    gold: GlowSprite,
    points: Vec<ProjectedPoint>,
    links: Vec<Link>,
    edges: Vec<Edge>,
    corners: Vec<(Vec2, f32)>,
}

impl PointCloud {
    /// Builds a cloud. Sprites are rendered here, once.
    #[must_use]
    pub fn new(
        particles: Vec<Particle>,
        satellites: Vec<Satellite>,
        settings: CloudSettings,
        viewport: Viewport,
    ) -> Self {
        debug!(
            particles = particles.len(),
            satellites = satellites.len(),
            width = viewport.width,
            height = viewport.height,
            "Point cloud created"
        );
        let capacity = particles.len();
        Self {
            olive: GlowSprite::new(settings.sprite_size, palette::OLIVE),
            gold: GlowSprite::new(settings.sprite_size, palette::GOLD),
            particles,
            satellites,
            settings,
            viewport,
            points: Vec::with_capacity(capacity),
            links: Vec::new(),
            edges: Vec::new(),
            corners: Vec::new(),
        }
    }

    /// Static particles.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Satellites.
    #[must_use]
    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> &CloudSettings {
        &self.settings
    }

    /// Points from the most recent frame, back to front.
    #[must_use]
    pub fn last_points(&self) -> &[ProjectedPoint] {
        &self.points
    }

    /// Adopts a new viewport and resizes `surface` to match.
    pub fn resize<S: Surface + ?Sized>(&mut self, viewport: Viewport, surface: &mut S) {
        debug!(
            width = viewport.width,
            height = viewport.height,
            dpr = viewport.device_pixel_ratio,
            "Point cloud resized"
        );
        self.viewport = viewport;
        surface.resize(viewport);
    }

    /// Renders the frame at time `t` (ms) onto `surface`.
    pub fn frame<S: Surface + ?Sized>(&mut self, t: f64, surface: &mut S) -> FrameStats {
        surface.clear();
        if self.viewport.is_empty() {
            return FrameStats::default();
        }
        let settings = self.settings;
        let w = self.viewport.width;

        surface.radial_glow(
            self.viewport.center(),
            w * settings.glow_radius,
            palette::GLOW.with_alpha(settings.glow_alpha),
            Rgba::TRANSPARENT,
        );

        transform_particles(&self.particles, t, &self.viewport, &settings, &mut self.points);
        depth_sort(&mut self.points);
        self.project_satellites(t);

        let style = LinkStyle {
            threshold: w * settings.link_distance,
            strength: settings.link_strength,
            alpha_min: settings.link_alpha_min,
        };
        proximity_links(&self.points, &style, &mut self.links);

        let mut stats = FrameStats::default();
        stats.satellite_edges += self.draw_edges(surface, false);

        for link in &self.links {
            surface.line(
                self.points[link.a].screen,
                self.points[link.b].screen,
                settings.link_width,
                palette::LINK.with_alpha(link.alpha),
            );
        }
        stats.links = self.links.len();

        for p in &self.points {
            let sprite = if p.accent { &self.gold } else { &self.olive };
            surface.sprite(sprite, p.screen, p.size * settings.sprite_scale, p.alpha);
        }
        stats.particles = self.points.len();

        stats.satellite_edges += self.draw_edges(surface, true);

        trace!(
            t,
            particles = stats.particles,
            links = stats.links,
            satellite_edges = stats.satellite_edges,
            "Cloud frame"
        );
        stats
    }

    /// Rotates and projects every satellite edge for time `t`.
    fn project_satellites(&mut self, t: f64) {
        self.edges.clear();
        let pose = CameraPose::at(t, &self.settings);
        let projector = Projector::new(&self.viewport, &self.settings);

        for sat in &self.satellites {
            let front = pose.rotate(sat.center(t)).z >= 0.0;
            self.corners.clear();
            self.corners.extend(sat.vertices_at(t).map(|v| {
                let r = pose.rotate(v);
                (projector.project(r).0, r.z)
            }));
            for &(i, j) in &sat.wireframe.edges {
                let (from, za) = self.corners[i];
                let (to, zb) = self.corners[j];
                let alpha =
                    depth_alpha((za + zb) * 0.5, &self.settings) * self.settings.satellite_alpha;
                self.edges.push(Edge {
                    from,
                    to,
                    alpha,
                    front,
                });
            }
        }
    }

    fn draw_edges<S: Surface + ?Sized>(&self, surface: &mut S, front: bool) -> usize {
        let mut drawn = 0;
        for edge in self.edges.iter().filter(|e| e.front == front) {
            surface.line(
                edge.from,
                edge.to,
                self.settings.satellite_width,
                palette::BRASS.with_alpha(edge.alpha),
            );
            drawn += 1;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Canvas;
    use grove_procedural::{generate_brain, generate_satellites, BrainSettings, SatelliteSettings};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn cloud(viewport: Viewport) -> PointCloud {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let particles = generate_brain(&BrainSettings::default(), &mut rng).unwrap();
        let satellites = generate_satellites(&SatelliteSettings::default(), &mut rng);
        PointCloud::new(particles, satellites, CloudSettings::default(), viewport)
    }

    #[test]
    fn test_frame_draws_everything() {
        let viewport = Viewport::new(320.0, 240.0, 1.0);
        let mut cloud = cloud(viewport);
        let mut canvas = Canvas::new(viewport);
        let stats = cloud.frame(1_000.0, &mut canvas);

        assert_eq!(stats.particles, 200);
        assert!(stats.links > 0);
        // Tetrahedron + octahedron + cube.
        assert_eq!(stats.satellite_edges, 6 + 12 + 12);
        assert!(canvas.painted_pixels() > 0);
    }

    #[test]
    fn test_last_points_sorted() {
        let viewport = Viewport::default();
        let mut cloud = cloud(viewport);
        let mut canvas = Canvas::new(viewport);
        cloud.frame(12_345.0, &mut canvas);
        let pts = cloud.last_points();
        assert!(pts.windows(2).all(|w| w[0].depth <= w[1].depth));
    }

    #[test]
    fn test_empty_viewport_is_noop() {
        let viewport = Viewport::new(0.0, 0.0, 1.0);
        let mut cloud = cloud(viewport);
        let mut canvas = Canvas::new(viewport);
        assert_eq!(cloud.frame(0.0, &mut canvas), FrameStats::default());
    }

    #[test]
    fn test_resize_updates_surface() {
        let mut cloud = cloud(Viewport::new(100.0, 100.0, 1.0));
        let mut canvas = Canvas::new(cloud.viewport());
        cloud.resize(Viewport::new(200.0, 80.0, 2.0), &mut canvas);
        assert_eq!((canvas.width(), canvas.height()), (400, 160));
        assert_eq!(cloud.viewport().width, 200.0);
    }
}
