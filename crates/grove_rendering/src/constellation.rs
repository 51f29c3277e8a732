//! Constellation drawing.
//!
//! Stars come from `grove_procedural` in normalized page coordinates; this
//! module scales them to the viewport, links neighbours with the same
//! quadratic pass the cloud uses, and draws them as small discs.

use grove_procedural::Star;
use grove_shared::{palette, Vec2};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::links::{proximity_links, Link, LinkStyle, Linkable};
use crate::surface::{Surface, Viewport};

/// Look of the constellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstellationStyle {
    /// Link distance in CSS pixels.
    pub link_distance: f32,
    /// Link opacity at zero distance, times the dimmer endpoint.
    pub link_strength: f32,
    /// Links at or below this opacity are skipped.
    pub link_alpha_min: f32,
    /// Link stroke width.
    pub link_width: f32,
}

impl Default for ConstellationStyle {
    fn default() -> Self {
        Self {
            link_distance: 140.0,
            link_strength: 0.35,
            link_alpha_min: 0.01,
            link_width: 0.5,
        }
    }
}

/// A star placed on screen for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarPoint {
    /// Screen position (CSS px).
    pub screen: Vec2,
    /// Opacity.
    pub alpha: f32,
    /// Disc radius.
    pub radius: f32,
}

impl Linkable for StarPoint {
    fn position(&self) -> Vec2 {
        self.screen
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }
}

/// What one constellation frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstellationStats {
    /// Stars drawn.
    pub stars: usize,
    /// Links drawn.
    pub links: usize,
}

/// The animated constellation.
#[derive(Debug, Clone)]
pub struct ConstellationView {
    stars: Vec<Star>,
    style: ConstellationStyle,
    viewport: Viewport,
    points: Vec<StarPoint>,
    links: Vec<Link>,
}

impl ConstellationView {
    /// Creates a view over `stars`.
    #[must_use]
    pub fn new(stars: Vec<Star>, style: ConstellationStyle, viewport: Viewport) -> Self {
        let capacity = stars.len();
        Self {
            stars,
            style,
            viewport,
            points: Vec::with_capacity(capacity),
            links: Vec::new(),
        }
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Adopts a new viewport and resizes `surface` to match.
    pub fn resize<S: Surface + ?Sized>(&mut self, viewport: Viewport, surface: &mut S) {
        self.viewport = viewport;
        surface.resize(viewport);
    }

    /// Star positions at time `t` (ms), in CSS pixels.
    pub fn place(&mut self, t: f64) -> &[StarPoint] {
        let (w, h) = (self.viewport.width, self.viewport.height);
        self.points.clear();
        self.points.extend(self.stars.iter().map(|star| {
            let p = star.position(t);
            StarPoint {
                screen: Vec2::new(p.x * w, p.y * h),
                alpha: star.opacity(t),
                radius: star.radius,
            }
        }));
        &self.points
    }

    /// Renders the frame at time `t` onto `surface`.
    pub fn frame<S: Surface + ?Sized>(&mut self, t: f64, surface: &mut S) -> ConstellationStats {
        surface.clear();
        if self.viewport.is_empty() {
            return ConstellationStats::default();
        }
        self.place(t);

        let style = LinkStyle {
            threshold: self.style.link_distance,
            strength: self.style.link_strength,
            alpha_min: self.style.link_alpha_min,
        };
        proximity_links(&self.points, &style, &mut self.links);

        for link in &self.links {
            surface.line(
                self.points[link.a].screen,
                self.points[link.b].screen,
                self.style.link_width,
                palette::BRASS.with_alpha(link.alpha),
            );
        }
        for star in &self.points {
            surface.disc(star.screen, star.radius, palette::STAR.with_alpha(star.alpha));
        }

        let stats = ConstellationStats {
            stars: self.points.len(),
            links: self.links.len(),
        };
        trace!(t, stars = stats.stars, links = stats.links, "Constellation frame");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Canvas;
    use grove_procedural::{generate_stars, ConstellationSettings};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn view(viewport: Viewport) -> ConstellationView {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let stars = generate_stars(&ConstellationSettings::default(), &mut rng);
        ConstellationView::new(stars, ConstellationStyle::default(), viewport)
    }

    #[test]
    fn test_stars_stay_on_page() {
        let viewport = Viewport::new(640.0, 480.0, 1.0);
        let mut v = view(viewport);
        for t in [0.0, 60_000.0, 3.6e6] {
            for p in v.place(t) {
                assert!(p.screen.x >= 0.0 && p.screen.x < 640.0);
                assert!(p.screen.y >= 0.0 && p.screen.y < 480.0);
            }
        }
    }

    #[test]
    fn test_frame_draws_stars() {
        let viewport = Viewport::new(640.0, 480.0, 1.0);
        let mut v = view(viewport);
        let mut canvas = Canvas::new(viewport);
        let stats = v.frame(2_000.0, &mut canvas);
        assert_eq!(stats.stars, 48);
        assert!(canvas.painted_pixels() > 0);
    }

    #[test]
    fn test_frame_is_pure_in_time() {
        let viewport = Viewport::new(300.0, 200.0, 1.0);
        let mut a = view(viewport);
        let mut b = view(viewport);
        a.place(1.0e6);
        b.place(5.0);
        assert_eq!(a.place(777.0).to_vec(), b.place(777.0).to_vec());
    }
}
