//! Proximity links.
//!
//! Every pair of points closer than a threshold gets a faint line. This is a
//! plain O(n²) pass over a point set that is fixed at load and a few hundred
//! long; a spatial index would cost more than it saves.

use grove_shared::Vec2;

use crate::projection::ProjectedPoint;

/// Anything that can be linked: a screen position and an opacity.
pub trait Linkable {
    /// Screen position (CSS px).
    fn position(&self) -> Vec2;
    /// Opacity in `[0, 1]`.
    fn alpha(&self) -> f32;
}

impl Linkable for ProjectedPoint {
    fn position(&self) -> Vec2 {
        self.screen
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }
}

/// Link opacity rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkStyle {
    /// Pairs at or beyond this distance are not linked.
    pub threshold: f32,
    /// Opacity at zero distance, before the endpoint factor.
    pub strength: f32,
    /// Links at or below this opacity are dropped.
    pub alpha_min: f32,
}

impl LinkStyle {
    /// Opacity of a link of length `d` between endpoints of opacity `a` and `b`.
    #[inline]
    #[must_use]
    pub fn alpha(&self, d: f32, a: f32, b: f32) -> f32 {
        (1.0 - d / self.threshold) * self.strength * a.min(b)
    }
}

/// A line between two points, by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// First endpoint.
    pub a: usize,
    /// Second endpoint, always greater than `a`.
    pub b: usize,
    /// Line opacity.
    pub alpha: f32,
}

/// Collects every visible link among `points` into `out` (cleared first).
pub fn proximity_links<P: Linkable>(points: &[P], style: &LinkStyle, out: &mut Vec<Link>) {
    out.clear();
    if style.threshold <= 0.0 {
        return;
    }
    let threshold2 = style.threshold * style.threshold;

    for (i, pi) in points.iter().enumerate() {
        let a = pi.position();
        for (j, pj) in points.iter().enumerate().skip(i + 1) {
            let d2 = a.distance_squared(pj.position());
            if d2 >= threshold2 {
                continue;
            }
            let alpha = style.alpha(d2.sqrt(), pi.alpha(), pj.alpha());
            if alpha > style.alpha_min {
                out.push(Link { a: i, b: j, alpha });
            }
        }
    }
}
