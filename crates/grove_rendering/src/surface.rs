//! Drawing surfaces.
//!
//! Effects draw in CSS pixels through [`Surface`]; each backend maps that
//! onto its own pixel grid (browser canvas, software raster, ...).

use grove_shared::{Rgba, Vec2};
use serde::{Deserialize, Serialize};

use crate::sprite::GlowSprite;

/// Size of a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f32,
    /// Height in CSS pixels.
    pub height: f32,
    /// Backing pixels per CSS pixel.
    pub device_pixel_ratio: f32,
}

impl Viewport {
    /// Creates a viewport; a non-positive or NaN ratio falls back to 1.
    #[must_use]
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let dpr = if device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            device_pixel_ratio: dpr,
        }
    }

    /// Backing store size in device pixels.
    #[must_use]
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.device_pixel_ratio).round() as u32,
            (self.height * self.device_pixel_ratio).round() as u32,
        )
    }

    /// Centre in CSS pixels.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// True when there is nothing to draw on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0, 1.0)
    }
}

/// Something the effects can draw on.
///
/// All coordinates are CSS pixels; alpha is straight (not premultiplied).
pub trait Surface {
    /// Reallocates the backing store for a new viewport.
    fn resize(&mut self, viewport: Viewport);

    /// Clears to fully transparent.
    fn clear(&mut self);

    /// Filled disc whose colour fades from `inner` at the centre to `outer`
    /// at `radius`.
    fn radial_glow(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba);

    /// Straight stroke.
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);

    /// Stamps `sprite` centred on `center`, `size` pixels across, at `alpha`.
    fn sprite(&mut self, sprite: &GlowSprite, center: Vec2, size: f32, alpha: f32);

    /// Filled disc.
    fn disc(&mut self, center: Vec2, radius: f32, color: Rgba);
}
