//! Soft-glow sprites.
//!
//! A radial-gradient disc rendered once into a small RGBA tile, then stamped
//! per particle. Much cheaper than evaluating a gradient per particle per
//! frame.

use grove_shared::{Rgb, Rgba8};

/// One stop of the glow gradient: alpha at a normalized radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Distance from the centre, 0 (centre) to 1 (edge).
    pub offset: f32,
    /// Alpha at that distance.
    pub alpha: f32,
}

/// Default glow falloff.
pub const GLOW_STOPS: [GradientStop; 4] = [
    GradientStop { offset: 0.0, alpha: 1.0 },
    GradientStop { offset: 0.2, alpha: 0.5 },
    GradientStop { offset: 0.5, alpha: 0.12 },
    GradientStop { offset: 1.0, alpha: 0.0 },
];

/// Pre-rendered glow tile.
#[derive(Debug, Clone, PartialEq)]
pub struct GlowSprite {
    size: u32,
    color: Rgb,
    pixels: Vec<Rgba8>,
}

impl GlowSprite {
    /// Renders a `size`×`size` glow in `color` with the default falloff.
    #[must_use]
    pub fn new(size: u32, color: Rgb) -> Self {
        Self::with_stops(size, color, &GLOW_STOPS)
    }

    /// Renders a glow with custom stops (sorted by offset).
    #[must_use]
    pub fn with_stops(size: u32, color: Rgb, stops: &[GradientStop]) -> Self {
        let size = size.max(1);
        let half = size as f32 / 2.0;
        let mut pixels = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                // Sample at pixel centres.
                let dx = x as f32 + 0.5 - half;
                let dy = y as f32 + 0.5 - half;
                let r = (dx * dx + dy * dy).sqrt() / half;
                let alpha = gradient_alpha(stops, r);
                pixels.push(Rgba8 {
                    r: color.r,
                    g: color.g,
                    b: color.b,
                    a: (alpha * 255.0).round() as u8,
                });
            }
        }
        Self { size, color, pixels }
    }

    /// Edge length in pixels.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Tint colour.
    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Pixel at (`x`, `y`), clamped to the tile.
    #[must_use]
    pub fn texel(&self, x: u32, y: u32) -> Rgba8 {
        let x = x.min(self.size - 1);
        let y = y.min(self.size - 1);
        self.pixels[(y * self.size + x) as usize]
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Piecewise-linear alpha along the stops; zero past the last stop.
fn gradient_alpha(stops: &[GradientStop], r: f32) -> f32 {
    let Some(first) = stops.first() else {
        return 0.0;
    };
    if r <= first.offset {
        return first.alpha;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if r <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            let t = (r - a.offset) / span;
            return a.alpha + (b.alpha - a.alpha) * t;
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_shared::palette;

    #[test]
    fn test_centre_bright_edge_clear() {
        let sprite = GlowSprite::new(32, palette::OLIVE);
        let centre = sprite.texel(16, 16);
        let corner = sprite.texel(0, 0);
        assert!(centre.a > 200, "centre alpha {}", centre.a);
        assert_eq!(corner.a, 0);
        assert_eq!(centre.r, palette::OLIVE.r);
    }

    #[test]
    fn test_gradient_interpolates() {
        assert!((gradient_alpha(&GLOW_STOPS, 0.1) - 0.75).abs() < 1e-6);
        assert!((gradient_alpha(&GLOW_STOPS, 0.35) - 0.31).abs() < 1e-6);
        assert_eq!(gradient_alpha(&GLOW_STOPS, 1.5), 0.0);
    }

    #[test]
    fn test_byte_view() {
        let sprite = GlowSprite::new(8, palette::GOLD);
        assert_eq!(sprite.as_bytes().len(), 8 * 8 * 4);
    }
}
