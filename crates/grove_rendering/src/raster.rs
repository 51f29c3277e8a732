//! # Software Raster Canvas
//!
//! CPU implementation of [`Surface`] used by the CLI and the tests.
//! Pixels are straight-alpha RGBA8 and every primitive composites with
//! source-over, so a frame saved from here looks like the browser canvas.

use grove_shared::{Rgb, Rgba, Rgba8, Vec2};

use crate::sprite::GlowSprite;
use crate::surface::{Surface, Viewport};

/// An RGBA8 framebuffer in device pixels.
#[derive(Debug, Clone)]
pub struct Canvas {
    viewport: Viewport,
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl Canvas {
    /// Allocates a transparent canvas for `viewport`.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        let (width, height) = viewport.backing_size();
        Self {
            viewport,
            width,
            height,
            pixels: vec![Rgba8::CLEAR; (width as usize) * (height as usize)],
        }
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Backing width in device pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Backing height in device pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at device coordinates, if in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Raw RGBA bytes, row-major, ready for a PNG encoder or `ImageData`.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Number of pixels with any coverage.
    #[must_use]
    pub fn painted_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p.a > 0).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    fn scale(&self) -> f32 {
        self.viewport.device_pixel_ratio
    }

    /// Source-over composite of one straight-alpha sample.
    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if alpha <= 0.0
            || x < 0
            || y < 0
            || x >= i64::from(self.width)
            || y >= i64::from(self.height)
        {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        let dst = self.pixels[idx];

        let sa = alpha.min(1.0);
        let da = f32::from(dst.a) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| {
            let v = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        self.pixels[idx] = Rgba8 {
            r: mix(color.r, dst.r),
            g: mix(color.g, dst.g),
            b: mix(color.b, dst.b),
            a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        };
    }

    /// Device-pixel bounding box of a CSS-space circle, clipped to the canvas.
    fn pixel_box(&self, center: Vec2, radius: f32) -> Option<(i64, i64, i64, i64)> {
        let k = self.scale();
        let x0 = ((center.x - radius) * k).floor() as i64;
        let y0 = ((center.y - radius) * k).floor() as i64;
        let x1 = ((center.x + radius) * k).ceil() as i64;
        let y1 = ((center.y + radius) * k).ceil() as i64;
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(i64::from(self.width) - 1);
        let y1 = y1.min(i64::from(self.height) - 1);
        (x1 >= x0 && y1 >= y0).then_some((x0, y0, x1, y1))
    }
}

impl Surface for Canvas {
    fn resize(&mut self, viewport: Viewport) {
        *self = Self::new(viewport);
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba8::CLEAR);
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.pixel_box(center, radius) else {
            return;
        };
        let k = self.scale();
        for py in y0..=y1 {
            for px in x0..=x1 {
                let cx = (px as f32 + 0.5) / k;
                let cy = (py as f32 + 0.5) / k;
                let t = Vec2::new(cx, cy).distance(center) / radius;
                if t > 1.0 {
                    continue;
                }
                let lerp = |a: u8, b: u8| {
                    (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8
                };
                let color = Rgb::new(
                    lerp(inner.rgb.r, outer.rgb.r),
                    lerp(inner.rgb.g, outer.rgb.g),
                    lerp(inner.rgb.b, outer.rgb.b),
                );
                let alpha = inner.alpha + (outer.alpha - inner.alpha) * t;
                self.blend(px, py, color, alpha);
            }
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        if color.alpha <= 0.0 || width <= 0.0 {
            return;
        }
        let k = self.scale();
        let (ax, ay) = (from.x * k, from.y * k);
        let (bx, by) = (to.x * k, to.y * k);
        let steps = (bx - ax).abs().max((by - ay).abs()).ceil().max(1.0) as usize;

        // Hairlines fade instead of thinning below one device pixel.
        let stroke = width * k;
        let coverage = stroke.min(1.0);
        let half = ((stroke - 1.0) * 0.5).max(0.0).round() as i64;
        let alpha = color.alpha * coverage;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (ax + (bx - ax) * t).floor() as i64;
            let y = (ay + (by - ay) * t).floor() as i64;
            for oy in -half..=half {
                for ox in -half..=half {
                    self.blend(x + ox, y + oy, color.rgb, alpha);
                }
            }
        }
    }

    fn sprite(&mut self, sprite: &GlowSprite, center: Vec2, size: f32, alpha: f32) {
        if alpha <= 0.0 || size <= 0.0 {
            return;
        }
        let half = size * 0.5;
        let Some((x0, y0, x1, y1)) = self.pixel_box(center, half) else {
            return;
        };
        let k = self.scale();
        let tile = sprite.size() as f32;
        let color = sprite.color();
        for py in y0..=y1 {
            for px in x0..=x1 {
                // Nearest texel under this device pixel's centre.
                let u = ((px as f32 + 0.5) / k - (center.x - half)) / size;
                let v = ((py as f32 + 0.5) / k - (center.y - half)) / size;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                let texel = sprite.texel((u * tile) as u32, (v * tile) as u32);
                if texel.a == 0 {
                    continue;
                }
                self.blend(px, py, color, alpha * f32::from(texel.a) / 255.0);
            }
        }
    }

    fn disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if radius <= 0.0 || color.alpha <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.pixel_box(center, radius + 1.0) else {
            return;
        };
        let k = self.scale();
        let r = radius * k;
        let (cx, cy) = (center.x * k, center.y * k);
        for py in y0..=y1 {
            for px in x0..=x1 {
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5).distance(Vec2::new(cx, cy));
                // One-pixel soft edge.
                let cover = (r - d + 0.5).clamp(0.0, 1.0);
                self.blend(px, py, color.rgb, color.alpha * cover);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_shared::palette;

    fn canvas(w: f32, h: f32, dpr: f32) -> Canvas {
        Canvas::new(Viewport::new(w, h, dpr))
    }

    #[test]
    fn test_backing_store_follows_dpr() {
        let c = canvas(100.0, 50.0, 2.0);
        assert_eq!((c.width(), c.height()), (200, 100));
        assert_eq!(c.as_bytes().len(), 200 * 100 * 4);
    }

    #[test]
    fn test_source_over() {
        let mut c = canvas(4.0, 4.0, 1.0);
        c.blend(1, 1, Rgb::new(255, 0, 0), 1.0);
        c.blend(1, 1, Rgb::new(0, 0, 255), 0.5);
        let p = c.pixel(1, 1).unwrap();
        assert_eq!(p.a, 255);
        assert!((i32::from(p.r) - 128).abs() <= 1);
        assert!((i32::from(p.b) - 128).abs() <= 1);
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut c = canvas(4.0, 4.0, 1.0);
        c.blend(-1, 0, Rgb::new(1, 1, 1), 1.0);
        c.blend(9, 9, Rgb::new(1, 1, 1), 1.0);
        assert_eq!(c.painted_pixels(), 0);
        assert!(c.pixel(4, 0).is_none());
    }

    #[test]
    fn test_line_covers_endpoints() {
        let mut c = canvas(20.0, 20.0, 1.0);
        c.line(Vec2::new(2.0, 2.0), Vec2::new(17.0, 9.0), 1.0, palette::LINK.with_alpha(1.0));
        assert!(c.pixel(2, 2).unwrap().a > 0);
        assert!(c.pixel(17, 9).unwrap().a > 0);
        assert!(c.painted_pixels() >= 15);
    }

    #[test]
    fn test_sprite_stamp_centred() {
        let mut c = canvas(40.0, 40.0, 1.0);
        let sprite = GlowSprite::new(32, palette::OLIVE);
        c.sprite(&sprite, Vec2::new(20.0, 20.0), 16.0, 1.0);
        let centre = c.pixel(20, 20).unwrap();
        assert!(centre.a > 150);
        assert_eq!(c.pixel(2, 2).unwrap().a, 0);
    }

    #[test]
    fn test_glow_fades_outward() {
        let mut c = canvas(100.0, 100.0, 1.0);
        c.radial_glow(
            Vec2::new(50.0, 50.0),
            40.0,
            palette::GLOW.with_alpha(0.5),
            Rgba::TRANSPARENT,
        );
        let inner = c.pixel(50, 50).unwrap().a;
        let outer = c.pixel(85, 50).unwrap().a;
        assert!(inner > outer);
        assert_eq!(c.pixel(0, 0).unwrap().a, 0);
    }

    #[test]
    fn test_resize_and_clear() {
        let mut c = canvas(10.0, 10.0, 1.0);
        c.disc(Vec2::new(5.0, 5.0), 3.0, palette::STAR.with_alpha(1.0));
        assert!(c.painted_pixels() > 0);
        c.clear();
        assert_eq!(c.painted_pixels(), 0);
        c.resize(Viewport::new(30.0, 10.0, 1.0));
        assert_eq!(c.width(), 30);
    }
}
