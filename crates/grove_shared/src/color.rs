//! Colours and the site palette.
//!
//! Colours travel as 8-bit RGB plus a float alpha, the same split the
//! browser's `rgba()` syntax uses.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::math::clamp01;

/// Opaque 8-bit colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a new colour.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Attaches an alpha value (clamped into `[0, 1]`).
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            rgb: self,
            alpha: clamp01(alpha),
        }
    }

    /// Channels as floats in `[0, 1]`.
    #[must_use]
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// `#rrggbb` form used in SVG attributes.
    #[must_use]
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colour with a fractional alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Colour channels.
    pub rgb: Rgb,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        rgb: Rgb::new(0, 0, 0),
        alpha: 0.0,
    };
}

impl fmt::Display for Rgba {
    /// CSS `rgba()` form with three decimals of alpha.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({},{},{},{:.3})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.alpha
        )
    }
}

/// A stored pixel: straight (non-premultiplied) 8-bit RGBA.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent pixel.
    pub const CLEAR: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };
}

/// The Grove's colours.
pub mod palette {
    use super::Rgb;

    /// Particle sprite colour.
    pub const OLIVE: Rgb = Rgb::new(82, 96, 56);
    /// Accent particle sprite colour.
    pub const GOLD: Rgb = Rgb::new(140, 118, 62);
    /// Neural link colour.
    pub const LINK: Rgb = Rgb::new(90, 88, 48);
    /// Ambient glow behind the cloud.
    pub const GLOW: Rgb = Rgb::new(110, 100, 50);
    /// Satellite wireframes.
    pub const BRASS: Rgb = Rgb::new(120, 108, 66);
    /// Marginalia vines.
    pub const VINE: Rgb = Rgb::new(74, 84, 52);
    /// Marginalia motifs.
    pub const OCHRE: Rgb = Rgb::new(150, 124, 70);
    /// Constellation stars and links.
    pub const STAR: Rgb = Rgb::new(168, 156, 112);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_format() {
        let c = palette::LINK.with_alpha(0.0425);
        assert_eq!(c.to_string(), "rgba(90,88,48,0.043)");
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(palette::GOLD.with_alpha(1.7).alpha, 1.0);
        assert_eq!(palette::GOLD.with_alpha(-0.2).alpha, 0.0);
    }

    #[test]
    fn test_hex() {
        assert_eq!(palette::OLIVE.hex(), "#526038");
    }

    #[test]
    fn test_pixel_is_four_bytes() {
        let px = [Rgba8::CLEAR; 3];
        let bytes: &[u8] = bytemuck::cast_slice(&px);
        assert_eq!(bytes.len(), 12);
    }
}
