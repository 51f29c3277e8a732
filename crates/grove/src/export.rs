//! PNG and SVG output for the CLI.

use std::path::Path;

use grove_rendering::Canvas;
use image::RgbaImage;
use tracing::debug;

use crate::error::{GroveError, GroveResult};

/// Copies a rendered canvas into an owned RGBA image.
#[must_use]
pub fn to_image(canvas: &Canvas) -> Option<RgbaImage> {
    RgbaImage::from_raw(canvas.width(), canvas.height(), canvas.as_bytes().to_vec())
}

/// Writes a canvas as PNG.
///
/// # Errors
///
/// `Image` when encoding or writing fails, `InvalidConfig` for a canvas
/// with no pixels.
pub fn save_png(canvas: &Canvas, path: impl AsRef<Path>) -> GroveResult<()> {
    let path = path.as_ref();
    let image = to_image(canvas)
        .filter(|img| img.width() > 0 && img.height() > 0)
        .ok_or_else(|| GroveError::InvalidConfig("cannot export an empty canvas".to_owned()))?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    debug!(
        path = %path.display(),
        width = canvas.width(),
        height = canvas.height(),
        "PNG written"
    );
    Ok(())
}

/// Writes an SVG document.
///
/// # Errors
///
/// `Io` when the file cannot be written.
pub fn save_svg(svg: &str, path: impl AsRef<Path>) -> GroveResult<()> {
    let path = path.as_ref();
    std::fs::write(path, svg).map_err(|e| GroveError::io(path, e))?;
    debug!(path = %path.display(), bytes = svg.len(), "SVG written");
    Ok(())
}
