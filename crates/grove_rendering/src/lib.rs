//! # Grove Rendering
//!
//! Per-frame work for the canvas effects, and SVG output for the
//! marginalia.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ grove_procedural │────►│  transform/sort  │────►│  Surface trait   │
//! │ (static arrays)  │     │  + links (O(n²)) │     │ canvas / raster  │
//! └──────────────────┘     └──────────────────┘     └──────────────────┘
//! ```
//!
//! A frame never mutates the generated data. Scratch buffers for projected
//! points and links are owned by the effect and reused between frames.
//!
//! ## Core Components
//!
//! - `PointCloud`: brain cloud with satellites and ambient glow
//! - `ConstellationView`: drifting star graph
//! - `Canvas`: software `Surface` for the CLI and tests
//! - `render_svg`: marginalia as a self-animating SVG
//! - `ResizeDebouncer`: 200 ms trailing-edge resize handling

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cloud;
pub mod constellation;
pub mod links;
pub mod projection;
pub mod raster;
pub mod resize;
pub mod sprite;
pub mod surface;
pub mod svg;

pub use cloud::{FrameStats, PointCloud};
pub use constellation::{ConstellationStats, ConstellationStyle, ConstellationView, StarPoint};
pub use links::{proximity_links, Link, LinkStyle, Linkable};
pub use projection::{
    depth_alpha, depth_sort, transform_particles, CameraPose, CloudSettings, ProjectedPoint,
    Projector,
};
pub use raster::Canvas;
pub use resize::{ResizeDebouncer, DEFAULT_RESIZE_DELAY_MS};
pub use sprite::{GlowSprite, GradientStop, GLOW_STOPS};
pub use surface::{Surface, Viewport};
pub use svg::{render_svg, write_svg, RevealTiming, SvgStyle};
