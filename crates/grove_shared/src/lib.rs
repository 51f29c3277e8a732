//! # Grove Shared
//!
//! Common types used by the generators, the renderers and the UI effects.
//!
//! ## Rule
//!
//! This crate must never depend on a drawing backend. If you need a
//! surface, put it in `grove_rendering`.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod color;
pub mod math;
pub mod seed;

pub use color::{palette, Rgb, Rgba, Rgba8};
pub use math::{clamp01, Rect, Vec2, Vec3};
pub use seed::GroveSeed;
