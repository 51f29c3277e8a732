//! # GROVE
//!
//! Decorative animations for The Grove, wired to a page.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                             GROVE                                 │
//! ├───────────────────────────────────────────────────────────────────┤
//! │                                                                   │
//! │  GroveConfig ──► Grove::init ──► grove_procedural (once)          │
//! │   (TOML)              │                                           │
//! │                       ▼                                           │
//! │                 Grove::frame(t) ──► grove_rendering ──► Surface   │
//! │                       │                                           │
//! │                       └──────────► grove_ui ──► DomCommand        │
//! │                                                     │             │
//! │                 HostPage ◄──────────────────────────┘             │
//! │                 ├─ MemoryPage   (tests, CLI)                      │
//! │                 └─ WebPage      (wasm32, requestAnimationFrame)   │
//! │                                                                   │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration with per-section defaults
//! - `page`: the `HostPage` trait and the in-memory page
//! - `app`: `Grove`, which attaches and runs the effects
//! - `export`: PNG and SVG files for the CLI

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod page;

#[cfg(target_arch = "wasm32")]
mod web;

pub use grove_procedural as procedural;
pub use grove_rendering as rendering;
pub use grove_shared as shared;
pub use grove_ui as ui;

pub use app::{FrameReport, Grove};
pub use config::{CloudConfig, ConstellationConfig, GroveConfig, MarginaliaConfig};
pub use error::{GroveError, GroveResult};
pub use export::{save_png, save_svg, to_image};
pub use page::{selector, Capabilities, HostPage, MemoryElement, MemoryPage};

#[cfg(target_arch = "wasm32")]
pub use web::start;
