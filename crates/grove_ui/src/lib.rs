//! # Grove UI Effects
//!
//! Small page effects that only toggle classes, attributes and inline
//! styles; the stylesheet does the rest.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ host events  │──►│ effect state     │──►│ DomCommand   │──► host page
//! │ time, bounds │   │ reveal/accordion │   │ buffer       │
//! └──────────────┘   │ glitch           │   └──────────────┘
//!                    └──────────────────┘
//! ```
//!
//! ## Effects
//!
//! - `RevealObserver`: `.fade-in` gets `visible` once 15% on screen
//! - `Accordion`: `is-open` + `aria-expanded`, eased panel height
//! - `GlitchEffect`: seeded bursts, pure in `(seed, t)`

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod accordion;
pub mod animation;
pub mod dom;
pub mod glitch;
pub mod reveal;

pub use accordion::{Accordion, AccordionParts, AccordionSettings};
pub use animation::{Animation, Easing};
pub use dom::{class, CommandBuffer, DomCommand, ElementId};
pub use glitch::{GlitchEffect, GlitchSettings, GlitchState, Slice};
pub use reveal::{RevealObserver, RevealSettings};
