//! # Grove Procedural Generation
//!
//! Everything the decorations need is generated here, once, at page load.
//!
//! ## Design Principles
//!
//! 1. **One-shot**: nothing in this crate runs per frame
//! 2. **Exact counts**: generators return exactly what was asked for
//! 3. **Reproducible**: the marginalia is a pure function of its seed; the
//!    other generators take the caller's rng, so a seeded rng repeats
//!
//! ## Core Components
//!
//! - `generate_brain`: geometric or SDF-shell particle cloud
//! - `generate_satellites`: wireframe polyhedra on inclined orbits
//! - `generate_stars`: drifting constellation nodes
//! - `Marginalia`: seeded corner vines, motifs and filaments
//!
//! ## Example
//!
//! ```rust,ignore
//! use grove_procedural::{generate_brain, BrainSettings, Marginalia, MarginaliaSettings};
//! use grove_shared::GroveSeed;
//!
//! let cloud = generate_brain(&BrainSettings::default(), &mut rand::thread_rng())?;
//! assert_eq!(cloud.len(), 200);
//!
//! let border = Marginalia::grow(GroveSeed::new(7), 1280.0, 800.0, &MarginaliaSettings::default())?;
//! ```

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod brain;
pub mod constellation;
pub mod error;
pub mod marginalia;
pub mod particle;
pub mod satellite;
pub mod sdf;

pub use brain::{generate_brain, geometric_brain, BrainSettings, BrainShape};
pub use constellation::{generate_stars, ConstellationSettings, Star};
pub use error::{ProceduralError, ProceduralResult};
pub use marginalia::{
    Branch, Corner, CornerGrowth, Filament, Marginalia, MarginaliaSettings, Motif, MotifKind,
    Segment, MAX_DEPTH_LIMIT,
};
pub use particle::{Particle, ParticleTraits};
pub use satellite::{generate_satellites, Polyhedron, Satellite, SatelliteSettings, Wireframe};
pub use sdf::{smooth_min, BlendedEllipsoids, Ellipsoid, Sdf, ShellSampler};
