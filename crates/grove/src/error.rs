//! # Grove Error Types
//!
//! Only the edges can fail: reading and validating configuration, the
//! one-shot generators, and writing files. Running effects never error.

use std::path::PathBuf;

use grove_procedural::ProceduralError;
use thiserror::Error;

/// Errors surfaced by configuration, generation and export.
#[derive(Error, Debug)]
pub enum GroveError {
    /// Reading or writing a file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for `GroveConfig`.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration could not be written as TOML.
    #[error("configuration serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The configuration parsed but a value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A generator rejected its input or ran out of attempts.
    #[error("generation failed: {0}")]
    Procedural(#[from] ProceduralError),

    /// Encoding an image failed.
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}

impl GroveError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for this crate.
pub type GroveResult<T> = Result<T, GroveError>;
