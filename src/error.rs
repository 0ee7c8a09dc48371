//! Error types for neurofield.
//!
//! The simulator itself never fails once running. Errors only surface when a
//! configuration is loaded or validated, and when a preview snapshot is written.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a [`FieldConfig`](crate::FieldConfig).
///
/// Validation happens once, when the simulator is initialized. A frame never
/// re-checks its inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The field needs at least one particle.
    #[error("Particle count must be at least 1")]
    NoParticles,
    /// Connection cap of zero would never draw a synapse.
    #[error("Max connections must be at least 1")]
    NoConnections,
    /// The connector needs a positive origin sample target.
    #[error("Connection sample target must be at least 1")]
    NoSampleTarget,
    /// A distance, radius or speed that must be finite and strictly positive.
    #[error("{name} must be finite and > 0, got {value}")]
    NotPositive {
        /// Name of the offending setting.
        name: &'static str,
        /// Value that was rejected.
        value: f32,
    },
    /// A probability outside `[0, 1]`.
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability {
        /// Name of the offending setting.
        name: &'static str,
        /// Value that was rejected.
        value: f32,
    },
    /// A sampling range whose lower bound is not below its upper bound.
    #[error("{name} range is empty: [{min}, {max})")]
    EmptyRange {
        /// Name of the offending range.
        name: &'static str,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
    /// Failed to read or write a config file.
    #[error("Failed to access config file '{path}': {source}")]
    Io {
        /// File that could not be accessed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Config JSON could not be parsed or produced.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while writing a preview snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Image dimensions must be non-zero.
    #[error("Snapshot size must be non-zero, got {width}x{height}")]
    EmptyImage {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// Image would exceed the snapshot pixel budget.
    #[error("Snapshot size {width}x{height} exceeds the pixel limit")]
    TooLarge {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// Failed to encode or save the image.
    #[error("Failed to write snapshot: {0}")]
    Image(#[from] image::ImageError),
}
