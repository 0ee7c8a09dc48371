//! # neurofield - Neuron Field Simulator
//!
//! Procedural "neuron network" background field: drifting nodes, synapses
//! between nearby nodes and signal pulses hopping along them.
//!
//! The crate is the simulation only. Each frame it fills flat `f32` buffers
//! that a rendering host uploads as vertex attributes; colour, glow and
//! blending are the host's business.
//!
//! ## Quick Start
//!
//! ```ignore
//! use neurofield::prelude::*;
//!
//! let mut field = NeuronField::with_seed(FieldConfig::default(), 42)?;
//! let mut clock = Clock::real_time();
//!
//! loop {
//!     let frame = field.tick(&mut clock);
//!     host.upload("position", frame.bytes(Buffer::NodePositions));
//!     host.upload("synapses", frame.bytes(Buffer::SynapsePositions));
//!     host.draw_lines(frame.connection_count() * 2);
//! }
//! ```
//!
//! ## Frame pipeline
//!
//! Stages run once per frame in a fixed order:
//!
//! | Stage | Module | Reads | Produces |
//! |-------|--------|-------|----------|
//! | Particle field | [`particle`] | elapsed time | node positions |
//! | Proximity connector | [`connector`] | node positions | synapses with opacity |
//! | Signal pulses | [`pulse`] | node positions | pulse positions and alpha |
//!
//! Nothing persists between frames except the node pool (fixed at creation)
//! and the pulse pool (reused slots).
//!
//! ## Determinism
//!
//! All randomness flows through one injectable [`rand::Rng`]. Seed it with
//! [`NeuronField::with_seed`] to get identical runs.

pub mod appearance;
pub mod config;
pub mod connector;
mod error;
mod field;
pub mod frame;
pub mod particle;
pub mod pulse;
pub mod snapshot;
pub mod time;
pub mod transform;

pub use appearance::NodeAppearance;
pub use config::{
    DriftConfig, FieldConfig, HubConfig, PointerConfig, PulseConfig, RotationConfig, SampleRange,
};
pub use connector::Connection;
pub use error::{ConfigError, SnapshotError};
pub use field::{NeuronField, Viewport};
pub use frame::{Buffer, Frame};
pub use glam::{Vec2, Vec3};
pub use particle::{Particle, SizeClass};
pub use pulse::{Pulse, PulsePool};
pub use snapshot::SnapshotOptions;
pub use time::Clock;
pub use transform::FieldTransform;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use neurofield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::FieldConfig;
    pub use crate::error::ConfigError;
    pub use crate::field::NeuronField;
    pub use crate::frame::{Buffer, Frame};
    pub use crate::time::Clock;
    pub use crate::transform::FieldTransform;
    pub use crate::{Vec2, Vec3};
}
