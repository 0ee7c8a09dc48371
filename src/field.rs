//! The neuron field simulator.
//!
//! [`NeuronField`] owns the node pool, the pulse pool, the configuration and
//! the random source. Each call to [`advance`](NeuronField::advance) runs the
//! three stages in a fixed order, because each consumes the current-frame
//! output of the one before:
//!
//! 1. node positions from the elapsed time
//! 2. synapses from those positions
//! 3. pulses over the same positions
//!
//! and then writes the results into the frame buffers.
//!
//! # Example
//!
//! ```ignore
//! let mut field = NeuronField::with_seed(FieldConfig::default(), 42)?;
//! let frame = field.advance(0.016);
//! upload(frame.bytes(Buffer::NodePositions));
//! ```

use crate::appearance::NodeAppearance;
use crate::config::FieldConfig;
use crate::connector::{self, Connection};
use crate::error::ConfigError;
use crate::frame::Frame;
use crate::particle::{self, Particle};
use crate::pulse::{Pulse, PulsePool};
use crate::time::Clock;
use crate::transform::FieldTransform;
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// Visible extent of the field plane at z = 0, in world units.
///
/// Only used to map the host's normalised cursor into world space. Resizing
/// never touches the simulation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Procedural neuron field: drifting nodes, proximity synapses and travelling
/// signal pulses.
pub struct NeuronField<R: Rng = SmallRng> {
    config: FieldConfig,
    particles: Vec<Particle>,
    pulses: PulsePool,
    rng: R,
    positions: Vec<Vec3>,
    looks: Vec<NodeAppearance>,
    connections: Vec<Connection>,
    frame: Frame,
    pointer: Option<Vec3>,
    viewport: Viewport,
}

impl NeuronField<SmallRng> {
    /// Create a field seeded from OS entropy.
    pub fn initialize(config: FieldConfig) -> Result<Self, ConfigError> {
        Self::initialize_with_rng(config, SmallRng::from_entropy())
    }

    /// Create a reproducible field from a seed.
    pub fn with_seed(config: FieldConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::initialize_with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> NeuronField<R> {
    /// Validate `config`, scatter the nodes and allocate every pool and buffer.
    ///
    /// This is the only fallible step; frames never fail.
    pub fn initialize_with_rng(config: FieldConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let count = config.particle_count as usize;
        let max_connections = config.max_connections as usize;

        let particles = particle::generate(
            count,
            config.spread,
            &config.hubs,
            &config.drift,
            &mut rng,
        );
        let pulses = PulsePool::new(&config.pulses, &mut rng);
        let frame = Frame::with_capacity(count, max_connections, pulses.len());

        debug!(
            particles = count,
            hubs = particles.iter().filter(|p| p.is_hub()).count(),
            pulses = pulses.len(),
            max_connections,
            "neuron field initialized"
        );

        Ok(Self {
            config,
            particles,
            pulses,
            rng,
            positions: Vec::with_capacity(count),
            looks: Vec::with_capacity(count),
            connections: Vec::with_capacity(max_connections),
            frame,
            pointer: None,
            viewport: Viewport::default(),
        })
    }

    /// Compute the frame at `elapsed` seconds.
    pub fn advance(&mut self, elapsed: f32) -> &Frame {
        let config = &self.config;

        particle::current_positions_into(
            &self.particles,
            elapsed,
            &config.drift,
            &mut self.positions,
        );

        let pointer = self.pointer;
        self.looks.clear();
        self.looks.extend(
            self.particles
                .iter()
                .zip(&self.positions)
                .map(|(p, &pos)| {
                    NodeAppearance::compute(p, pos, elapsed, pointer, &config.pointer)
                }),
        );

        let found = connector::connect_into(
            &self.positions,
            config.connection_distance,
            config.max_connections as usize,
            config.connection_sample_target as usize,
            &mut self.connections,
        );

        self.pulses
            .advance(&self.positions, config.connection_distance, &mut self.rng);

        self.frame.set_elapsed(elapsed);
        self.frame.write_nodes(&self.positions, &self.looks);
        self.frame.write_connections(&self.connections);
        self.frame.write_pulses(self.pulses.pulses());

        trace!(
            elapsed,
            connections = found,
            active_pulses = self.pulses.active_count(),
            "frame advanced"
        );

        &self.frame
    }

    /// Advance using the next tick of `clock`.
    pub fn tick(&mut self, clock: &mut Clock) -> &Frame {
        let elapsed = clock.tick();
        self.advance(elapsed)
    }

    /// Release the pools. The field cannot be used afterwards.
    pub fn dispose(self) {
        debug!(
            particles = self.particles.len(),
            pulses = self.pulses.len(),
            "neuron field disposed"
        );
    }

    /// Last computed frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Configuration the field was initialized with.
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// The particle pool.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Node positions of the last frame.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Synapses of the last frame.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Pulse slots as of the last frame.
    pub fn pulses(&self) -> &[Pulse] {
        self.pulses.pulses()
    }

    /// Orientation the host should give the field for the last frame.
    pub fn transform(&self) -> FieldTransform {
        FieldTransform::at(self.frame.elapsed(), &self.config.rotation)
    }

    /// Set or clear the cursor position in world space.
    pub fn set_pointer(&mut self, pointer: Option<Vec3>) {
        self.pointer = pointer;
    }

    /// Set the cursor from normalised device coordinates (`-1..1` on both axes).
    pub fn set_pointer_ndc(&mut self, ndc: Option<Vec2>) {
        self.pointer = ndc.map(|ndc| self.pointer_from_ndc(ndc));
    }

    /// Current cursor position in field space.
    pub fn pointer(&self) -> Option<Vec3> {
        self.pointer
    }

    /// Map a normalised cursor onto the z = 0 plane of the viewport.
    pub fn pointer_from_ndc(&self, ndc: Vec2) -> Vec3 {
        Vec3::new(
            ndc.x * self.viewport.width / 2.0,
            ndc.y * self.viewport.height / 2.0,
            0.0,
        )
    }

    /// Record a host resize.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
    }

    /// Last viewport size set by the host.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}
