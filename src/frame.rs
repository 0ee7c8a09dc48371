//! Per-frame output buffers.
//!
//! A [`Frame`] is what the rendering host consumes: flat `f32` arrays laid out
//! for direct upload as vertex attributes. All buffers are allocated once when
//! the field is initialized and overwritten every frame.
//!
//! | Buffer | Floats per entity | Entities |
//! |--------|-------------------|----------|
//! | node positions | 3 | N nodes |
//! | node sizes, node alphas | 1 | N nodes |
//! | synapse positions | 6 (two endpoints) | `max_connections` (first `connection_count` valid) |
//! | synapse opacities | 2 (one per endpoint) | `max_connections` |
//! | pulse positions | 3 | M slots |
//! | pulse alphas, pulse sizes | 1 | M slots |

use crate::appearance::NodeAppearance;
use crate::connector::Connection;
use crate::pulse::Pulse;
use glam::Vec3;

/// Identifies one of the frame's buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Buffer {
    NodePositions,
    NodeSizes,
    NodeAlphas,
    /// Only the drawn range, `connection_count * 6` floats.
    SynapsePositions,
    /// Only the drawn range, `connection_count * 2` floats.
    SynapseOpacities,
    PulsePositions,
    PulseAlphas,
    PulseSizes,
}

impl Buffer {
    /// Every buffer, in upload order.
    pub const ALL: [Buffer; 8] = [
        Buffer::NodePositions,
        Buffer::NodeSizes,
        Buffer::NodeAlphas,
        Buffer::SynapsePositions,
        Buffer::SynapseOpacities,
        Buffer::PulsePositions,
        Buffer::PulseAlphas,
        Buffer::PulseSizes,
    ];

    /// Number of floats per vertex for this attribute.
    pub fn components(&self) -> usize {
        match self {
            Buffer::NodePositions | Buffer::SynapsePositions | Buffer::PulsePositions => 3,
            _ => 1,
        }
    }
}

/// Output of one simulation step.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    elapsed: f32,
    node_positions: Vec<f32>,
    node_sizes: Vec<f32>,
    node_alphas: Vec<f32>,
    synapse_positions: Vec<f32>,
    synapse_opacities: Vec<f32>,
    connection_count: usize,
    pulse_positions: Vec<f32>,
    pulse_alphas: Vec<f32>,
    pulse_sizes: Vec<f32>,
}

impl Frame {
    /// Allocate buffers for `nodes` nodes, `max_connections` synapses and
    /// `pulses` pulse slots.
    pub fn with_capacity(nodes: usize, max_connections: usize, pulses: usize) -> Self {
        Self {
            elapsed: 0.0,
            node_positions: vec![0.0; nodes * 3],
            node_sizes: vec![0.0; nodes],
            node_alphas: vec![0.0; nodes],
            synapse_positions: vec![0.0; max_connections * 6],
            synapse_opacities: vec![0.0; max_connections * 2],
            connection_count: 0,
            pulse_positions: vec![0.0; pulses * 3],
            pulse_alphas: vec![0.0; pulses],
            pulse_sizes: vec![0.0; pulses],
        }
    }

    pub(crate) fn set_elapsed(&mut self, elapsed: f32) {
        self.elapsed = elapsed;
    }

    pub(crate) fn write_nodes(&mut self, positions: &[Vec3], looks: &[NodeAppearance]) {
        for (i, (pos, look)) in positions.iter().zip(looks).enumerate() {
            self.node_positions[i * 3..i * 3 + 3].copy_from_slice(&pos.to_array());
            self.node_sizes[i] = look.size;
            self.node_alphas[i] = look.alpha;
        }
    }

    pub(crate) fn write_connections(&mut self, connections: &[Connection]) {
        for (ci, conn) in connections.iter().enumerate() {
            let p = ci * 6;
            self.synapse_positions[p..p + 3].copy_from_slice(&conn.start.to_array());
            self.synapse_positions[p + 3..p + 6].copy_from_slice(&conn.end.to_array());

            let o = ci * 2;
            self.synapse_opacities[o] = conn.opacity;
            self.synapse_opacities[o + 1] = conn.opacity;
        }
        self.connection_count = connections.len();
    }

    pub(crate) fn write_pulses(&mut self, pulses: &[Pulse]) {
        for (i, pulse) in pulses.iter().enumerate() {
            self.pulse_positions[i * 3..i * 3 + 3].copy_from_slice(&pulse.position().to_array());
            self.pulse_alphas[i] = pulse.alpha();
            self.pulse_sizes[i] = pulse.size();
        }
    }

    /// Elapsed time this frame was computed for.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_sizes.len()
    }

    /// Number of valid synapses; the draw range is `connection_count * 2` vertices.
    #[inline]
    pub fn connection_count(&self) -> usize {
        self.connection_count
    }

    /// Number of pulse slots.
    #[inline]
    pub fn pulse_count(&self) -> usize {
        self.pulse_alphas.len()
    }

    /// Synapse capacity per frame.
    #[inline]
    pub fn max_connections(&self) -> usize {
        self.synapse_opacities.len() / 2
    }

    /// Contents of one buffer.
    pub fn buffer(&self, which: Buffer) -> &[f32] {
        match which {
            Buffer::NodePositions => &self.node_positions,
            Buffer::NodeSizes => &self.node_sizes,
            Buffer::NodeAlphas => &self.node_alphas,
            Buffer::SynapsePositions => &self.synapse_positions[..self.connection_count * 6],
            Buffer::SynapseOpacities => &self.synapse_opacities[..self.connection_count * 2],
            Buffer::PulsePositions => &self.pulse_positions,
            Buffer::PulseAlphas => &self.pulse_alphas,
            Buffer::PulseSizes => &self.pulse_sizes,
        }
    }

    /// Raw bytes of one buffer, ready for GPU upload.
    pub fn bytes(&self, which: Buffer) -> &[u8] {
        bytemuck::cast_slice(self.buffer(which))
    }

    /// Current position of node `index`.
    pub fn node_position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.node_positions[index * 3..index * 3 + 3])
    }

    /// Synapse `index` as endpoints plus opacity.
    pub fn synapse(&self, index: usize) -> Option<(Vec3, Vec3, f32)> {
        if index >= self.connection_count {
            return None;
        }
        let p = index * 6;
        Some((
            Vec3::from_slice(&self.synapse_positions[p..p + 3]),
            Vec3::from_slice(&self.synapse_positions[p + 3..p + 6]),
            self.synapse_opacities[index * 2],
        ))
    }

    /// Pulse slot `index` as position plus alpha.
    pub fn pulse(&self, index: usize) -> (Vec3, f32) {
        (
            Vec3::from_slice(&self.pulse_positions[index * 3..index * 3 + 3]),
            self.pulse_alphas[index],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preallocated_sizes() {
        let frame = Frame::with_capacity(10, 100, 4);
        assert_eq!(frame.node_count(), 10);
        assert_eq!(frame.max_connections(), 100);
        assert_eq!(frame.pulse_count(), 4);
        assert_eq!(frame.buffer(Buffer::NodePositions).len(), 30);
        assert_eq!(frame.buffer(Buffer::PulsePositions).len(), 12);
        assert!(frame.buffer(Buffer::SynapsePositions).is_empty());
    }

    #[test]
    fn test_write_connections() {
        let mut frame = Frame::with_capacity(2, 8, 0);
        let conn = Connection {
            start: Vec3::new(1.0, 2.0, 3.0),
            end: Vec3::new(4.0, 5.0, 6.0),
            opacity: 0.25,
        };
        frame.write_connections(&[conn]);

        assert_eq!(frame.connection_count(), 1);
        assert_eq!(
            frame.buffer(Buffer::SynapsePositions),
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
        assert_eq!(frame.buffer(Buffer::SynapseOpacities), &[0.25, 0.25]);
        assert_eq!(frame.synapse(0), Some((conn.start, conn.end, 0.25)));
        assert_eq!(frame.synapse(1), None);
    }

    #[test]
    fn test_byte_views() {
        let frame = Frame::with_capacity(3, 4, 2);
        for which in Buffer::ALL {
            assert_eq!(frame.bytes(which).len(), frame.buffer(which).len() * 4);
        }
    }

    #[test]
    fn test_components() {
        assert_eq!(Buffer::NodePositions.components(), 3);
        assert_eq!(Buffer::SynapseOpacities.components(), 1);
    }
}
