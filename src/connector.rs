//! Proximity connector: synapses between nearby nodes.
//!
//! Every frame the connector scans node pairs and emits a line segment for
//! each pair closer than the connection distance. Opacity falls off linearly
//! with length, from 1.0 at zero distance to 0.0 at the threshold.
//!
//! The outer loop only visits every `step`-th node, where
//! `step = max(1, N / sample_target)`. The inner loop still scans every node
//! with a higher index, so each accepted pair is unique. Enumeration stops as
//! soon as the connection budget is spent.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Default number of nodes used as connection origins per frame.
pub const DEFAULT_SAMPLE_TARGET: usize = 200;

/// A synapse between two nodes for one frame.
///
/// Endpoints are copied out of the position buffer; the connection holds no
/// reference to the nodes themselves.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Connection {
    pub start: Vec3,
    pub end: Vec3,
    pub opacity: f32,
}

impl Connection {
    /// Length of the segment.
    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Outer-loop stride for `count` nodes.
#[inline]
pub fn origin_stride(count: usize, sample_target: usize) -> usize {
    (count / sample_target.max(1)).max(1)
}

/// Find synapses with the default origin sample target.
pub fn connect(positions: &[Vec3], threshold: f32, max_connections: usize) -> Vec<Connection> {
    let mut out = Vec::new();
    connect_into(
        positions,
        threshold,
        max_connections,
        DEFAULT_SAMPLE_TARGET,
        &mut out,
    );
    out
}

/// Find synapses, writing into `out` and reusing its allocation.
///
/// Pairs are emitted in nested iteration order: increasing origin index, then
/// increasing partner index. Returns the number of connections found.
pub fn connect_into(
    positions: &[Vec3],
    threshold: f32,
    max_connections: usize,
    sample_target: usize,
    out: &mut Vec<Connection>,
) -> usize {
    out.clear();

    let n = positions.len();
    let max_dist_sq = threshold * threshold;
    let step = origin_stride(n, sample_target);

    'origins: for i in (0..n).step_by(step) {
        let origin = positions[i];
        for &partner in &positions[i + 1..] {
            if out.len() >= max_connections {
                break 'origins;
            }
            let dist_sq = origin.distance_squared(partner);
            if dist_sq < max_dist_sq {
                let dist = dist_sq.sqrt();
                out.push(Connection {
                    start: origin,
                    end: partner,
                    opacity: 1.0 - dist / threshold,
                });
            }
        }
    }

    if out.len() >= max_connections {
        tracing::trace!(max_connections, "connection budget exhausted");
    }

    out.len()
}
