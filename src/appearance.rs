//! Per-node size and alpha.
//!
//! Nodes breathe slowly and glow brighter near the cursor. None of this feeds
//! back into the simulation; hosts that shade nodes themselves can ignore it.

use crate::config::PointerConfig;
use crate::particle::Particle;
use glam::Vec3;

/// Hermite smoothstep, valid for `edge0 > edge1` as well.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Strength of the cursor glow at `position`. Zero without a pointer.
#[inline]
pub fn pointer_effect(position: Vec3, pointer: Option<Vec3>, config: &PointerConfig) -> f32 {
    match pointer {
        Some(cursor) => {
            smoothstep(config.radius, config.inner_radius, position.distance(cursor))
                * config.influence
        }
        None => 0.0,
    }
}

/// Rendered size and alpha of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeAppearance {
    pub size: f32,
    pub alpha: f32,
}

impl NodeAppearance {
    /// Appearance of `particle`, currently at `position`, at `elapsed` seconds.
    pub fn compute(
        particle: &Particle,
        position: Vec3,
        elapsed: f32,
        pointer: Option<Vec3>,
        config: &PointerConfig,
    ) -> Self {
        let phase = particle.phase();
        let effect = pointer_effect(position, pointer, config);

        let pulse = 1.0 + (elapsed * 2.0 + phase).sin() * 0.3;
        let size = particle.size() * pulse * (1.0 + effect * 2.0);
        let alpha = 0.4 + effect * 0.6 + (elapsed * 1.5 + phase).sin() * 0.15;

        Self { size, alpha }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::SizeClass;

    #[test]
    fn test_smoothstep_reversed_edges() {
        assert_eq!(smoothstep(4.0, 0.5, 0.0), 1.0);
        assert_eq!(smoothstep(4.0, 0.5, 10.0), 0.0);
        let mid = smoothstep(4.0, 0.5, 2.25);
        assert!((mid - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_pointer_no_glow() {
        let config = PointerConfig::default();
        assert_eq!(pointer_effect(Vec3::ZERO, None, &config), 0.0);
    }

    #[test]
    fn test_pointer_glow_falls_off() {
        let config = PointerConfig::default();
        let near = pointer_effect(Vec3::ZERO, Some(Vec3::new(0.2, 0.0, 0.0)), &config);
        let far = pointer_effect(Vec3::ZERO, Some(Vec3::new(3.0, 0.0, 0.0)), &config);
        let out = pointer_effect(Vec3::ZERO, Some(Vec3::new(9.0, 0.0, 0.0)), &config);
        assert_eq!(near, config.influence);
        assert!(far > 0.0 && far < near);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn test_appearance_at_rest() {
        let particle = Particle::new(Vec3::ZERO, SizeClass::Hub, 6.0, 0.0, 1.0);
        let look = NodeAppearance::compute(
            &particle,
            Vec3::ZERO,
            0.0,
            None,
            &PointerConfig::default(),
        );
        assert!((look.size - 6.0).abs() < 1e-6);
        assert!((look.alpha - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_pointer_enlarges_node() {
        let config = PointerConfig::default();
        let particle = Particle::at(Vec3::ZERO);
        let plain = NodeAppearance::compute(&particle, Vec3::ZERO, 1.0, None, &config);
        let lit = NodeAppearance::compute(&particle, Vec3::ZERO, 1.0, Some(Vec3::ZERO), &config);
        assert!(lit.size > plain.size);
        assert!(lit.alpha > plain.alpha);
    }
}
