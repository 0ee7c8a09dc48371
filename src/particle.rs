//! Particle field generation and drift.
//!
//! Nodes are scattered once at initialization and never move away from their
//! base position. Each frame only the drift offset is recomputed, as a pure
//! function of the node's phase, speed and the elapsed time.

use crate::config::{DriftConfig, HubConfig};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Radius exponent for the clustered distribution.
///
/// Values below `1/3` would bias outward; `0.6` packs a dense core with a
/// long sparse tail.
pub const CLUSTER_EXPONENT: f32 = 0.6;

/// Size class of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SizeClass {
    /// Regular node.
    #[default]
    Ordinary,
    /// Larger node standing in for a high-degree neuron.
    Hub,
}

/// One node of the field. Immutable after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    base: Vec3,
    class: SizeClass,
    size: f32,
    phase: f32,
    speed: f32,
}

impl Particle {
    /// Create a node from explicit attributes.
    pub fn new(base: Vec3, class: SizeClass, size: f32, phase: f32, speed: f32) -> Self {
        Self {
            base,
            class,
            size,
            phase,
            speed,
        }
    }

    /// Ordinary node at `base` with zero phase and unit speed.
    pub fn at(base: Vec3) -> Self {
        Self::new(base, SizeClass::Ordinary, 1.0, 0.0, 1.0)
    }

    /// Rest position the node drifts around.
    #[inline]
    pub fn base(&self) -> Vec3 {
        self.base
    }

    /// Size class chosen at generation.
    #[inline]
    pub fn class(&self) -> SizeClass {
        self.class
    }

    /// Whether this node is a hub.
    #[inline]
    pub fn is_hub(&self) -> bool {
        self.class == SizeClass::Hub
    }

    /// Base render size.
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Oscillation phase in radians.
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Oscillation speed.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Position of this node at `elapsed` seconds.
    #[inline]
    pub fn position_at(&self, elapsed: f32, drift: &DriftConfig) -> Vec3 {
        self.base + drift.offset(elapsed, self.phase, self.speed)
    }
}

impl DriftConfig {
    /// Drift offset for a node with the given phase and speed.
    #[inline]
    pub fn offset(&self, elapsed: f32, phase: f32, speed: f32) -> Vec3 {
        let ts = elapsed * speed;
        Vec3::new(
            (ts + phase).sin() * self.amplitude_x,
            (ts * self.y_frequency + phase * self.y_phase).cos() * self.amplitude_y,
            (ts * self.z_frequency + phase * self.z_phase).sin() * self.amplitude_z,
        )
    }

    /// Upper bound on `|offset|` for any time.
    pub fn max_offset(&self) -> f32 {
        self.amplitude_x.abs() + self.amplitude_y.abs() + self.amplitude_z.abs()
    }
}

/// Scatter `count` nodes around the origin.
///
/// Directions are uniform on the sphere; the radius is `spread · u^0.6`,
/// which clusters nodes toward the centre.
pub fn generate<R: Rng + ?Sized>(
    count: usize,
    spread: f32,
    hubs: &HubConfig,
    drift: &DriftConfig,
    rng: &mut R,
) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let theta = rng.gen_range(0.0..TAU);
            let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
            let r = rng.gen::<f32>().powf(CLUSTER_EXPONENT) * spread;

            let base = Vec3::new(
                r * phi.sin() * theta.cos(),
                r * phi.sin() * theta.sin(),
                r * phi.cos(),
            );

            let (class, size) = if rng.gen::<f32>() < hubs.probability {
                (SizeClass::Hub, hubs.hub_size.sample(rng))
            } else {
                (SizeClass::Ordinary, hubs.node_size.sample(rng))
            };

            let phase = rng.gen_range(0.0..TAU);
            let speed = drift.speed.sample(rng);

            Particle::new(base, class, size, phase, speed)
        })
        .collect()
}

/// Position of `particle` at `elapsed` seconds.
#[inline]
pub fn current_position(particle: &Particle, elapsed: f32, drift: &DriftConfig) -> Vec3 {
    particle.position_at(elapsed, drift)
}

/// Write every node's current position into `out`, reusing its allocation.
pub fn current_positions_into(
    particles: &[Particle],
    elapsed: f32,
    drift: &DriftConfig,
    out: &mut Vec<Vec3>,
) {
    out.clear();
    out.extend(particles.iter().map(|p| p.position_at(elapsed, drift)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn field(seed: u64, count: usize) -> Vec<Particle> {
        let mut rng = SmallRng::seed_from_u64(seed);
        generate(
            count,
            12.0,
            &HubConfig::default(),
            &DriftConfig::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_generate_count_and_bounds() {
        let particles = field(1, 500);
        assert_eq!(particles.len(), 500);
        for p in &particles {
            assert!(p.base().length() <= 12.0 + 0.001);
            assert!((0.0..TAU).contains(&p.phase()));
            assert!(p.speed() >= 0.2 && p.speed() < 1.0);
        }
    }

    #[test]
    fn test_generate_is_seeded() {
        assert_eq!(field(9, 64), field(9, 64));
        assert_ne!(field(9, 64), field(10, 64));
    }

    #[test]
    fn test_hub_sizes() {
        let hubs = HubConfig::default();
        for p in field(3, 1000) {
            match p.class() {
                SizeClass::Hub => assert!(hubs.hub_size.contains(p.size())),
                SizeClass::Ordinary => assert!(hubs.node_size.contains(p.size())),
            }
        }
    }

    #[test]
    fn test_hub_probability_extremes() {
        let mut rng = SmallRng::seed_from_u64(5);
        let drift = DriftConfig::default();

        let all = HubConfig {
            probability: 1.0,
            ..HubConfig::default()
        };
        assert!(generate(50, 1.0, &all, &drift, &mut rng)
            .iter()
            .all(Particle::is_hub));

        let none = HubConfig {
            probability: 0.0,
            ..HubConfig::default()
        };
        assert!(!generate(50, 1.0, &none, &drift, &mut rng)
            .iter()
            .any(Particle::is_hub));
    }

    #[test]
    fn test_clustered_toward_core() {
        // With r = u^0.6 the median radius is 0.5^0.6 ≈ 0.66 of the spread,
        // below the ≈ 0.79 a uniform ball would give.
        let particles = field(11, 4000);
        let inside = particles
            .iter()
            .filter(|p| p.base().length() < 12.0 * 0.72)
            .count();
        assert!(inside > 2000);
    }

    #[test]
    fn test_current_position_deterministic() {
        let drift = DriftConfig::default();
        for p in field(2, 20) {
            for t in [0.0, 1.5, 37.25, 1000.0] {
                assert_eq!(
                    current_position(&p, t, &drift),
                    current_position(&p, t, &drift)
                );
            }
        }
    }

    #[test]
    fn test_drift_bounded() {
        let drift = DriftConfig::default();
        let bound = drift.max_offset() + 1e-5;
        for p in field(4, 50) {
            let mut t = 0.0;
            while t < 200.0 {
                let offset = current_position(&p, t, &drift) - p.base();
                assert!(offset.length() <= bound);
                t += 0.37;
            }
        }
    }

    #[test]
    fn test_drift_at_zero_time() {
        let drift = DriftConfig::default();
        let p = Particle::new(Vec3::ONE, SizeClass::Ordinary, 1.0, 0.0, 0.5);
        // sin(0) = 0, cos(0) = 1
        let pos = p.position_at(0.0, &drift);
        assert!((pos.x - 1.0).abs() < 1e-6);
        assert!((pos.y - (1.0 + drift.amplitude_y)).abs() < 1e-6);
        assert!((pos.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_positions_into_reuses_buffer() {
        let drift = DriftConfig::default();
        let particles = field(6, 10);
        let mut out = vec![Vec3::ZERO; 64];
        current_positions_into(&particles, 2.0, &drift, &mut out);
        assert_eq!(out.len(), 10);
        assert_eq!(out[3], particles[3].position_at(2.0, &drift));
    }
}
