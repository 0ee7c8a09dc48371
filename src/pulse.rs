//! Signal pulse engine.
//!
//! A fixed pool of pulse slots carries short-lived signals from one node to
//! its nearest neighbour. Idle slots fire at random; active slots travel a
//! fixed fraction of the hop each frame and fade in and out along the way.
//!
//! # Lifecycle of a slot
//!
//! | State | Per-frame behaviour |
//! |-------|---------------------|
//! | idle | with `activation_probability`, pick a random source and its nearest neighbour within the connection distance; stay idle if there is none |
//! | active | `progress += speed`; at `progress >= 1.0` go idle with alpha 0, otherwise interpolate position and alpha |
//!
//! A slot that fires advances in the same frame, so its first visible
//! progress is `speed`, not zero.

use crate::config::PulseConfig;
use glam::Vec3;
use rand::Rng;

/// Envelope steepness: the pulse reaches full alpha after 1/5 of the hop.
const FADE_RATE: f32 = 5.0;

/// One pulse slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Pulse {
    source: usize,
    target: usize,
    progress: f32,
    speed: f32,
    active: bool,
    size: f32,
    position: Vec3,
    alpha: f32,
}

impl Pulse {
    fn idle(size: f32) -> Self {
        Self {
            source: 0,
            target: 0,
            progress: 0.0,
            speed: 0.0,
            active: false,
            size,
            position: Vec3::ZERO,
            alpha: 0.0,
        }
    }

    /// Index of the node the pulse leaves from.
    #[inline]
    pub fn source(&self) -> usize {
        self.source
    }

    /// Index of the node the pulse travels to.
    #[inline]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Fraction of the hop covered, in `[0, 1)` while active.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Progress added per frame for the current activation.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Whether the slot is currently travelling.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Render size, fixed for the slot.
    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Last interpolated position. Stale while idle.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Visible alpha. Zero while idle.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    fn activate(&mut self, source: usize, target: usize, speed: f32) {
        self.source = source;
        self.target = target;
        self.progress = 0.0;
        self.speed = speed;
        self.active = true;
    }

    fn step(&mut self, positions: &[Vec3], peak_alpha: f32) {
        self.progress += self.speed;
        if self.progress >= 1.0 {
            self.active = false;
            self.alpha = 0.0;
            return;
        }

        let t = self.progress;
        self.position = positions[self.source].lerp(positions[self.target], t);
        self.alpha = envelope(t, peak_alpha);
    }
}

/// Fade envelope at hop parameter `t`: `min(5t, 1) · min(5(1 - t), 1) · peak`.
///
/// Zero at both ends, flat at `peak` between `t = 0.2` and `t = 0.8`.
#[inline]
pub fn envelope(t: f32, peak_alpha: f32) -> f32 {
    let fade_in = (t * FADE_RATE).min(1.0);
    let fade_out = ((1.0 - t) * FADE_RATE).min(1.0);
    fade_in * fade_out * peak_alpha
}

/// Index of the node nearest to `source` whose distance is below `threshold`.
///
/// Ties keep the lower index.
pub fn nearest_within(positions: &[Vec3], source: usize, threshold: f32) -> Option<usize> {
    let origin = positions[source];
    let max_dist_sq = threshold * threshold;

    let mut best: Option<(usize, f32)> = None;
    for (j, &candidate) in positions.iter().enumerate() {
        if j == source {
            continue;
        }
        let dist_sq = origin.distance_squared(candidate);
        if dist_sq < max_dist_sq && best.map_or(true, |(_, d)| dist_sq < d) {
            best = Some((j, dist_sq));
        }
    }
    best.map(|(j, _)| j)
}

/// Fixed-size pool of pulse slots.
#[derive(Clone, Debug)]
pub struct PulsePool {
    pulses: Vec<Pulse>,
    config: PulseConfig,
}

impl PulsePool {
    /// Allocate `config.count` idle slots. The pool never grows or shrinks.
    pub fn new<R: Rng + ?Sized>(config: &PulseConfig, rng: &mut R) -> Self {
        let pulses = (0..config.count)
            .map(|_| Pulse::idle(config.size.sample(rng)))
            .collect();
        Self {
            pulses,
            config: config.clone(),
        }
    }

    /// Advance every slot by one frame.
    ///
    /// `positions` are the current-frame node positions, `threshold` the
    /// connection distance that bounds a hop.
    pub fn advance<R: Rng + ?Sized>(&mut self, positions: &[Vec3], threshold: f32, rng: &mut R) {
        let config = &self.config;
        for pulse in &mut self.pulses {
            if !pulse.active && rng.gen::<f32>() < config.activation_probability {
                if positions.is_empty() {
                    continue;
                }
                let source = rng.gen_range(0..positions.len());
                if let Some(target) = nearest_within(positions, source, threshold) {
                    pulse.activate(source, target, config.speed.sample(rng));
                }
            }

            if pulse.active {
                pulse.step(positions, config.peak_alpha);
            }
        }
    }

    /// All slots, active or idle.
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    /// Whether the pool has no slots.
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Number of slots currently carrying a signal.
    pub fn active_count(&self) -> usize {
        self.pulses.iter().filter(|p| p.active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SampleRange;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn always_fire(count: u32) -> PulseConfig {
        PulseConfig {
            count,
            activation_probability: 1.0,
            ..PulseConfig::default()
        }
    }

    #[test]
    fn test_pool_size_fixed() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut pool = PulsePool::new(&PulseConfig::default(), &mut rng);
        assert_eq!(pool.len(), 40);

        let positions = vec![Vec3::ZERO, Vec3::X];
        for _ in 0..500 {
            pool.advance(&positions, 2.8, &mut rng);
        }
        assert_eq!(pool.len(), 40);
    }

    #[test]
    fn test_envelope_shape() {
        assert_eq!(envelope(0.0, 0.9), 0.0);
        assert!(envelope(1.0, 0.9).abs() < 1e-6);
        assert!((envelope(0.5, 0.9) - 0.9).abs() < 1e-6);
        assert!((envelope(0.1, 0.9) - 0.45).abs() < 1e-6);
        assert!((envelope(0.9, 0.9) - 0.45).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_within() {
        let positions = [
            Vec3::ZERO,
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(50.0, 0.0, 0.0),
        ];
        assert_eq!(nearest_within(&positions, 0, 2.8), Some(2));
        assert_eq!(nearest_within(&positions, 3, 2.8), None);
        assert_eq!(nearest_within(&[Vec3::ZERO], 0, 2.8), None);
    }

    #[test]
    fn test_no_activation_without_neighbour() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut pool = PulsePool::new(&always_fire(8), &mut rng);
        let positions = vec![Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0)];
        for _ in 0..50 {
            pool.advance(&positions, 2.8, &mut rng);
            assert_eq!(pool.active_count(), 0);
            assert!(pool.pulses().iter().all(|p| p.alpha() == 0.0));
        }
    }

    #[test]
    fn test_empty_positions() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut pool = PulsePool::new(&always_fire(4), &mut rng);
        pool.advance(&[], 2.8, &mut rng);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_progress_steps_by_speed_then_retires() {
        let mut rng = SmallRng::seed_from_u64(3);
        let config = PulseConfig {
            speed: SampleRange::new(0.1, 0.15),
            ..always_fire(1)
        };
        let mut pool = PulsePool::new(&config, &mut rng);
        let positions = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];

        pool.advance(&positions, 2.8, &mut rng);
        let first = pool.pulses()[0].clone();
        assert!(first.is_active());
        assert_eq!(first.progress(), first.speed());
        assert!(config.speed.contains(first.speed()));

        let mut prev = first.progress();
        loop {
            pool.advance(&positions, 2.8, &mut rng);
            let pulse = &pool.pulses()[0];
            if !pulse.is_active() {
                assert!(prev + first.speed() >= 1.0);
                assert_eq!(pulse.alpha(), 0.0);
                break;
            }
            assert_eq!(pulse.progress(), prev + first.speed());
            assert!(pulse.progress() > prev);
            prev = pulse.progress();
        }
    }

    #[test]
    fn test_position_interpolates_between_nodes() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut pool = PulsePool::new(&always_fire(1), &mut rng);
        let positions = vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)];
        pool.advance(&positions, 2.8, &mut rng);

        let pulse = &pool.pulses()[0];
        let from = positions[pulse.source()];
        let to = positions[pulse.target()];
        let expected = from.lerp(to, pulse.progress());
        assert!((pulse.position() - expected).length() < 1e-6);
        assert!((pulse.alpha() - envelope(pulse.progress(), 0.9)).abs() < 1e-6);
    }

    #[test]
    fn test_targets_within_threshold() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut pool = PulsePool::new(&always_fire(16), &mut rng);
        let positions: Vec<Vec3> = (0..60)
            .map(|i| Vec3::new((i % 10) as f32 * 1.7, (i / 10) as f32 * 3.1, 0.0))
            .collect();

        for _ in 0..200 {
            pool.advance(&positions, 2.8, &mut rng);
            for pulse in pool.pulses().iter().filter(|p| p.is_active()) {
                assert_ne!(pulse.source(), pulse.target());
                let d = positions[pulse.source()].distance(positions[pulse.target()]);
                assert!(d < 2.8);
            }
        }
    }

    #[test]
    fn test_never_fires_at_zero_probability() {
        let mut rng = SmallRng::seed_from_u64(6);
        let config = PulseConfig {
            activation_probability: 0.0,
            ..PulseConfig::default()
        };
        let mut pool = PulsePool::new(&config, &mut rng);
        let positions = vec![Vec3::ZERO, Vec3::X];
        for _ in 0..100 {
            pool.advance(&positions, 2.8, &mut rng);
        }
        assert_eq!(pool.active_count(), 0);
    }
}
