//! Configuration for the neuron field.
//!
//! Every tunable of the simulator lives here. The defaults reproduce the
//! dashboard background: 500 nodes in a radius-12 cluster, synapses up to 2.8
//! units long, 40 signal pulses.
//!
//! Configurations round-trip through JSON so a host can ship presets:
//!
//! ```ignore
//! let config = FieldConfig::load("presets/dense.json")?
//!     .with_particle_count(800);
//! let field = NeuronField::with_seed(config, 7)?;
//! ```

use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Half-open sampling range `[min, max)`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SampleRange {
    pub min: f32,
    pub max: f32,
}

impl SampleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draw a uniform sample from the range.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min..self.max)
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min >= self.max {
            return Err(ConfigError::EmptyRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn validate_positive(&self, name: &'static str) -> Result<(), ConfigError> {
        self.validate(name)?;
        if self.min <= 0.0 {
            return Err(ConfigError::NotPositive {
                name,
                value: self.min,
            });
        }
        Ok(())
    }
}

/// Per-axis drift of each node around its base position.
///
/// The offset is `(ax·sin(t·s + φ), ay·cos(t·s·y_frequency + φ·y_phase),
/// az·sin(t·s·z_frequency + φ·z_phase))` where `s` is the node's oscillation
/// speed and `φ` its phase.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriftConfig {
    pub amplitude_x: f32,
    pub amplitude_y: f32,
    pub amplitude_z: f32,
    pub y_frequency: f32,
    pub y_phase: f32,
    pub z_frequency: f32,
    pub z_phase: f32,
    /// Range the per-node oscillation speed is drawn from.
    pub speed: SampleRange,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            amplitude_x: 0.15,
            amplitude_y: 0.12,
            amplitude_z: 0.1,
            y_frequency: 0.7,
            y_phase: 1.3,
            z_frequency: 0.5,
            z_phase: 0.8,
            speed: SampleRange::new(0.2, 1.0),
        }
    }
}

/// Hub selection and node sizing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HubConfig {
    /// Chance that a node is created as a hub.
    pub probability: f32,
    /// Size range for hub nodes.
    pub hub_size: SampleRange,
    /// Size range for ordinary nodes.
    pub node_size: SampleRange,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            probability: 0.08,
            hub_size: SampleRange::new(4.0, 8.0),
            node_size: SampleRange::new(1.0, 3.5),
        }
    }
}

/// Signal pulse pool settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PulseConfig {
    /// Number of pulse slots. Fixed for the lifetime of the field.
    pub count: u32,
    /// Progress added per frame, drawn on every activation.
    pub speed: SampleRange,
    /// Per-frame chance that an idle slot tries to fire.
    pub activation_probability: f32,
    /// Alpha at the top of the fade envelope.
    pub peak_alpha: f32,
    /// Render size range, drawn once per slot.
    pub size: SampleRange,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            count: 40,
            speed: SampleRange::new(0.012, 0.020),
            activation_probability: 0.02,
            peak_alpha: 0.9,
            size: SampleRange::new(3.0, 6.0),
        }
    }
}

/// Cursor glow around nodes. Visual only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    /// Peak strength of the glow at the cursor.
    pub influence: f32,
    /// Distance where the glow fades to zero.
    pub radius: f32,
    /// Distance inside which the glow is at full strength.
    pub inner_radius: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            influence: 3.0,
            radius: 4.0,
            inner_radius: 0.5,
        }
    }
}

/// Slow whole-field rotation applied by the host.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RotationConfig {
    /// Yaw in radians per second.
    pub yaw_speed: f32,
    /// Frequency of the pitch wobble.
    pub wobble_frequency: f32,
    /// Pitch wobble amplitude in radians.
    pub wobble_amplitude: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            yaw_speed: 0.008,
            wobble_frequency: 0.05,
            wobble_amplitude: 0.1,
        }
    }
}

/// Complete neuron field configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of nodes, created once at initialization.
    pub particle_count: u32,
    /// Radius of the node cluster.
    pub spread: f32,
    /// Maximum synapse length. Also bounds pulse hops.
    pub connection_distance: f32,
    /// Per-frame synapse budget.
    pub max_connections: u32,
    /// Approximate number of nodes used as connection origins per frame.
    pub connection_sample_target: u32,
    pub drift: DriftConfig,
    pub hubs: HubConfig,
    pub pulses: PulseConfig,
    pub pointer: PointerConfig,
    pub rotation: RotationConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 500,
            spread: 12.0,
            connection_distance: 2.8,
            max_connections: 3000,
            connection_sample_target: 200,
            drift: DriftConfig::default(),
            hubs: HubConfig::default(),
            pulses: PulseConfig::default(),
            pointer: PointerConfig::default(),
            rotation: RotationConfig::default(),
        }
    }
}

impl FieldConfig {
    /// Set the number of nodes.
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the cluster radius.
    pub fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }

    /// Set the maximum synapse length.
    pub fn with_connection_distance(mut self, distance: f32) -> Self {
        self.connection_distance = distance;
        self
    }

    /// Set the per-frame synapse budget.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the connection origin sample target.
    pub fn with_connection_sample_target(mut self, target: u32) -> Self {
        self.connection_sample_target = target;
        self
    }

    /// Set the number of pulse slots.
    pub fn with_pulse_count(mut self, count: u32) -> Self {
        self.pulses.count = count;
        self
    }

    /// Set the hub probability.
    pub fn with_hub_probability(mut self, probability: f32) -> Self {
        self.hubs.probability = probability;
        self
    }

    /// Check every setting. Called once by the simulator at initialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.max_connections == 0 {
            return Err(ConfigError::NoConnections);
        }
        if self.connection_sample_target == 0 {
            return Err(ConfigError::NoSampleTarget);
        }
        positive("spread", self.spread)?;
        positive("connection_distance", self.connection_distance)?;

        let drift = &self.drift;
        for (name, value) in [
            ("drift.amplitude_x", drift.amplitude_x),
            ("drift.amplitude_y", drift.amplitude_y),
            ("drift.amplitude_z", drift.amplitude_z),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        drift.speed.validate_positive("drift.speed")?;

        probability("hubs.probability", self.hubs.probability)?;
        self.hubs.hub_size.validate_positive("hubs.hub_size")?;
        self.hubs.node_size.validate_positive("hubs.node_size")?;

        probability(
            "pulses.activation_probability",
            self.pulses.activation_probability,
        )?;
        probability("pulses.peak_alpha", self.pulses.peak_alpha)?;
        self.pulses.speed.validate_positive("pulses.speed")?;
        self.pulses.size.validate_positive("pulses.size")?;

        // The glow ramps from `radius` down to `inner_radius`.
        SampleRange::new(self.pointer.inner_radius, self.pointer.radius).validate("pointer")?;
        if !self.pointer.influence.is_finite() {
            return Err(ConfigError::NotPositive {
                name: "pointer.influence",
                value: self.pointer.influence,
            });
        }

        Ok(())
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Save the configuration as a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FieldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_particles_rejected() {
        let config = FieldConfig::default().with_particle_count(0);
        assert!(matches!(config.validate(), Err(ConfigError::NoParticles)));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = FieldConfig::default().with_connection_distance(-1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                name: "connection_distance",
                ..
            })
        ));

        let config = FieldConfig::default().with_connection_distance(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_connections_rejected() {
        let config = FieldConfig::default().with_max_connections(0);
        assert!(matches!(config.validate(), Err(ConfigError::NoConnections)));
    }

    #[test]
    fn test_bad_probability_rejected() {
        let config = FieldConfig::default().with_hub_probability(1.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Probability { .. })
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = FieldConfig::default();
        config.pulses.speed = SampleRange::new(0.02, 0.01);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRange {
                name: "pulses.speed",
                ..
            })
        ));
    }

    #[test]
    fn test_pointer_radii_must_be_ordered() {
        let mut config = FieldConfig::default();
        config.pointer.inner_radius = config.pointer.radius;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRange { name: "pointer", .. })
        ));
    }

    #[test]
    fn test_zero_pulses_allowed() {
        let config = FieldConfig::default().with_pulse_count(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = FieldConfig::default()
            .with_particle_count(120)
            .with_spread(6.0);
        let json = config.to_json().unwrap();
        let parsed = FieldConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FieldConfig::from_json(r#"{ "particle_count": 64 }"#).unwrap();
        assert_eq!(config.particle_count, 64);
        assert_eq!(config.connection_distance, 2.8);
        assert_eq!(config.pulses.count, 40);
    }

    #[test]
    fn test_load_missing_file() {
        let err = FieldConfig::load("/nonexistent/neurofield.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_sample_range() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;

        let range = SampleRange::new(0.2, 1.0);
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(range.contains(range.sample(&mut rng)));
        }
    }
}
