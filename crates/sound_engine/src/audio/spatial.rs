//! Spatial audio attenuation
//!
//! Listener-relative distance falloff for positioned sounds. The falloff
//! curve is shared by the whole manager; the audible range comes from each
//! sound's `max_distance`.

use crate::foundation::math::{distance, Vec3};
use serde::{Deserialize, Serialize};

/// Configuration for spatial audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Distance below which no attenuation applies
    pub reference_distance: f32,
    /// Falloff exponent (1.0 = linear, 2.0 = quadratic)
    pub falloff_exponent: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            reference_distance: 1.0,
            falloff_exponent: 1.0,
        }
    }
}

/// Listener state and attenuation curve
#[derive(Debug, Clone)]
pub struct SpatialAudio {
    config: SpatialConfig,
    listener_position: Vec3,
}

impl SpatialAudio {
    /// Create a spatial audio system with the listener at the origin
    pub fn new(config: SpatialConfig) -> Self {
        Self {
            config,
            listener_position: Vec3::zeros(),
        }
    }

    /// Current configuration
    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: SpatialConfig) {
        self.config = config;
    }

    /// Set the listener position
    pub fn set_listener_position(&mut self, position: Vec3) {
        self.listener_position = position;
    }

    /// Listener position
    pub fn listener_position(&self) -> Vec3 {
        self.listener_position
    }

    /// Attenuation factor (0.0 to 1.0) for a sound at `position`
    pub fn calculate_attenuation(&self, position: Vec3, max_distance: f32) -> f32 {
        let distance = distance(&position, &self.listener_position);

        if distance > max_distance {
            return 0.0;
        }

        if distance <= self.config.reference_distance || max_distance <= self.config.reference_distance {
            return 1.0;
        }

        let normalized_distance = (distance - self.config.reference_distance)
            / (max_distance - self.config.reference_distance);

        let attenuation: f32 = 1.0 - normalized_distance.powf(self.config.falloff_exponent);
        attenuation.max(0.0)
    }

    /// Gain for a sound, blending the unattenuated and attenuated signal
    pub fn gain(&self, position: Option<Vec3>, max_distance: f32, spatial_blend: f32) -> f32 {
        match position {
            Some(position) => {
                let attenuation = self.calculate_attenuation(position, max_distance);
                (1.0 - spatial_blend) + spatial_blend * attenuation
            }
            None => 1.0,
        }
    }
}

impl Default for SpatialAudio {
    fn default() -> Self {
        Self::new(SpatialConfig::default())
    }
}
