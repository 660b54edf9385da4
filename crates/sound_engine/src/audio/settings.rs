//! Sound configuration
//!
//! Declarative group layout loaded from TOML or RON through the `Config`
//! trait and applied with `SoundManager::apply_config`.

use crate::audio::backend::BackendKind;
use crate::audio::spatial::SpatialConfig;
use crate::config::Config;
use serde::{Deserialize, Serialize};

/// One sound group and its agent pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundGroupConfig {
    /// Unique group name
    pub name: String,
    /// Protect sounds from replacement by equal-priority requests
    pub avoid_being_replaced_by_same_priority: bool,
    /// Start muted
    pub mute: bool,
    /// Group volume (0.0 to 1.0)
    pub volume: f32,
    /// Number of agents to create
    pub agent_count: usize,
}

impl Default for SoundGroupConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            avoid_being_replaced_by_same_priority: false,
            mute: false,
            volume: 1.0,
            agent_count: 1,
        }
    }
}

/// Sound system configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Backend to create the sound helper from
    pub backend: BackendKind,
    /// Distance attenuation settings
    pub spatial: SpatialConfig,
    /// Groups in creation order
    pub groups: Vec<SoundGroupConfig>,
}

impl Config for SoundConfig {}

impl SoundConfig {
    /// Total agents across all groups
    pub fn total_agent_count(&self) -> usize {
        self.groups.iter().map(|group| group.agent_count).sum()
    }
}
