//! Sound system errors
//!
//! `SoundError` is returned synchronously from configuration and routing calls.
//! Capacity and load problems never surface here: they travel to the caller
//! through `PlaySoundFailure` events tagged with a `PlaySoundErrorCode`.

use crate::audio::SerialId;
use thiserror::Error;

/// Errors raised by the sound manager and its collaborators
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SoundError {
    /// A collaborator is missing or was wired up at the wrong time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No sound group with this name exists
    #[error("Sound group '{0}' does not exist")]
    InvalidGroup(String),

    /// Serial id is unknown, stale or already terminal
    #[error("Serial id {0} does not refer to a tracked sound")]
    InvalidHandle(SerialId),

    /// Every agent in the group is busy at an equal or higher priority
    #[error("Sound group '{group}' has no agent available for priority {priority}")]
    CapacityExceeded {
        /// Group that rejected the request
        group: String,
        /// Priority of the rejected request
        priority: i32,
    },

    /// Group has no agents at all
    #[error("Sound group '{0}' has no sound agent")]
    NoAgent(String),

    /// Asset or one of its dependencies could not be loaded
    #[error("Failed to load sound asset '{asset}': {reason}")]
    LoadFailure {
        /// Asset that was requested
        asset: String,
        /// Reason reported by the resource manager
        reason: String,
    },

    /// Agent helper refused the loaded asset
    #[error("Failed to set sound asset '{asset}': {reason}")]
    SetSoundAssetFailure {
        /// Asset handed to the agent helper
        asset: String,
        /// Reason reported by the agent helper
        reason: String,
    },

    /// Playback backend error
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Reason attached to a `PlaySoundFailure` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaySoundErrorCode {
    /// The group owns no agents
    SoundGroupHasNoAgent,
    /// The resource manager failed to load the asset or a dependency
    LoadAssetFailure,
    /// No agent could be assigned at the request's priority
    CapacityExceeded,
    /// The chosen agent helper rejected the asset
    SetSoundAssetFailure,
}

impl PlaySoundErrorCode {
    /// Map a sound error onto the code reported in failure events
    pub fn from_error(error: &SoundError) -> Option<Self> {
        match error {
            SoundError::NoAgent(_) => Some(Self::SoundGroupHasNoAgent),
            SoundError::LoadFailure { .. } => Some(Self::LoadAssetFailure),
            SoundError::CapacityExceeded { .. } => Some(Self::CapacityExceeded),
            SoundError::SetSoundAssetFailure { .. } => Some(Self::SetSoundAssetFailure),
            _ => None,
        }
    }
}
