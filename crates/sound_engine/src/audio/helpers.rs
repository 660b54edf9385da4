//! Collaborator interfaces supplied by the host
//!
//! The manager never decodes, mixes or fetches anything itself. It talks to
//! these traits only, so a host can plug in a real output device, a silent
//! backend or a test fake.
//!
//! # Threading
//! None of the helpers are required to be `Send`. Everything is driven from
//! `SoundManager::update` on the host's thread; asynchronous loaders buffer
//! their results and hand them over in `ResourceManager::poll_events`.

use crate::audio::{PlaySoundParams, SerialId, SoundAsset, SoundError};

/// Request passed to the resource manager when a sound is played
#[derive(Debug, Clone, PartialEq)]
pub struct LoadAssetRequest {
    /// Serial id the result must be reported under
    pub serial_id: SerialId,
    /// Name of the sound asset to load
    pub asset_name: String,
    /// Priority of the playback request (loaders may schedule by it)
    pub priority: i32,
}

/// Result delivered by the resource manager into the tick
#[derive(Debug, Clone)]
pub enum LoadAssetEvent {
    /// A dependency of the asset finished loading
    DependencyAsset {
        /// Request this progress belongs to
        serial_id: SerialId,
        /// Dependency that was loaded
        dependency_asset_name: String,
        /// Dependencies loaded so far
        loaded_count: usize,
        /// Total dependencies of the asset
        total_count: usize,
    },
    /// The asset and all of its dependencies are available
    Success {
        /// Request that completed
        serial_id: SerialId,
        /// Loaded asset
        asset: SoundAsset,
    },
    /// The asset or a dependency could not be loaded
    Failure {
        /// Request that failed
        serial_id: SerialId,
        /// Loader-supplied reason
        reason: String,
    },
}

impl LoadAssetEvent {
    /// Serial id this event reports on
    pub fn serial_id(&self) -> SerialId {
        match self {
            Self::DependencyAsset { serial_id, .. }
            | Self::Success { serial_id, .. }
            | Self::Failure { serial_id, .. } => *serial_id,
        }
    }
}

/// Asset loading collaborator
pub trait ResourceManager {
    /// Start loading an asset; the result arrives through `poll_events`
    fn load_asset(&mut self, request: LoadAssetRequest);

    /// Abandon an in-flight load
    ///
    /// Return true when the loader may still report this request through
    /// `poll_events`. The manager then waits for that one late `Success` or
    /// `Failure`, drops it and releases any asset it carries. Return false
    /// when the request is gone for good; the manager forgets the id at once
    /// and treats any later result for it as unknown.
    fn cancel_load(&mut self, serial_id: SerialId) -> bool;

    /// Drain results that completed since the last call
    fn poll_events(&mut self) -> Vec<LoadAssetEvent>;
}

/// Backend factory and asset owner
pub trait SoundHelper {
    /// Create the backend object for a new group
    fn create_group_helper(&mut self, group_name: &str) -> Box<dyn SoundGroupHelper>;

    /// Create one playback channel for a group
    ///
    /// # Errors
    /// `Backend` when the device cannot provide another channel.
    fn create_agent_helper(
        &mut self,
        group_name: &str,
        agent_index: usize,
    ) -> Result<Box<dyn SoundAgentHelper>, SoundError>;

    /// Take back an asset the manager no longer needs
    fn release_sound_asset(&mut self, asset: SoundAsset);
}

/// Group-level backend hooks (submix buses and the like)
pub trait SoundGroupHelper {
    /// Group mute changed
    fn on_mute_changed(&mut self, _mute: bool) {}

    /// Group volume changed
    fn on_volume_changed(&mut self, _volume: f32) {}
}

/// One physical or logical playback channel
pub trait SoundAgentHelper {
    /// Bind an asset; called before `play`
    ///
    /// # Errors
    /// `SetSoundAssetFailure` or `Backend` when the asset cannot be decoded.
    fn set_sound_asset(&mut self, asset: &SoundAsset) -> Result<(), SoundError>;

    /// Start the bound asset
    fn play(&mut self, params: &PlaySoundParams);

    /// Stop playback immediately
    fn stop(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Resume paused playback
    fn resume(&mut self);

    /// Apply the effective output volume (0.0 to 1.0)
    fn set_volume(&mut self, volume: f32);

    /// Apply the effective mute state
    fn set_mute(&mut self, mute: bool);

    /// True once a non-looping clip reached its natural end
    fn is_finished(&self) -> bool;

    /// Advance backend-side time; called once per tick while not paused
    fn update(&mut self, _elapse_seconds: f32) {}

    /// Unbind the asset and return to the initial state
    fn reset(&mut self);
}
