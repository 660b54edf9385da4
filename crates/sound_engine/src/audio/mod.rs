//! Sound playback management
//!
//! A `SoundManager` owns named `SoundGroup`s, each a pool of `SoundAgent`s
//! (one playback channel apiece). Requests are identified by a `SerialId`,
//! loaded through a `ResourceManager`, placed on an agent by priority and
//! reported back through lifecycle events.
//!
//! Decoding and output live behind the helper traits in `helpers`; see
//! `backend` for the implementations shipped with the crate.

pub mod agent;
pub mod asset;
pub mod backend;
pub mod error;
pub mod events;
pub mod group;
pub mod helpers;
pub mod manager;
pub mod params;
pub mod settings;
pub mod spatial;

pub use agent::{GroupMix, PlaybackState, SoundAgent};
pub use asset::{AudioFormat, SoundAsset};
pub use backend::{create_sound_helper, BackendKind};
pub use error::{PlaySoundErrorCode, SoundError};
pub use events::{
    EventHandlers, PlaySoundDependencyAssetEventArgs, PlaySoundFailureEventArgs, PlaySoundSuccessEventArgs,
    PlaySoundUpdateEventArgs, SoundEvent, Subscription,
};
pub use group::SoundGroup;
pub use helpers::{
    LoadAssetEvent, LoadAssetRequest, ResourceManager, SoundAgentHelper, SoundGroupHelper, SoundHelper,
};
pub use manager::{SerialId, SoundManager};
pub use params::{PlaySoundParams, MAX_PRIORITY, MIN_PRIORITY};
pub use settings::{SoundConfig, SoundGroupConfig};
pub use spatial::{SpatialAudio, SpatialConfig};
