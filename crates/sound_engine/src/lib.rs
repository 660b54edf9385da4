//! # Sound Engine
//!
//! Runtime sound-playback management for interactive applications.
//!
//! ## Features
//!
//! - **Sound groups**: named agent pools with their own mute, volume and
//!   same-priority replacement policy
//! - **Priority stealing**: a request takes a free agent, or evicts the
//!   lowest-priority sound below it
//! - **Serial ids**: stable handles to stop, pause, resume and fade a request
//! - **Lifecycle events**: success, failure, per-tick update and dependency
//!   progress, delivered on the host's tick
//! - **Pluggable backends**: silent null backend, optional rodio output
//!
//! ## Quick Start
//!
//! ```rust
//! use sound_engine::prelude::*;
//!
//! let mut resources = MemoryResourceManager::new();
//! resources.register("laser", b"RIFF....WAVE".to_vec(), Some(0.4));
//!
//! let mut manager: SoundManager = SoundManager::new();
//! manager.set_resource_manager(Box::new(resources)).unwrap();
//! manager.set_sound_helper(Box::new(NullSoundHelper::new())).unwrap();
//!
//! let config = SoundConfig {
//!     groups: vec![SoundGroupConfig { name: "sfx".into(), agent_count: 4, ..Default::default() }],
//!     ..Default::default()
//! };
//! manager.apply_config(&config).unwrap();
//!
//! manager.on_play_sound_success(|args| println!("{} started", args.serial_id));
//! let id = manager.play_sound("laser", "sfx", PlaySoundParams::new().with_priority(2), None).unwrap();
//! manager.update(1.0 / 60.0);
//! assert!(manager.stop_sound(id, 0.25));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod audio;
pub mod config;
pub mod foundation;

/// Common imports for sound engine users
pub mod prelude {
    pub use crate::{
        assets::MemoryResourceManager,
        audio::{
            backend::null_backend::NullSoundHelper, create_sound_helper, BackendKind, PlaySoundErrorCode,
            PlaySoundParams, PlaybackState, SerialId, SoundConfig, SoundError, SoundGroupConfig, SoundManager,
        },
        config::{Config, ConfigError},
        foundation::math::Vec3,
    };
}
