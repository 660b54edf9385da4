//! Play sound parameters
//!
//! Immutable description of how a single playback request should sound.
//! Values are clamped into range by the builder setters, so an agent never
//! sees an out-of-range volume, pan or blend.

use crate::foundation::math::Vec3;

/// Lowest priority a request may carry
pub const MIN_PRIORITY: i32 = -128;

/// Highest priority a request may carry
pub const MAX_PRIORITY: i32 = 127;

/// Parameters for one playback request
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySoundParams {
    /// Start offset into the clip in seconds
    pub time: f32,
    /// Mute this sound regardless of the group's mute state
    pub mute_in_sound_group: bool,
    /// Loop the clip until stopped
    pub looping: bool,
    /// Allocation priority; higher wins
    pub priority: i32,
    /// Volume relative to the group (0.0 to 1.0)
    pub volume_in_sound_group: f32,
    /// Fade-in duration when playback starts
    pub fade_in_seconds: f32,
    /// Playback speed multiplier
    pub pitch: f32,
    /// Stereo pan (-1.0 left to 1.0 right)
    pub pan_stereo: f32,
    /// How much distance attenuation applies (0.0 = 2D, 1.0 = fully 3D)
    pub spatial_blend: f32,
    /// Distance at which the sound becomes inaudible
    pub max_distance: f32,
    /// Start paused once an agent is assigned
    pub pause_on_start: bool,
    /// World position for spatial sounds
    pub position: Option<Vec3>,
}

impl Default for PlaySoundParams {
    fn default() -> Self {
        Self {
            time: 0.0,
            mute_in_sound_group: false,
            looping: false,
            priority: 0,
            volume_in_sound_group: 1.0,
            fade_in_seconds: 0.0,
            pitch: 1.0,
            pan_stereo: 0.0,
            spatial_blend: 0.0,
            max_distance: 100.0,
            pause_on_start: false,
            position: None,
        }
    }
}

impl PlaySoundParams {
    /// Create parameters with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the allocation priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority.clamp(MIN_PRIORITY, MAX_PRIORITY);
        self
    }

    /// Set volume relative to the group
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume_in_sound_group = volume.clamp(0.0, 1.0);
        self
    }

    /// Loop the clip
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Mute inside the group
    pub fn with_mute(mut self, mute: bool) -> Self {
        self.mute_in_sound_group = mute;
        self
    }

    /// Fade in over the given duration
    pub fn with_fade_in(mut self, seconds: f32) -> Self {
        self.fade_in_seconds = seconds.max(0.0);
        self
    }

    /// Start at an offset into the clip
    pub fn with_time(mut self, seconds: f32) -> Self {
        self.time = seconds.max(0.0);
        self
    }

    /// Set playback speed
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch.max(0.0);
        self
    }

    /// Set stereo pan
    pub fn with_pan(mut self, pan: f32) -> Self {
        self.pan_stereo = pan.clamp(-1.0, 1.0);
        self
    }

    /// Position the sound in the world
    ///
    /// A positioned sound defaults to fully spatial; call `with_spatial_blend`
    /// afterwards to mix in some of the unattenuated signal.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self.spatial_blend = 1.0;
        self
    }

    /// Set the 2D/3D blend
    pub fn with_spatial_blend(mut self, blend: f32) -> Self {
        self.spatial_blend = blend.clamp(0.0, 1.0);
        self
    }

    /// Set the inaudible distance
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance.max(0.0);
        self
    }

    /// Hold the sound paused once it has an agent
    pub fn with_pause_on_start(mut self, pause: bool) -> Self {
        self.pause_on_start = pause;
        self
    }

    /// Left and right channel gains for `pan_stereo`
    ///
    /// Balance law: the far side is attenuated, the near side stays at 1.0.
    pub fn stereo_gains(&self) -> (f32, f32) {
        let pan = self.pan_stereo.clamp(-1.0, 1.0);
        ((1.0 - pan).min(1.0), (1.0 + pan).min(1.0))
    }
}
