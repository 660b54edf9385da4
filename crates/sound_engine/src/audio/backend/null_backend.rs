//! Silent backend
//!
//! Plays nothing but keeps time, so the manager sees clips end after the
//! asset's declared length. Used for headless runs and tests.

use crate::audio::helpers::{SoundAgentHelper, SoundGroupHelper, SoundHelper};
use crate::audio::{PlaySoundParams, SoundAsset, SoundError};

/// Sound helper producing silent agents
#[derive(Debug, Default)]
pub struct NullSoundHelper {
    released: usize,
}

impl NullSoundHelper {
    /// Create a null sound helper
    pub fn new() -> Self {
        Self::default()
    }

    /// Assets handed back so far
    pub fn released_count(&self) -> usize {
        self.released
    }
}

impl SoundHelper for NullSoundHelper {
    fn create_group_helper(&mut self, _group_name: &str) -> Box<dyn SoundGroupHelper> {
        Box::new(NullGroupHelper)
    }

    fn create_agent_helper(
        &mut self,
        _group_name: &str,
        _agent_index: usize,
    ) -> Result<Box<dyn SoundAgentHelper>, SoundError> {
        Ok(Box::new(NullAgentHelper::new()))
    }

    fn release_sound_asset(&mut self, asset: SoundAsset) {
        self.released += 1;
        log::trace!("Released sound asset '{}'", asset.name());
    }
}

/// Group helper with no side effects
#[derive(Debug, Default)]
pub struct NullGroupHelper;

impl SoundGroupHelper for NullGroupHelper {}

/// Silent channel that tracks playback time
#[derive(Debug, Default)]
pub struct NullAgentHelper {
    length: Option<f32>,
    elapsed: f32,
    looping: bool,
    playing: bool,
    paused: bool,
    volume: f32,
    mute: bool,
    gains: (f32, f32),
}

impl NullAgentHelper {
    /// Create an idle channel
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            gains: (1.0, 1.0),
            ..Self::default()
        }
    }

    /// Last volume applied
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Last mute state applied
    pub fn is_muted(&self) -> bool {
        self.mute
    }

    /// Left and right gains of the current sound
    pub fn stereo_gains(&self) -> (f32, f32) {
        self.gains
    }
}

impl SoundAgentHelper for NullAgentHelper {
    fn set_sound_asset(&mut self, asset: &SoundAsset) -> Result<(), SoundError> {
        self.length = asset.length();
        Ok(())
    }

    fn play(&mut self, params: &PlaySoundParams) {
        self.elapsed = params.time;
        self.looping = params.looping;
        self.gains = params.stereo_gains();
        self.playing = true;
        self.paused = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    fn is_finished(&self) -> bool {
        self.playing
            && !self.looping
            && self.length.is_some_and(|length| self.elapsed >= length)
    }

    fn update(&mut self, elapse_seconds: f32) {
        if self.playing && !self.paused {
            self.elapsed += elapse_seconds;
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_finishes_after_length() {
        let mut helper = NullAgentHelper::new();
        let asset = SoundAsset::from_bytes("step", b"RIFF....").unwrap().with_length(1.0);
        helper.set_sound_asset(&asset).unwrap();
        helper.play(&PlaySoundParams::default());

        helper.update(0.5);
        assert!(!helper.is_finished());
        helper.update(0.5);
        assert!(helper.is_finished());
    }

    #[test]
    fn test_paused_clip_does_not_advance() {
        let mut helper = NullAgentHelper::new();
        let asset = SoundAsset::from_bytes("step", b"RIFF....").unwrap().with_length(1.0);
        helper.set_sound_asset(&asset).unwrap();
        helper.play(&PlaySoundParams::default());
        helper.pause();

        helper.update(2.0);
        assert!(!helper.is_finished());
    }

    #[test]
    fn test_unknown_length_never_finishes() {
        let mut helper = NullAgentHelper::new();
        let asset = SoundAsset::new("stream", Vec::new(), crate::audio::AudioFormat::Unknown);
        helper.set_sound_asset(&asset).unwrap();
        helper.play(&PlaySoundParams::default());
        helper.update(100.0);
        assert!(!helper.is_finished());
    }

    #[test]
    fn test_pan_applied_on_play() {
        let mut helper = NullAgentHelper::new();
        assert_eq!(helper.stereo_gains(), (1.0, 1.0));

        helper.play(&PlaySoundParams::new().with_pan(0.5));
        assert_eq!(helper.stereo_gains(), (0.5, 1.0));

        helper.reset();
        assert_eq!(helper.stereo_gains(), (1.0, 1.0));
    }
}
