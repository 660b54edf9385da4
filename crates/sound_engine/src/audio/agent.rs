//! Sound agent
//!
//! One agent wraps exactly one playback channel. It owns the per-sound
//! state (serial id, parameters, fade ramp, playback clock) and drives the
//! backend helper through the playback state machine:
//!
//! ```text
//! Idle -> Playing -> { Paused <-> Playing, FadingOut } -> Stopped -> Idle
//! ```
//!
//! `Loading` never appears on an agent: a request is Loading while the
//! manager waits on the resource manager, and only gets an agent once its
//! asset is available. `Stopped` lasts until the next tick, when the agent
//! resets, releases its asset and becomes Idle again.

use crate::audio::helpers::SoundAgentHelper;
use crate::audio::spatial::SpatialAudio;
use crate::audio::{PlaySoundParams, SerialId, SoundAsset, SoundError};

/// Playback state of a request or agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// No sound bound
    Idle,
    /// Asset or dependencies still loading
    Loading,
    /// Audible
    Playing,
    /// Paused, keeps its agent
    Paused,
    /// Volume ramping down towards a stop or a pause
    FadingOut,
    /// Finished; the agent resets on the next tick
    Stopped,
}

/// Group-level mix settings applied on top of per-sound values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupMix {
    /// Group mute
    pub mute: bool,
    /// Group volume
    pub volume: f32,
}

/// What happens when a fade-out completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadeEnd {
    Stop,
    Pause,
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    then: Option<FadeEnd>,
}

impl Fade {
    fn new(from: f32, to: f32, duration: f32, then: Option<FadeEnd>) -> Self {
        Self { from, to, duration, elapsed: 0.0, then }
    }

    fn advance(&mut self, delta: f32) -> f32 {
        self.elapsed = (self.elapsed + delta).min(self.duration);
        self.value()
    }

    fn value(&self) -> f32 {
        let progress = if self.duration > 0.0 { self.elapsed / self.duration } else { 1.0 };
        self.from + (self.to - self.from) * progress
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Result of starting a sound on an agent that was refused
#[derive(Debug)]
pub(crate) struct StartRejected {
    /// Why the helper refused the asset
    pub error: SoundError,
    /// The asset, returned for release
    pub asset: SoundAsset,
}

/// One playback channel and its current sound
pub struct SoundAgent {
    index: usize,
    helper: Box<dyn SoundAgentHelper>,
    state: PlaybackState,
    serial_id: Option<SerialId>,
    asset: Option<SoundAsset>,
    params: PlaySoundParams,
    /// Allocation order, lower = started earlier
    sequence: u64,
    time: f32,
    fade_factor: f32,
    fade: Option<Fade>,
    spatial_gain: f32,
}

impl SoundAgent {
    /// Wrap a backend channel
    pub(crate) fn new(index: usize, helper: Box<dyn SoundAgentHelper>) -> Self {
        Self {
            index,
            helper,
            state: PlaybackState::Idle,
            serial_id: None,
            asset: None,
            params: PlaySoundParams::default(),
            sequence: 0,
            time: 0.0,
            fade_factor: 1.0,
            fade: None,
            spatial_gain: 1.0,
        }
    }

    /// Index within the owning group
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Serial id of the bound sound, including a just-stopped one
    pub fn serial_id(&self) -> Option<SerialId> {
        self.serial_id
    }

    /// Serial id of a sound that can still be controlled
    pub fn active_serial_id(&self) -> Option<SerialId> {
        if self.is_busy() {
            self.serial_id
        } else {
            None
        }
    }

    /// Priority of the current sound
    pub fn priority(&self) -> i32 {
        self.params.priority
    }

    /// Allocation order of the current sound
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Parameters of the current sound
    pub fn params(&self) -> &PlaySoundParams {
        &self.params
    }

    /// Bound asset
    pub fn asset(&self) -> Option<&SoundAsset> {
        self.asset.as_ref()
    }

    /// Playback position in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// True when a sound occupies the channel
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::FadingOut
        )
    }

    /// True when the channel can take a new sound without eviction
    pub fn is_available(&self) -> bool {
        !self.is_busy()
    }

    /// True when the channel is producing sound this tick
    pub fn is_audible(&self) -> bool {
        matches!(self.state, PlaybackState::Playing | PlaybackState::FadingOut)
    }

    /// Effective mute: group mute or per-sound mute
    pub fn is_muted(&self, mix: GroupMix) -> bool {
        mix.mute || self.params.mute_in_sound_group
    }

    /// Volume sent to the backend, 0.0 when muted
    pub fn effective_volume(&self, mix: GroupMix) -> f32 {
        if self.is_muted(mix) {
            return 0.0;
        }
        self.mixed_volume(mix)
    }

    fn mixed_volume(&self, mix: GroupMix) -> f32 {
        mix.volume * self.params.volume_in_sound_group * self.fade_factor * self.spatial_gain
    }

    /// Push mute and volume to the backend
    pub(crate) fn refresh(&mut self, mix: GroupMix) {
        let mute = self.is_muted(mix);
        let volume = self.mixed_volume(mix);
        self.helper.set_mute(mute);
        self.helper.set_volume(volume);
    }

    /// Bind an asset and start playing it
    ///
    /// The channel must be free; the group evicts before calling this.
    ///
    /// # Errors
    /// Returns the asset when the helper refuses it. The agent stays Idle.
    pub(crate) fn start(
        &mut self,
        serial_id: SerialId,
        asset: SoundAsset,
        params: PlaySoundParams,
        sequence: u64,
        mix: GroupMix,
        spatial: &SpatialAudio,
    ) -> Result<(), StartRejected> {
        debug_assert!(self.is_available(), "agent {} started while busy", self.index);

        if let Err(error) = self.helper.set_sound_asset(&asset) {
            self.helper.reset();
            return Err(StartRejected { error, asset });
        }

        self.spatial_gain = spatial.gain(params.position, params.max_distance, params.spatial_blend);
        if params.fade_in_seconds > 0.0 {
            self.fade_factor = 0.0;
            self.fade = Some(Fade::new(0.0, 1.0, params.fade_in_seconds, None));
        } else {
            self.fade_factor = 1.0;
            self.fade = None;
        }

        self.serial_id = Some(serial_id);
        self.asset = Some(asset);
        self.time = params.time;
        self.sequence = sequence;
        self.params = params;

        self.refresh(mix);
        self.helper.play(&self.params);
        self.state = PlaybackState::Playing;

        if self.params.pause_on_start {
            self.helper.pause();
            self.state = PlaybackState::Paused;
        }

        Ok(())
    }

    /// Stop the current sound, optionally fading out first
    ///
    /// Returns false when nothing is playing or a fade-out towards a stop
    /// is already running.
    pub(crate) fn stop(&mut self, fade_out_seconds: f32, mix: GroupMix) -> bool {
        match self.state {
            PlaybackState::Playing | PlaybackState::FadingOut if fade_out_seconds > 0.0 => {
                if matches!(self.fade, Some(Fade { then: Some(FadeEnd::Stop), .. })) {
                    return false;
                }
                self.fade = Some(Fade::new(self.fade_factor, 0.0, fade_out_seconds, Some(FadeEnd::Stop)));
                self.state = PlaybackState::FadingOut;
                self.refresh(mix);
                true
            }
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::FadingOut => {
                self.stop_now();
                true
            }
            _ => false,
        }
    }

    /// Free the channel for another sound, stopping whatever it holds
    ///
    /// Returns the previous serial id and its asset unless the agent was
    /// already Idle.
    pub(crate) fn evict(&mut self) -> Option<(SerialId, Option<SoundAsset>)> {
        let serial_id = self.serial_id?;
        if self.is_busy() {
            self.stop_now();
        }
        Some((serial_id, self.reset()))
    }

    /// Pause the current sound, optionally fading out first
    pub(crate) fn pause(&mut self, fade_out_seconds: f32, mix: GroupMix) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }

        if fade_out_seconds > 0.0 {
            self.fade = Some(Fade::new(self.fade_factor, 0.0, fade_out_seconds, Some(FadeEnd::Pause)));
            self.state = PlaybackState::FadingOut;
        } else {
            self.fade = None;
            self.helper.pause();
            self.state = PlaybackState::Paused;
        }
        self.refresh(mix);
        true
    }

    /// Resume a paused sound, optionally fading in
    ///
    /// A fade-out towards a pause can be resumed too; the ramp turns around
    /// from the current level.
    pub(crate) fn resume(&mut self, fade_in_seconds: f32, mix: GroupMix) -> bool {
        match self.state {
            PlaybackState::Paused => {
                self.helper.resume();
                if fade_in_seconds > 0.0 {
                    self.fade_factor = 0.0;
                }
            }
            PlaybackState::FadingOut
                if matches!(self.fade, Some(Fade { then: Some(FadeEnd::Pause), .. })) => {}
            _ => return false,
        }

        self.fade = if fade_in_seconds > 0.0 {
            Some(Fade::new(self.fade_factor, 1.0, fade_in_seconds, None))
        } else {
            self.fade_factor = 1.0;
            None
        };
        self.state = PlaybackState::Playing;
        self.refresh(mix);
        true
    }

    /// Advance one tick
    ///
    /// Returns the asset to release when a sound stopped on the previous
    /// tick and the agent went back to Idle.
    pub(crate) fn update(&mut self, elapse_seconds: f32, mix: GroupMix, spatial: &SpatialAudio) -> Option<SoundAsset> {
        match self.state {
            PlaybackState::Stopped => return self.reset(),
            PlaybackState::Playing | PlaybackState::FadingOut => {}
            _ => return None,
        }

        self.helper.update(elapse_seconds);
        self.advance_clock(elapse_seconds);

        if let Some(fade) = self.fade.as_mut() {
            self.fade_factor = fade.advance(elapse_seconds);
            log::trace!("Agent {} fade at {:.3}", self.index, self.fade_factor);
            if fade.is_complete() {
                let then = fade.then;
                self.fade = None;
                match then {
                    Some(FadeEnd::Stop) => {
                        self.stop_now();
                        return None;
                    }
                    Some(FadeEnd::Pause) => {
                        self.helper.pause();
                        self.state = PlaybackState::Paused;
                    }
                    None => {}
                }
            }
        }

        if self.state != PlaybackState::Paused && !self.params.looping && self.helper.is_finished() {
            log::debug!("Agent {} reached the end of {:?}", self.index, self.serial_id);
            self.stop_now();
            return None;
        }

        self.spatial_gain = spatial.gain(self.params.position, self.params.max_distance, self.params.spatial_blend);
        self.refresh(mix);
        None
    }

    fn advance_clock(&mut self, elapse_seconds: f32) {
        self.time += elapse_seconds * self.params.pitch;
        if let Some(length) = self.asset.as_ref().and_then(SoundAsset::length) {
            if self.params.looping && length > 0.0 {
                self.time %= length;
            } else {
                self.time = self.time.min(length);
            }
        }
    }

    fn stop_now(&mut self) {
        self.helper.stop();
        self.fade = None;
        self.state = PlaybackState::Stopped;
    }

    /// Unbind everything and return to Idle
    pub(crate) fn reset(&mut self) -> Option<SoundAsset> {
        self.helper.reset();
        self.state = PlaybackState::Idle;
        self.serial_id = None;
        self.params = PlaySoundParams::default();
        self.time = 0.0;
        self.fade_factor = 1.0;
        self.fade = None;
        self.spatial_gain = 1.0;
        self.asset.take()
    }
}
