//! Rodio backend
//!
//! One rodio `Sink` per agent on a shared output stream. The asset bytes are
//! decoded when the agent is given the asset (to reject bad data early) and
//! again for every `play`, since a decoder is consumed by its sink. Panned
//! sounds are folded to mono and spread over two channels by their stereo
//! gains.
//!
//! # Example
//!
//! ```no_run
//! use sound_engine::audio::backend::rodio_backend::RodioSoundHelper;
//! use sound_engine::audio::SoundManager;
//!
//! let mut manager: SoundManager = SoundManager::new();
//! manager.set_sound_helper(Box::new(RodioSoundHelper::new().unwrap())).unwrap();
//! ```

use crate::audio::helpers::{SoundAgentHelper, SoundGroupHelper, SoundHelper};
use crate::audio::{PlaySoundParams, SoundAsset, SoundError};
use rodio::source::ChannelVolume;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

type AssetDecoder = Decoder<Cursor<Arc<[u8]>>>;
type BoxedSource = Box<dyn Source<Item = i16> + Send>;

fn decode(asset: &SoundAsset) -> Result<AssetDecoder, SoundError> {
    Decoder::new(Cursor::new(asset.shared_data())).map_err(|e| SoundError::SetSoundAssetFailure {
        asset: asset.name().to_string(),
        reason: format!("Failed to decode audio: {}", e),
    })
}

/// Sound helper backed by the default output device
pub struct RodioSoundHelper {
    /// Audio output stream (must be kept alive)
    _output_stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl RodioSoundHelper {
    /// Open the default output device
    ///
    /// # Errors
    /// `Backend` when no output device is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::Backend(format!("Failed to create audio output: {}", e)))?;
        log::info!("Rodio audio backend initialized");
        Ok(Self {
            _output_stream: stream,
            stream_handle,
        })
    }
}

impl SoundHelper for RodioSoundHelper {
    fn create_group_helper(&mut self, _group_name: &str) -> Box<dyn SoundGroupHelper> {
        Box::new(RodioGroupHelper)
    }

    fn create_agent_helper(
        &mut self,
        group_name: &str,
        agent_index: usize,
    ) -> Result<Box<dyn SoundAgentHelper>, SoundError> {
        log::debug!("Creating rodio agent {} for group '{}'", agent_index, group_name);
        Ok(Box::new(RodioAgentHelper::new(self.stream_handle.clone())))
    }

    fn release_sound_asset(&mut self, asset: SoundAsset) {
        log::trace!("Released sound asset '{}'", asset.name());
    }
}

/// Rodio has no submix buses; group changes arrive through agent volumes
pub struct RodioGroupHelper;

impl SoundGroupHelper for RodioGroupHelper {}

/// One rodio sink
pub struct RodioAgentHelper {
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    asset: Option<SoundAsset>,
    volume: f32,
    mute: bool,
}

impl RodioAgentHelper {
    fn new(stream_handle: OutputStreamHandle) -> Self {
        Self {
            stream_handle,
            sink: None,
            asset: None,
            volume: 1.0,
            mute: false,
        }
    }

    fn apply_volume(&self) {
        if let Some(sink) = &self.sink {
            sink.set_volume(if self.mute { 0.0 } else { self.volume });
        }
    }
}

impl SoundAgentHelper for RodioAgentHelper {
    fn set_sound_asset(&mut self, asset: &SoundAsset) -> Result<(), SoundError> {
        decode(asset)?;
        self.asset = Some(asset.clone());
        Ok(())
    }

    fn play(&mut self, params: &PlaySoundParams) {
        let Some(asset) = &self.asset else {
            log::warn!("Rodio agent asked to play without an asset");
            return;
        };

        let sink = match Sink::try_new(&self.stream_handle) {
            Ok(sink) => sink,
            Err(e) => {
                log::error!("Failed to create sink for '{}': {}", asset.name(), e);
                return;
            }
        };
        let source = match decode(asset) {
            Ok(source) => source,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        let mut source: BoxedSource = Box::new(
            source
                .skip_duration(Duration::from_secs_f32(params.time.max(0.0)))
                .speed(params.pitch.max(0.01)),
        );
        // ChannelVolume folds to mono; centred sounds are left untouched.
        if params.pan_stereo.abs() > f32::EPSILON {
            let (left, right) = params.stereo_gains();
            source = Box::new(ChannelVolume::new(source, vec![left, right]));
        }
        if params.looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }

        if let Some(previous) = self.sink.replace(sink) {
            previous.stop();
        }
        self.apply_volume();
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.apply_volume();
    }

    fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
        self.apply_volume();
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().is_some_and(Sink::empty)
    }

    fn reset(&mut self) {
        self.stop();
        self.asset = None;
        self.volume = 1.0;
        self.mute = false;
    }
}
