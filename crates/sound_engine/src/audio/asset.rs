//! Sound asset handed from the resource manager to agent helpers
//!
//! Holds the encoded file bytes; decoding happens in the backend when the
//! agent helper accepts the asset. Clones share the byte buffer.

use crate::audio::SoundError;
use std::sync::Arc;

/// Encoded audio container format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// WAV uncompressed
    Wav,
    /// OGG Vorbis compressed
    Ogg,
    /// MP3 compressed
    Mp3,
    /// FLAC lossless
    Flac,
    /// Unknown format
    Unknown,
}

/// Loaded sound asset
#[derive(Debug, Clone)]
pub struct SoundAsset {
    name: String,
    data: Arc<[u8]>,
    format: AudioFormat,
    /// Clip length in seconds when known up front
    length: Option<f32>,
}

impl SoundAsset {
    /// Create an asset from raw bytes with a known format
    pub fn new(name: impl Into<String>, data: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            format,
            length: None,
        }
    }

    /// Create an asset from encoded file bytes, detecting the format
    ///
    /// # Errors
    /// `LoadFailure` when the bytes are empty or the format is not recognised.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, SoundError> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(SoundError::LoadFailure {
                asset: name,
                reason: "Empty audio file".to_string(),
            });
        }

        let format = Self::detect_format(bytes);
        if format == AudioFormat::Unknown {
            return Err(SoundError::LoadFailure {
                asset: name,
                reason: "Unknown audio format".to_string(),
            });
        }

        Ok(Self::new(name, bytes.to_vec(), format))
    }

    /// Declare the clip length
    pub fn with_length(mut self, seconds: f32) -> Self {
        self.length = Some(seconds.max(0.0));
        self
    }

    /// Asset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the encoded bytes
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Detected container format
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Declared clip length in seconds
    pub fn length(&self) -> Option<f32> {
        self.length
    }

    /// Detect audio format from magic bytes
    pub fn detect_format(bytes: &[u8]) -> AudioFormat {
        if bytes.len() < 4 {
            return AudioFormat::Unknown;
        }

        match &bytes[0..4] {
            b"RIFF" => AudioFormat::Wav,
            b"OggS" => AudioFormat::Ogg,
            b"fLaC" => AudioFormat::Flac,
            // MP3 can start with ID3 tag or frame sync
            [0xFF, 0xFB, _, _] | [0xFF, 0xFA, _, _] => AudioFormat::Mp3,
            [b'I', b'D', b'3', _] => AudioFormat::Mp3,
            _ => AudioFormat::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(SoundAsset::detect_format(b"RIFF....WAVE"), AudioFormat::Wav);
        assert_eq!(SoundAsset::detect_format(b"OggS...."), AudioFormat::Ogg);
        assert_eq!(SoundAsset::detect_format(b"fLaC...."), AudioFormat::Flac);
        assert_eq!(SoundAsset::detect_format(b"ID3\x04"), AudioFormat::Mp3);
        assert_eq!(SoundAsset::detect_format(b"ABCD"), AudioFormat::Unknown);
    }

    #[test]
    fn test_empty_data_fails() {
        let result = SoundAsset::from_bytes("empty", &[]);
        assert!(matches!(result, Err(SoundError::LoadFailure { .. })));
    }

    #[test]
    fn test_clones_share_bytes() {
        let asset = SoundAsset::from_bytes("click", b"RIFF0000WAVE").unwrap().with_length(0.25);
        let copy = asset.clone();
        assert_eq!(copy.name(), "click");
        assert_eq!(copy.length(), Some(0.25));
        assert!(std::ptr::eq(asset.data().as_ptr(), copy.data().as_ptr()));
    }
}
