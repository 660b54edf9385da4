//! Sound helper backends
//!
//! Implementations of the helper traits the manager drives:
//! - `null_backend`: silent, simulates clip length; always available
//! - `rodio_backend`: real output through rodio sinks (feature `rodio`)

pub mod null_backend;

#[cfg(feature = "rodio")]
pub mod rodio_backend;

use crate::audio::helpers::SoundHelper;
use crate::audio::SoundError;
use serde::{Deserialize, Serialize};

/// Which backend a config asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// Silent simulation
    #[default]
    Null,
    /// Default output device through rodio
    Rodio,
}

/// Create the sound helper for a backend kind
///
/// # Errors
/// `Configuration` when the crate was built without the requested backend,
/// `Backend` when the output device cannot be opened.
pub fn create_sound_helper(kind: BackendKind) -> Result<Box<dyn SoundHelper>, SoundError> {
    match kind {
        BackendKind::Null => Ok(Box::new(null_backend::NullSoundHelper::new())),
        #[cfg(feature = "rodio")]
        BackendKind::Rodio => Ok(Box::new(rodio_backend::RodioSoundHelper::new()?)),
        #[cfg(not(feature = "rodio"))]
        BackendKind::Rodio => Err(SoundError::Configuration(
            "sound_engine was built without the `rodio` feature".to_string(),
        )),
    }
}
