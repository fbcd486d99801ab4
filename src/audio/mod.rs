//! Host audio boundary
//!
//! The instrument only needs to create oscillators and start/stop them. The
//! cpal engine mixes started oscillators into the default output device; the
//! silent host stands in when no device is available.

pub mod engine;
pub mod mixer;
pub mod oscillator;
pub mod silent;

pub use engine::AudioEngine;
pub use mixer::{Mixer, MixerHandle};
pub use oscillator::Oscillator;
pub use silent::SilentHost;

use anyhow::Result;
use instruments_core::Waveform;

/// A single sounding oscillator
pub trait SoundHandle: Send {
    /// Begin sounding
    fn start(&mut self) -> Result<()>;
    /// Fade out and release the voice
    fn stop(&mut self) -> Result<()>;
    fn frequency(&self) -> f32;
}

/// Creates oscillators connected to the host's output
pub trait AudioHost: Send + Sync {
    fn create_oscillator(&self, frequency: f32, waveform: Waveform)
        -> Result<Box<dyn SoundHandle>>;
}
