use super::{AudioHost, SoundHandle};
use anyhow::Result;
use instruments_core::Waveform;
use log::debug;

/// Host that produces no sound, for machines without an output device
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentHost;

impl AudioHost for SilentHost {
    fn create_oscillator(
        &self,
        frequency: f32,
        waveform: Waveform,
    ) -> Result<Box<dyn SoundHandle>> {
        Ok(Box::new(SilentSound {
            frequency,
            waveform,
            started: false,
        }))
    }
}

struct SilentSound {
    frequency: f32,
    waveform: Waveform,
    started: bool,
}

impl SoundHandle for SilentSound {
    fn start(&mut self) -> Result<()> {
        self.started = true;
        debug!("(silent) {} at {:.2} Hz", self.waveform, self.frequency);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.started {
            debug!("(silent) stop {:.2} Hz", self.frequency);
            self.started = false;
        }
        Ok(())
    }

    fn frequency(&self) -> f32 {
        self.frequency
    }
}
