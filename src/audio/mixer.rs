//! Voice mixer shared between the output stream and the instrument

use super::oscillator::Oscillator;
use super::{AudioHost, SoundHandle};
use anyhow::Result;
use instruments_core::Waveform;
use log::trace;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type VoiceId = u64;

/// Sums active oscillators into a single signal
pub struct Mixer {
    voices: Vec<(VoiceId, Oscillator)>,
    sample_rate: f32,
    gain: f32,
}

impl Mixer {
    pub fn new(sample_rate: f32, gain: f32) -> Self {
        Mixer {
            voices: Vec::new(),
            sample_rate,
            gain: gain.clamp(0.0, 1.0),
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn add(&mut self, id: VoiceId, oscillator: Oscillator) {
        self.voices.push((id, oscillator));
    }

    /// Begin the release of a voice; false if it is not sounding
    pub fn release(&mut self, id: VoiceId) -> bool {
        match self.voices.iter_mut().find(|(voice_id, _)| *voice_id == id) {
            Some((_, oscillator)) => {
                oscillator.release();
                true
            }
            None => false,
        }
    }

    /// Voices that have not finished fading out
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Next mixed sample; finished voices are dropped
    pub fn render_sample(&mut self) -> f32 {
        let summed: f32 = self
            .voices
            .iter_mut()
            .map(|(_, oscillator)| oscillator.next_sample())
            .sum();
        self.voices.retain(|(_, oscillator)| !oscillator.is_finished());
        (summed * self.gain).clamp(-1.0, 1.0)
    }
}

/// Cloneable, thread-safe access to a mixer
#[derive(Clone)]
pub struct MixerHandle {
    mixer: Arc<Mutex<Mixer>>,
    next_voice: Arc<AtomicU64>,
}

impl MixerHandle {
    pub fn new(mixer: Mixer) -> Self {
        MixerHandle {
            mixer: Arc::new(Mutex::new(mixer)),
            next_voice: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fill `out` with mono samples
    pub fn render(&self, out: &mut [f32]) {
        let mut mixer = lock(&self.mixer);
        for sample in out.iter_mut() {
            *sample = mixer.render_sample();
        }
    }

    pub fn active_voices(&self) -> usize {
        lock(&self.mixer).active_voices()
    }

    pub(crate) fn with_mixer<R>(&self, f: impl FnOnce(&mut Mixer) -> R) -> R {
        f(&mut lock(&self.mixer))
    }
}

impl AudioHost for MixerHandle {
    fn create_oscillator(
        &self,
        frequency: f32,
        waveform: Waveform,
    ) -> Result<Box<dyn SoundHandle>> {
        let id = self.next_voice.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(MixerVoice {
            id,
            frequency,
            waveform,
            mixer: self.clone(),
            started: false,
        }))
    }
}

/// Oscillator that is routed into the mixer once started
struct MixerVoice {
    id: VoiceId,
    frequency: f32,
    waveform: Waveform,
    mixer: MixerHandle,
    started: bool,
}

impl SoundHandle for MixerVoice {
    fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        let (id, frequency, waveform) = (self.id, self.frequency, self.waveform);
        self.mixer.with_mixer(|mixer| {
            let oscillator = Oscillator::new(frequency, mixer.sample_rate(), waveform);
            mixer.add(id, oscillator);
        });
        self.started = true;
        trace!("voice {} started at {:.2} Hz", self.id, self.frequency);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.started {
            let id = self.id;
            self.mixer.with_mixer(|mixer| mixer.release(id));
            trace!("voice {} released", self.id);
        }
        Ok(())
    }

    fn frequency(&self) -> f32 {
        self.frequency
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
