//! Oscillator with multiple waveform support
//!
//! Each voice ramps in over a few milliseconds and ramps out when released,
//! so starting and stopping notes does not click.

use instruments_core::Waveform;
use std::f32::consts::PI;

/// Seconds to reach full level after start
const ATTACK_SECONDS: f32 = 0.005;
/// Seconds to fade to silence after release
const RELEASE_SECONDS: f32 = 0.05;

/// Per-note oscillator state with a linear attack/release ramp
pub struct Oscillator {
    frequency: f32,
    phase: f32,
    sample_rate: f32,
    waveform: Waveform,
    level: f32,
    target: f32,
    step: f32,
}

impl Oscillator {
    pub fn new(frequency: f32, sample_rate: f32, waveform: Waveform) -> Self {
        Self {
            frequency,
            phase: 0.0,
            sample_rate,
            waveform,
            level: 0.0,
            target: 1.0,
            step: 1.0 / (ATTACK_SECONDS * sample_rate).max(1.0),
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Start fading out
    pub fn release(&mut self) {
        self.target = 0.0;
        self.step = self.level.max(f32::EPSILON) / (RELEASE_SECONDS * self.sample_rate).max(1.0);
    }

    pub fn is_releasing(&self) -> bool {
        self.target == 0.0
    }

    /// Released and fully faded
    pub fn is_finished(&self) -> bool {
        self.is_releasing() && self.level <= 0.0
    }

    /// Generate the next sample
    pub fn next_sample(&mut self) -> f32 {
        let value = self.generate_waveform();

        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        if self.level < self.target {
            self.level = (self.level + self.step).min(self.target);
        } else if self.level > self.target {
            self.level = (self.level - self.step).max(self.target);
        }

        value * self.level
    }

    /// Raw waveform value at the current phase (0.0 to 1.0)
    fn generate_waveform(&self) -> f32 {
        match self.waveform {
            Waveform::Sine => (2.0 * PI * self.phase).sin(),
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
        }
    }
}
