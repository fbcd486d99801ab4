//! Instrument and piano settings

use instruments_core::{ChordType, NoteLength, Waveform};
use std::time::Duration;

/// Settings for a single instrument
#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentConfig {
    /// Oscillator shape for every note
    pub waveform: Waveform,
    /// Length applied to notes played without one
    pub note_length: NoteLength,
    /// How long `play` waits for registration before giving up
    pub ready_timeout: Duration,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            note_length: NoteLength::Indefinite,
            ready_timeout: Duration::from_secs(2),
        }
    }
}

impl InstrumentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_note_length(mut self, length: NoteLength) -> Self {
        self.note_length = length;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }
}

/// Settings for the keyboard piano front end
#[derive(Clone, Debug, PartialEq)]
pub struct PianoConfig {
    pub instrument: InstrumentConfig,
    /// Octave of the lowest row of keys
    pub base_octave: i32,
    /// Play each key as this chord instead of a single note
    pub chord: Option<ChordType>,
    /// Output level of the mixer (0.0 to 1.0)
    pub gain: f32,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            instrument: InstrumentConfig::default().with_note_length(NoteLength::Millis(500)),
            base_octave: 5,
            chord: None,
            gain: 0.3,
        }
    }
}

impl PianoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instrument(mut self, instrument: InstrumentConfig) -> Self {
        self.instrument = instrument;
        self
    }

    pub fn with_base_octave(mut self, octave: i32) -> Self {
        self.base_octave = octave;
        self
    }

    /// Play chords of this type (None for single notes)
    pub fn with_chord(mut self, chord: Option<ChordType>) -> Self {
        self.chord = chord;
        self
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PianoConfig::default();
        assert_eq!(config.base_octave, 5);
        assert_eq!(config.chord, None);
        // Typed keys fall silent on their own
        assert_eq!(config.instrument.note_length, NoteLength::Millis(500));
        assert_eq!(config.instrument.waveform, Waveform::Sine);
        assert_eq!(
            InstrumentConfig::default().note_length,
            NoteLength::Indefinite
        );
    }

    #[test]
    fn test_builders() {
        let config = PianoConfig::new()
            .with_base_octave(3)
            .with_chord(Some(ChordType::Minor))
            .with_gain(4.0)
            .with_instrument(
                InstrumentConfig::new()
                    .with_waveform(Waveform::Saw)
                    .with_note_length(NoteLength::Millis(250))
                    .with_ready_timeout(Duration::from_millis(100)),
            );

        assert_eq!(config.base_octave, 3);
        assert_eq!(config.chord, Some(ChordType::Minor));
        assert_eq!(config.gain, 1.0);
        assert_eq!(config.instrument.waveform, Waveform::Saw);
        assert_eq!(config.instrument.note_length, NoteLength::Millis(250));
        assert_eq!(config.instrument.ready_timeout, Duration::from_millis(100));
    }
}
