// instruments-core/src/types/mod.rs

pub mod audio_config;
pub mod chord;
pub mod keymap;
pub mod note;
pub mod playable;

pub use audio_config::Waveform;
pub use chord::{Chord, ChordType};
pub use keymap::{KeyBinding, KeyMap};
pub use note::{Note, NoteLength, PitchName, A0_FREQUENCY, KEY_INDEX_RANGE, OCTAVE_RANGE};
pub use playable::Playable;
