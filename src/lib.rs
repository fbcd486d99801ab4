//! # Instruments
//!
//! A keyboard piano whose note timing is delegated to a background thread.
//!
//! An [`Instrument`] registers itself with the timing delegate to obtain an
//! id, then plays notes into an [`audio::AudioHost`]. Every timed note holds
//! a slot until the delegate answers its `Note.stop` request, correlated by
//! request token and checked against the instrument and note ids.
//!
//! ## Modules
//!
//! - `timing`: the delegate thread, the command client and response matching.
//! - `instrument`: registration, note slots and delayed stops.
//! - `audio`: the oscillator host boundary, a cpal engine and a silent host.
//! - `commands` and `repl`: the interactive terminal front end.
//!
//! Pure value types (notes, chords, protocol messages) live in
//! `instruments_core`.

pub mod audio;
pub mod commands;
pub mod config;
pub mod error;
pub mod instrument;
pub mod repl;
pub mod timing;

pub use crate::config::{InstrumentConfig, PianoConfig};
pub use crate::error::{InstrumentError, ProtocolError};
pub use crate::instrument::{Instrument, SessionState};
pub use crate::timing::{CommandClient, Matcher, Timer};
pub use instruments_core::{Chord, ChordType, Note, NoteLength, Playable, Waveform};
