//! # Instruments Core
//!
//! Thread-free building blocks for the Instruments keyboard piano: the note
//! and chord model, the keyboard map, first-fit identifier allocation and the
//! message types spoken between an instrument and its timing delegate.
//!
//! ## Features
//!
//! - **serde**: derive `Serialize`/`Deserialize` for model and message types
//!
//! ## Example
//!
//! ```
//! use instruments_core::types::{Chord, ChordType, Note, PitchName};
//!
//! let c4 = Note::new(PitchName::C, 4);
//! let triad = Chord::of(c4, ChordType::Major);
//! assert_eq!(triad.to_string(), "[C4 E4 G4]");
//! ```

pub mod allocator;
pub mod error;
pub mod protocol;
pub mod types;

// Re-export commonly used types
pub use allocator::{next_id, SlotTable};
pub use error::{ArgumentError, CommandError, UnknownCommandError};
pub use protocol::{
    ArgValue, Command, CommandKind, CommandRequest, CommandResponse, CommandResult, InstrumentId,
    NoteId, NoteStop, RequestId,
};
pub use types::{Chord, ChordType, KeyMap, Note, NoteLength, PitchName, Playable, Waveform};
