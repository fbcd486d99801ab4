use crate::error::ArgumentError;
use crate::types::chord::Chord;
use crate::types::note::{Note, NoteLength, KEY_INDEX_RANGE};
use std::fmt;
use std::str::FromStr;

const SOURCE_KINDS: [&str; 3] = ["Note", "Chord", "Key index"];

/// Anything an instrument can play
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Playable {
    Note(Note),
    Chord(Chord),
    /// Raw keyboard index, 0 = A0
    Key(i32),
}

impl Playable {
    /// The individual notes to sound; key indices take `key_length`
    pub fn notes(&self, key_length: NoteLength) -> Vec<Note> {
        match self {
            Playable::Note(note) => vec![*note],
            Playable::Chord(chord) => chord.notes().to_vec(),
            Playable::Key(index) => vec![Note::from_index(*index).with_length(key_length)],
        }
    }

    /// Same source with every note set to `length`
    pub fn with_length(self, length: NoteLength) -> Self {
        match self {
            Playable::Note(note) => Playable::Note(note.with_length(length)),
            Playable::Chord(chord) => Playable::Chord(chord.with_length(length)),
            Playable::Key(index) => Playable::Note(Note::from_index(index).with_length(length)),
        }
    }
}

impl From<Note> for Playable {
    fn from(note: Note) -> Self {
        Playable::Note(note)
    }
}

impl From<Chord> for Playable {
    fn from(chord: Chord) -> Self {
        Playable::Chord(chord)
    }
}

impl From<i32> for Playable {
    fn from(index: i32) -> Self {
        Playable::Key(index)
    }
}

impl FromStr for Playable {
    type Err = ArgumentError;

    /// `39` is a key index, `C4:major` a chord, `C#4` a note
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ArgumentError::not_defined("source", 1));
        }

        let not_acceptable = || ArgumentError::not_acceptable_of("source", 1, &SOURCE_KINDS);

        if let Ok(index) = s.parse::<i64>() {
            return i32::try_from(index)
                .ok()
                .filter(|index| KEY_INDEX_RANGE.contains(index))
                .map(Playable::Key)
                .ok_or_else(not_acceptable);
        }
        if s.contains(':') {
            return s
                .parse::<Chord>()
                .map(Playable::Chord)
                .map_err(|_| not_acceptable());
        }
        s.parse::<Note>()
            .map(Playable::Note)
            .map_err(|_| not_acceptable())
    }
}

impl fmt::Display for Playable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Playable::Note(note) => write!(f, "{}", note),
            Playable::Chord(chord) => write!(f, "{}", chord),
            Playable::Key(index) => write!(f, "key #{}", index),
        }
    }
}
