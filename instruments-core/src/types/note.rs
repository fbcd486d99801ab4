use anyhow::{anyhow, Result};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

/// Frequency of keyboard position 0 (A0), the reference for every note
pub const A0_FREQUENCY: f32 = 27.5;

/// Octaves accepted from text, C-1 through B10
pub const OCTAVE_RANGE: RangeInclusive<i32> = -1..=10;

/// Keyboard indices accepted from text, matching `OCTAVE_RANGE`
pub const KEY_INDEX_RANGE: RangeInclusive<i32> = -21..=122;

/// The twelve pitch names, in keyboard order starting from A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PitchName {
    A,
    ASharp,
    B,
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
}

impl PitchName {
    pub const ALL: [PitchName; 12] = [
        PitchName::A,
        PitchName::ASharp,
        PitchName::B,
        PitchName::C,
        PitchName::CSharp,
        PitchName::D,
        PitchName::DSharp,
        PitchName::E,
        PitchName::F,
        PitchName::FSharp,
        PitchName::G,
        PitchName::GSharp,
    ];

    /// Semitones above C within an octave (C = 0 .. B = 11)
    pub fn semitones_from_c(self) -> i32 {
        match self {
            PitchName::C => 0,
            PitchName::CSharp => 1,
            PitchName::D => 2,
            PitchName::DSharp => 3,
            PitchName::E => 4,
            PitchName::F => 5,
            PitchName::FSharp => 6,
            PitchName::G => 7,
            PitchName::GSharp => 8,
            PitchName::A => 9,
            PitchName::ASharp => 10,
            PitchName::B => 11,
        }
    }

    /// Inverse of `semitones_from_c`, wrapping any integer into the octave
    pub fn from_semitones_from_c(semitones: i32) -> PitchName {
        // ALL starts at A, which sits 9 semitones above C
        PitchName::ALL[(semitones.rem_euclid(12) as usize + 3) % 12]
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchName::A => "A",
            PitchName::ASharp => "A#",
            PitchName::B => "B",
            PitchName::C => "C",
            PitchName::CSharp => "C#",
            PitchName::D => "D",
            PitchName::DSharp => "D#",
            PitchName::E => "E",
            PitchName::F => "F",
            PitchName::FSharp => "F#",
            PitchName::G => "G",
            PitchName::GSharp => "G#",
        }
    }
}

impl FromStr for PitchName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let pitch = match s.trim().to_uppercase().as_str() {
            "C" | "B#" | "BS" => PitchName::C,
            "C#" | "CS" | "DB" => PitchName::CSharp,
            "D" => PitchName::D,
            "D#" | "DS" | "EB" => PitchName::DSharp,
            "E" | "FB" => PitchName::E,
            "F" | "E#" | "ES" => PitchName::F,
            "F#" | "FS" | "GB" => PitchName::FSharp,
            "G" => PitchName::G,
            "G#" | "GS" | "AB" => PitchName::GSharp,
            "A" => PitchName::A,
            "A#" | "AS" | "BB" => PitchName::ASharp,
            "B" | "CB" => PitchName::B,
            other => return Err(anyhow!("Invalid pitch name: {}", other)),
        };
        Ok(pitch)
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How long a note sounds before the timing delegate stops it
///
/// `Millis(0)` stops as soon as the delegate sees the request. `Indefinite`
/// notes are never scheduled; they are held until released explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteLength {
    Millis(u64),
    #[default]
    Indefinite,
}

impl NoteLength {
    /// Delay until the stop fires, `None` for held notes
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            NoteLength::Millis(ms) => Some(Duration::from_millis(*ms)),
            NoteLength::Indefinite => None,
        }
    }

    pub fn is_indefinite(&self) -> bool {
        matches!(self, NoteLength::Indefinite)
    }
}

impl FromStr for NoteLength {
    type Err = anyhow::Error;

    /// Accepts `500`, `500ms`, `hold`, `indefinite` or `-1`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "hold" | "indefinite" | "-1" => Ok(NoteLength::Indefinite),
            _ => s
                .trim_end_matches("ms")
                .parse::<u64>()
                .map(NoteLength::Millis)
                .map_err(|_| anyhow!("Invalid note length: {}", s)),
        }
    }
}

impl fmt::Display for NoteLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteLength::Millis(ms) => write!(f, "{}ms", ms),
            NoteLength::Indefinite => write!(f, "hold"),
        }
    }
}

/// A pitched note with a playing length
///
/// Octaves follow scientific pitch notation (they roll over at C), and the
/// keyboard index counts semitones above A0, so `A4` sits at index 48 and
/// sounds at 440 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    scale: PitchName,
    octave: i32,
    length: NoteLength,
}

impl Note {
    /// Create a held note
    pub fn new(scale: PitchName, octave: i32) -> Self {
        Note {
            scale,
            octave,
            length: NoteLength::Indefinite,
        }
    }

    /// Create the note at a keyboard index (0 = A0)
    ///
    /// Indices within 9 semitones of `i32::MAX` saturate.
    pub fn from_index(index: i32) -> Self {
        let from_c0 = index.saturating_add(9);
        Note::new(
            PitchName::from_semitones_from_c(from_c0),
            from_c0.div_euclid(12),
        )
    }

    pub fn with_length(mut self, length: NoteLength) -> Self {
        self.length = length;
        self
    }

    pub fn scale(&self) -> PitchName {
        self.scale
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn length(&self) -> NoteLength {
        self.length
    }

    /// Keyboard index: semitones above A0, saturating for extreme octaves
    pub fn note_index(&self) -> i32 {
        self.octave
            .saturating_mul(12)
            .saturating_add(self.scale.semitones_from_c() - 9)
    }

    /// Frequency in Hz, equal temperament from A0
    pub fn frequency(&self) -> f32 {
        A0_FREQUENCY * 2.0_f32.powf(self.note_index() as f32 / 12.0)
    }

    /// Shift by a number of semitones, keeping the length
    pub fn transpose(self, semitones: i32) -> Note {
        Note::from_index(self.note_index().saturating_add(semitones)).with_length(self.length)
    }
}

impl FromStr for Note {
    type Err = anyhow::Error;

    /// Parses `C#4`, `Db3`, `A-1`; the octave defaults to 4
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .char_indices()
            .find(|(i, c)| *i > 0 && (c.is_ascii_digit() || *c == '-'))
            .map(|(i, _)| i)
            .unwrap_or(s.len());

        let (name_part, octave_part) = s.split_at(split);
        if name_part.is_empty() {
            return Err(anyhow!("Missing note name"));
        }

        let scale: PitchName = name_part.parse()?;
        let octave = if octave_part.is_empty() {
            4
        } else {
            octave_part
                .parse::<i32>()
                .ok()
                .filter(|octave| OCTAVE_RANGE.contains(octave))
                .ok_or_else(|| anyhow!("Invalid octave: {}", octave_part))?
        };

        Ok(Note::new(scale, octave))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.scale, self.octave)
    }
}
