use crate::error::ArgumentError;
use crate::types::note::{Note, NoteLength};
use anyhow::{anyhow, Result};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Semitone offsets accepted in a textual interval list
const INTERVAL_RANGE: RangeInclusive<i32> = -48..=48;

/// Named interval tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChordType {
    Major,
    Minor,
    Sus2,
    Sus4,
    Aug,
}

impl ChordType {
    pub const ALL: [ChordType; 5] = [
        ChordType::Major,
        ChordType::Minor,
        ChordType::Sus2,
        ChordType::Sus4,
        ChordType::Aug,
    ];

    /// Semitone offsets from the root
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ChordType::Major => &[0, 4, 7],
            ChordType::Minor => &[0, 3, 7],
            ChordType::Sus2 => &[0, 2, 7],
            ChordType::Sus4 => &[0, 5, 7],
            ChordType::Aug => &[0, 4, 8],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChordType::Major => "major",
            ChordType::Minor => "minor",
            ChordType::Sus2 => "sus2",
            ChordType::Sus4 => "sus4",
            ChordType::Aug => "aug",
        }
    }
}

impl FromStr for ChordType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" | "maj" => Ok(ChordType::Major),
            "minor" | "min" | "m" => Ok(ChordType::Minor),
            "sus2" => Ok(ChordType::Sus2),
            "sus4" | "sus" => Ok(ChordType::Sus4),
            "aug" | "augmented" | "+" => Ok(ChordType::Aug),
            other => Err(anyhow!("Unknown chord type: {}", other)),
        }
    }
}

impl fmt::Display for ChordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A root note plus semitone offsets; every chord tone inherits the root's length
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chord {
    root: Note,
    intervals: Vec<i32>,
    notes: Vec<Note>,
}

impl Chord {
    /// Build a chord from explicit intervals; an empty list is rejected
    pub fn new(root: Note, intervals: &[i32]) -> Result<Self, ArgumentError> {
        if intervals.is_empty() {
            return Err(ArgumentError::not_acceptable_of(
                "type",
                2,
                &["non-empty interval list"],
            ));
        }

        let notes = intervals
            .iter()
            .map(|offset| root.transpose(*offset))
            .collect();

        Ok(Chord {
            root,
            intervals: intervals.to_vec(),
            notes,
        })
    }

    /// Build a chord from a named interval table
    pub fn of(root: Note, chord_type: ChordType) -> Self {
        Chord {
            root,
            intervals: chord_type.intervals().to_vec(),
            notes: chord_type
                .intervals()
                .iter()
                .map(|offset| root.transpose(*offset))
                .collect(),
        }
    }

    pub fn root(&self) -> Note {
        self.root
    }

    pub fn intervals(&self) -> &[i32] {
        &self.intervals
    }

    /// Chord tones in interval order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Same chord with every tone set to `length`
    pub fn with_length(&self, length: NoteLength) -> Self {
        Chord {
            root: self.root.with_length(length),
            intervals: self.intervals.clone(),
            notes: self.notes.iter().map(|n| n.with_length(length)).collect(),
        }
    }
}

impl FromStr for Chord {
    type Err = anyhow::Error;

    /// Parses `C4:major` or `C4:0,3,7`
    fn from_str(s: &str) -> Result<Self> {
        let (root_part, kind_part) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Expected <root>:<type>, got {}", s))?;
        let root: Note = root_part.parse()?;

        if let Ok(chord_type) = kind_part.parse::<ChordType>() {
            return Ok(Chord::of(root, chord_type));
        }

        let intervals = kind_part
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<i32>()
                    .ok()
                    .filter(|offset| INTERVAL_RANGE.contains(offset))
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| anyhow!("Invalid chord type: {}", kind_part))?;
        Ok(Chord::new(root, &intervals)?)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.notes.iter().map(|n| n.to_string()).collect();
        write!(f, "[{}]", names.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::note::PitchName;

    #[test]
    fn test_c_major_triad() {
        let chord = Chord::of(Note::new(PitchName::C, 4), ChordType::Major);
        let names: Vec<String> = chord.notes().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["C4", "E4", "G4"]);
    }

    #[test]
    fn test_all_interval_tables() {
        let root = Note::new(PitchName::A, 3);
        let expected = [
            (ChordType::Major, ["A3", "C#4", "E4"]),
            (ChordType::Minor, ["A3", "C4", "E4"]),
            (ChordType::Sus2, ["A3", "B3", "E4"]),
            (ChordType::Sus4, ["A3", "D4", "E4"]),
            (ChordType::Aug, ["A3", "C#4", "F4"]),
        ];
        for (chord_type, names) in expected {
            let chord = Chord::of(root, chord_type);
            let rendered: Vec<String> = chord.notes().iter().map(|n| n.to_string()).collect();
            assert_eq!(rendered, names, "{}", chord_type);
        }
    }

    #[test]
    fn test_tones_inherit_root_length() {
        let root = Note::new(PitchName::G, 2).with_length(NoteLength::Millis(120));
        let chord = Chord::of(root, ChordType::Minor);
        assert!(chord
            .notes()
            .iter()
            .all(|n| n.length() == NoteLength::Millis(120)));

        let held = chord.with_length(NoteLength::Indefinite);
        assert!(held.notes().iter().all(|n| n.length().is_indefinite()));
    }

    #[test]
    fn test_empty_intervals_rejected() {
        let err = Chord::new(Note::new(PitchName::C, 4), &[]).unwrap_err();
        assert_eq!(err.name(), "type");
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn test_chord_parsing() {
        let named: Chord = "D4:min".parse().unwrap();
        assert_eq!(named.to_string(), "[D4 F4 A4]");

        let custom: Chord = "C4:0,7,12".parse().unwrap();
        assert_eq!(custom.to_string(), "[C4 G4 C5]");
        assert_eq!(custom.intervals(), &[0, 7, 12]);

        assert!("C4".parse::<Chord>().is_err());
        assert!("C4:wide".parse::<Chord>().is_err());
    }
}
