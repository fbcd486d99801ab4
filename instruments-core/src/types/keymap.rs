//! Computer keyboard to piano key mapping
//!
//! The bottom letter row plays the white keys and the row above it the black
//! keys, spanning C to F over two octaves.

use crate::types::note::{Note, PitchName};
use std::collections::BTreeMap;

/// Pitch and octave offset bound to a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyBinding {
    pub scale: PitchName,
    pub octave_offset: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyMap {
    bindings: BTreeMap<char, KeyBinding>,
}

impl KeyMap {
    /// A map with no bindings
    pub fn empty() -> Self {
        KeyMap {
            bindings: BTreeMap::new(),
        }
    }

    pub fn bind(&mut self, key: char, scale: PitchName, octave_offset: i32) {
        self.bindings.insert(
            key,
            KeyBinding {
                scale,
                octave_offset,
            },
        );
    }

    pub fn lookup(&self, key: char) -> Option<KeyBinding> {
        self.bindings.get(&key.to_ascii_lowercase()).copied()
    }

    /// The held note a key plays when the keyboard starts at `base_octave`
    pub fn note_for(&self, key: char, base_octave: i32) -> Option<Note> {
        self.lookup(key)
            .map(|binding| Note::new(binding.scale, base_octave + binding.octave_offset))
    }

    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.bindings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        use PitchName::*;

        let mut map = KeyMap::empty();
        let layout = [
            ('z', C, 0),
            ('s', CSharp, 0),
            ('x', D, 0),
            ('d', DSharp, 0),
            ('c', E, 0),
            ('v', F, 0),
            ('g', FSharp, 0),
            ('b', G, 0),
            ('h', GSharp, 0),
            ('n', A, 0),
            ('j', ASharp, 0),
            ('m', B, 0),
            (',', C, 1),
            ('l', CSharp, 1),
            ('.', D, 1),
            (';', DSharp, 1),
            ('/', E, 1),
            ('\\', F, 1),
        ];
        for (key, scale, offset) in layout {
            map.bind(key, scale, offset);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_is_chromatic() {
        let map = KeyMap::default();
        assert_eq!(map.len(), 18);

        let order = "zsxdcvgbhnjm,l.;/\\";
        let indices: Vec<i32> = order
            .chars()
            .map(|key| map.note_for(key, 5).unwrap().note_index())
            .collect();
        for pair in indices.windows(2) {
            assert_eq!(pair[1] - pair[0], 1);
        }
    }

    #[test]
    fn test_second_octave_offset() {
        let map = KeyMap::default();
        assert_eq!(map.note_for('z', 5).unwrap().to_string(), "C5");
        assert_eq!(map.note_for(',', 5).unwrap().to_string(), "C6");
        assert_eq!(map.note_for('\\', 3).unwrap().to_string(), "F4");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map = KeyMap::default();
        assert_eq!(map.lookup('Z'), map.lookup('z'));
        assert_eq!(map.lookup('q'), None);
    }
}
