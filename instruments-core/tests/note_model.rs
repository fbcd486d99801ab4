use instruments_core::types::{Chord, ChordType, KeyMap, Note, NoteLength, PitchName, Playable};

#[test]
fn test_from_index_round_trip_across_keyboard() {
    for index in 0..=1000 {
        let note = Note::from_index(index);
        assert_eq!(note.note_index(), index, "{}", note);
    }
}

#[test]
fn test_reference_pitch_and_neighbours() {
    let a4: Note = "A4".parse().unwrap();
    assert!((a4.frequency() - 440.0).abs() < 1e-3);

    // One semitone up is the twelfth root of two
    let a_sharp = a4.transpose(1);
    let ratio = a_sharp.frequency() / a4.frequency();
    assert!((ratio - 2f32.powf(1.0 / 12.0)).abs() < 1e-5);
}

#[test]
fn test_chord_from_key_press() {
    // The 'z' key at the default base octave, played as a major chord
    let keymap = KeyMap::default();
    let root = keymap
        .note_for('z', 5)
        .unwrap()
        .with_length(NoteLength::Millis(400));
    let chord = Chord::of(root, ChordType::Major);

    let expected = [
        Note::new(PitchName::C, 5),
        Note::new(PitchName::E, 5),
        Note::new(PitchName::G, 5),
    ];
    for (tone, want) in chord.notes().iter().zip(expected) {
        assert_eq!(tone.note_index(), want.note_index());
        assert_eq!(tone.length(), NoteLength::Millis(400));
    }
}

#[test]
fn test_playable_sources_expand_to_notes() {
    let sources: Vec<Playable> = ["C4", "C4:sus2", "0"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let counts: Vec<usize> = sources
        .iter()
        .map(|s| s.notes(NoteLength::Indefinite).len())
        .collect();
    assert_eq!(counts, vec![1, 3, 1]);
    assert_eq!(
        sources[2].notes(NoteLength::Indefinite)[0].to_string(),
        "A0"
    );
}

#[test]
fn test_out_of_range_sources_are_rejected() {
    for source in ["2147483647", "-2147483648", "123", "C999999999", "A-2", "C4:0,2147483647"] {
        let err = source.parse::<Playable>().unwrap_err();
        assert_eq!(err.name(), "source", "{}", source);
        assert_eq!(err.position(), 1, "{}", source);
    }
    assert!("C999999999".parse::<Note>().is_err());

    // Both ends of the accepted range still play
    let lowest: Playable = "-21".parse().unwrap();
    let highest: Playable = "122".parse().unwrap();
    assert_eq!(lowest.notes(NoteLength::Indefinite)[0].to_string(), "C-1");
    assert_eq!(highest.notes(NoteLength::Indefinite)[0].to_string(), "B10");
    assert_eq!("B10".parse::<Note>().unwrap().note_index(), 122);
}

#[test]
fn test_extreme_indices_do_not_overflow() {
    let top = Note::from_index(i32::MAX);
    assert!(top.note_index() > 0);
    assert!(Note::from_index(i32::MIN).note_index() < 0);
    assert!(Note::from_index(i32::MIN).frequency() >= 0.0);
    assert!(Note::new(PitchName::C, i32::MAX).note_index() > 0);
    assert!(Note::new(PitchName::C, i32::MIN).note_index() < 0);
    assert_eq!(
        Note::new(PitchName::A, 4).transpose(i32::MAX).note_index(),
        top.note_index()
    );
}
