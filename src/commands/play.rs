//! Note playback commands

use crate::commands::{CommandContext, CommandOutcome};
use colored::*;
use instruments_core::{Chord, NoteLength, Playable};

/// Handle `play <note|chord|key> [length]`
pub fn cmd_play(args: &str, ctx: &mut CommandContext) -> CommandOutcome {
    if args.is_empty() {
        return CommandOutcome::Error("Usage: play <note|chord|key index> [length]".to_string());
    }

    let (source, length) = split_length(args, ctx.config.instrument.note_length);
    let playable = match source.parse::<Playable>() {
        Ok(playable) => playable,
        Err(e) => return CommandOutcome::Error(e.to_string()),
    };

    let label = playable.to_string();
    match ctx.instrument.play_for(playable, length) {
        Ok(ids) => CommandOutcome::Message(
            format!("🎹 {} for {} (notes {:?})", label, length, ids)
                .bright_green()
                .to_string(),
        ),
        Err(e) => CommandOutcome::Error(e.to_string()),
    }
}

/// Handle `stop [all|<note id>]`
pub fn cmd_stop(args: &str, ctx: &mut CommandContext) -> CommandOutcome {
    if args.is_empty() || args == "all" {
        let stopped = ctx.instrument.stop_all();
        return CommandOutcome::Message(format!("⏹ Stopped {} notes", stopped));
    }

    match args.parse::<usize>() {
        Ok(note_id) if ctx.instrument.release(note_id) => {
            CommandOutcome::Message(format!("⏹ Stopped note {}", note_id))
        }
        Ok(note_id) => CommandOutcome::Error(format!("Note {} is not playing", note_id)),
        Err(_) => CommandOutcome::Error("Usage: stop [all|<note id>]".to_string()),
    }
}

/// Handle `notes`
pub fn cmd_notes(_args: &str, ctx: &mut CommandContext) -> CommandOutcome {
    let instrument = match ctx.instrument.id() {
        Some(id) => format!("Instrument {}", id),
        None => "Instrument (unregistered)".to_string(),
    };
    let ids = ctx.instrument.active_note_ids();
    if ids.is_empty() {
        return CommandOutcome::Message(format!("{} [{}]: no notes playing", instrument, ctx.instrument.state()));
    }
    CommandOutcome::Message(format!(
        "{} [{}]: {} playing {:?}",
        instrument,
        ctx.instrument.state(),
        ids.len(),
        ids
    ))
}

/// Play each mapped character of `input` as a piano key
pub fn play_keys(input: &str, ctx: &mut CommandContext) -> CommandOutcome {
    let length = ctx.config.instrument.note_length;
    let mut played = Vec::new();
    let mut unmapped = Vec::new();

    for key in input.chars().filter(|c| !c.is_whitespace()) {
        let Some(note) = ctx.keymap.note_for(key, ctx.config.base_octave) else {
            unmapped.push(key);
            continue;
        };
        let playable = match ctx.config.chord {
            Some(chord_type) => Playable::Chord(Chord::of(note, chord_type)),
            None => Playable::Note(note),
        };
        let label = playable.to_string();
        if let Err(e) = ctx.instrument.play_for(playable, length) {
            return CommandOutcome::Error(e.to_string());
        }
        played.push(label);
    }

    if played.is_empty() {
        return CommandOutcome::Error(format!(
            "Unknown command or key: '{}' (type 'help' or 'keys')",
            input
        ));
    }

    let mut message = format!("♪ {}", played.join(" ")).cyan().to_string();
    if !unmapped.is_empty() {
        let skipped: String = unmapped.into_iter().collect();
        message.push_str(&format!(" (skipped '{}')", skipped).dimmed().to_string());
    }
    CommandOutcome::Message(message)
}

/// Split a trailing length token off `args`, if there is one
fn split_length(args: &str, default: NoteLength) -> (&str, NoteLength) {
    if let Some((source, last)) = args.rsplit_once(char::is_whitespace) {
        if let Ok(length) = last.parse::<NoteLength>() {
            return (source.trim(), length);
        }
    }
    (args, default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_context;
    use crate::timing::Timer;
    use std::thread;
    use std::time::{Duration, Instant};

    fn wait_until(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn test_split_length() {
        let default = NoteLength::Millis(500);
        assert_eq!(split_length("C4", default), ("C4", default));
        assert_eq!(split_length("40 250", default), ("40", NoteLength::Millis(250)));
        assert_eq!(
            split_length("C4:major hold", default),
            ("C4:major", NoteLength::Indefinite)
        );
    }

    #[test]
    fn test_play_chord_then_release() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);

        let outcome = cmd_play("C4:major 200", &mut ctx);
        assert!(matches!(outcome, CommandOutcome::Message(_)), "{:?}", outcome);
        assert_eq!(ctx.instrument.active_note_ids(), vec![0, 1, 2]);

        assert!(wait_until(|| ctx.instrument.active_notes() == 0));
    }

    #[test]
    fn test_play_rejects_unknown_source() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);
        match cmd_play("H9", &mut ctx) {
            CommandOutcome::Error(e) => assert!(e.contains("'source'"), "{}", e),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_stop_held_notes() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);

        cmd_play("A4 hold", &mut ctx);
        cmd_play("E4 hold", &mut ctx);
        assert_eq!(ctx.instrument.active_notes(), 2);

        assert_eq!(
            cmd_stop("1", &mut ctx),
            CommandOutcome::Message("⏹ Stopped note 1".to_string())
        );
        assert!(matches!(cmd_stop("1", &mut ctx), CommandOutcome::Error(_)));
        assert_eq!(
            cmd_stop("", &mut ctx),
            CommandOutcome::Message("⏹ Stopped 1 notes".to_string())
        );
    }

    #[test]
    fn test_keys_play_through_keymap() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);
        ctx.config.instrument.note_length = NoteLength::Indefinite;

        assert!(matches!(play_keys("z q", &mut ctx), CommandOutcome::Message(_)));
        assert_eq!(ctx.instrument.active_notes(), 1);

        ctx.config.chord = Some(instruments_core::ChordType::Minor);
        play_keys("x", &mut ctx);
        assert_eq!(ctx.instrument.active_notes(), 4);

        assert!(matches!(play_keys("qqq", &mut ctx), CommandOutcome::Error(_)));
    }
}
