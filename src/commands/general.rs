//! General REPL commands (help, quit, keyboard settings)

use crate::commands::{CommandContext, CommandOutcome};
use colored::*;
use instruments_core::{ChordType, NoteLength};

/// Lowest and highest base octave the keyboard can be shifted to
const OCTAVE_RANGE: std::ops::RangeInclusive<i32> = 0..=8;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandOutcome {
    print_help();
    CommandOutcome::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandOutcome {
    CommandOutcome::Exit
}

/// Handle `octave [n]` command
pub fn cmd_octave(args: &str, ctx: &mut CommandContext) -> CommandOutcome {
    if args.is_empty() {
        return CommandOutcome::Message(format!("Base octave: {}", ctx.config.base_octave));
    }

    match args.parse::<i32>() {
        Ok(octave) if OCTAVE_RANGE.contains(&octave) => {
            ctx.config.base_octave = octave;
            CommandOutcome::Message(
                format!("🎹 Base octave set to {}", octave)
                    .bright_green()
                    .to_string(),
            )
        }
        _ => CommandOutcome::Error(format!(
            "Invalid octave. Use a value between {}-{}",
            OCTAVE_RANGE.start(),
            OCTAVE_RANGE.end()
        )),
    }
}

/// Handle `length [ms|hold]` command
pub fn cmd_length(args: &str, ctx: &mut CommandContext) -> CommandOutcome {
    if args.is_empty() {
        return CommandOutcome::Message(format!(
            "Note length: {}",
            ctx.config.instrument.note_length
        ));
    }

    match args.parse::<NoteLength>() {
        Ok(length) => {
            ctx.config.instrument.note_length = length;
            let hint = if length.is_indefinite() {
                " (use 'stop' to silence held notes)"
            } else {
                ""
            };
            CommandOutcome::Message(
                format!("⏱ Note length set to {}{}", length, hint)
                    .bright_green()
                    .to_string(),
            )
        }
        Err(e) => CommandOutcome::Error(e.to_string()),
    }
}

/// Handle `chord [type|off]` command
pub fn cmd_chord(args: &str, ctx: &mut CommandContext) -> CommandOutcome {
    match args {
        "" => CommandOutcome::Message(match ctx.config.chord {
            Some(chord) => format!("Keys play {} chords", chord),
            None => "Keys play single notes".to_string(),
        }),
        "off" | "none" => {
            ctx.config.chord = None;
            CommandOutcome::Message("Keys play single notes".bright_green().to_string())
        }
        name => match name.parse::<ChordType>() {
            Ok(chord) => {
                ctx.config.chord = Some(chord);
                CommandOutcome::Message(
                    format!("🎶 Keys play {} chords", chord)
                        .bright_green()
                        .to_string(),
                )
            }
            Err(e) => CommandOutcome::Error(e.to_string()),
        },
    }
}

/// Handle `keys` command
pub fn cmd_keys(_args: &str, ctx: &mut CommandContext) -> CommandOutcome {
    let layout: Vec<String> = ctx
        .keymap
        .keys()
        .filter_map(|key| {
            ctx.keymap
                .note_for(key, ctx.config.base_octave)
                .map(|note| format!("{}={}", key, note))
        })
        .collect();
    CommandOutcome::Message(layout.join("  "))
}

/// Print help information
fn print_help() {
    println!("{}", "🎹 Instruments Help".bold());
    println!("{}", "===================".bold());
    println!();
    println!("{}", "Keyboard:".green());
    println!(
        "  {}  - Type keys to play (lower row {}, upper row {})",
        "zxcvbnm".cyan(),
        "z = C".cyan(),
        "s d g h j".cyan()
    );
    println!("  {}               - Show the key layout", "keys".cyan());
    println!("  {}         - Show or set the base octave", "octave [n]".cyan());
    println!(
        "  {}  - Show or set the note length",
        "length [ms|hold]".cyan()
    );
    println!(
        "  {}   - Play keys as chords (major, minor, sus2, sus4, aug)",
        "chord [type|off]".cyan()
    );
    println!();
    println!("{}", "Playback:".green());
    println!(
        "  {}  - Play a note, chord or key index",
        "play <source> [len]".cyan()
    );
    println!("      e.g. {}, {}, {}", "play C#4".cyan(), "play C4:minor 250".cyan(), "play 48".cyan());
    println!("  {}    - Stop one note or all notes", "stop [id|all]".cyan());
    println!("  {}              - List sounding notes", "notes".cyan());
    println!();
    println!("{}", "Timing delegate:".green());
    println!(
        "  {}  - Send a raw command",
        "send <Path> [args]".cyan()
    );
    println!(
        "      e.g. {}, {}",
        "send Instruments.getNextId".cyan(),
        "send Note.stop 0 3 500".cyan()
    );
    println!();
    println!("{}", "Other Commands:".green());
    println!("  {}              - Show this help", "help".bright_green());
    println!("  {}              - Exit the REPL", "quit".bright_red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_context;
    use crate::timing::Timer;

    #[test]
    fn test_octave_bounds() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);

        assert!(matches!(cmd_octave("3", &mut ctx), CommandOutcome::Message(_)));
        assert_eq!(ctx.config.base_octave, 3);
        assert!(matches!(cmd_octave("12", &mut ctx), CommandOutcome::Error(_)));
        assert!(matches!(cmd_octave("low", &mut ctx), CommandOutcome::Error(_)));
        assert_eq!(ctx.config.base_octave, 3);
    }

    #[test]
    fn test_length_and_chord_settings() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);

        cmd_length("hold", &mut ctx);
        assert_eq!(ctx.config.instrument.note_length, NoteLength::Indefinite);
        cmd_length("120ms", &mut ctx);
        assert_eq!(ctx.config.instrument.note_length, NoteLength::Millis(120));
        assert!(matches!(cmd_length("soon", &mut ctx), CommandOutcome::Error(_)));

        cmd_chord("sus4", &mut ctx);
        assert_eq!(ctx.config.chord, Some(ChordType::Sus4));
        cmd_chord("off", &mut ctx);
        assert_eq!(ctx.config.chord, None);
        assert!(matches!(cmd_chord("ninth", &mut ctx), CommandOutcome::Error(_)));
    }

    #[test]
    fn test_keys_lists_layout() {
        let timer = Timer::start();
        let mut ctx = test_context(&timer);
        match cmd_keys("", &mut ctx) {
            CommandOutcome::Message(layout) => assert!(layout.contains("z=C5")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
