//! REPL (Read-Eval-Print Loop) for the keyboard piano

use crate::commands::{create_registry, play, CommandContext, CommandOutcome, CommandRegistry};
use anyhow::{anyhow, Result};
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use instruments_core::InstrumentId;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};
use std::thread;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
    /// The instrument finished registering
    Ready(InstrumentId),
}

/// Interactive piano prompt
pub struct Repl {
    editor: Option<DefaultEditor>,
    registry: CommandRegistry,
    ctx: CommandContext,
    tx_events: Sender<ReplEvent>,
    rx_events: Receiver<ReplEvent>,
}

impl Repl {
    pub fn new(ctx: CommandContext) -> RustylineResult<Self> {
        let editor = DefaultEditor::new()?;
        let (tx_events, rx_events) = unbounded();

        let tx_ready = tx_events.clone();
        ctx.instrument.on_initialized(move |id| {
            let _ = tx_ready.send(ReplEvent::Ready(id));
        });

        Ok(Repl {
            editor: Some(editor),
            registry: create_registry(),
            ctx,
            tx_events,
            rx_events,
        })
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!(
            "{} {}",
            "🎹".bright_yellow(),
            "Instruments keyboard piano".bright_cyan().bold()
        );
        println!(
            "Type keys like {} to play, or commands like {}, {}",
            "zxcv".cyan(),
            "play C4:major".cyan(),
            "octave 4".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| anyhow!("REPL is already running"))?;
        let tx_input = self.tx_events.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "piano>".bright_magenta().bold());
            match editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        let rx_events = self.rx_events.clone();
        for event in rx_events.iter() {
            match event {
                ReplEvent::Ready(id) => {
                    println!("{}", format!("Instrument {} ready", id).dimmed());
                }
                ReplEvent::Input(Ok(line)) => {
                    if line.is_empty() {
                        continue;
                    }
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                ReplEvent::Input(Err(ReadlineError::Interrupted | ReadlineError::Eof)) => {
                    println!("{} 🎹", "Goodbye!".bright_cyan());
                    break;
                }
                ReplEvent::Input(Err(err)) => {
                    println!(
                        "{} {}",
                        "Error reading input:".bright_red().bold(),
                        err.to_string().red()
                    );
                    break;
                }
            }
        }

        self.ctx.instrument.stop_all();
        Ok(())
    }

    /// Run one line; false once the user asked to leave
    fn handle_line(&mut self, line: &str) -> bool {
        let outcome = match self.registry.execute(line, &mut self.ctx) {
            CommandOutcome::NotACommand => play::play_keys(line, &mut self.ctx),
            outcome => outcome,
        };

        match outcome {
            CommandOutcome::Success | CommandOutcome::NotACommand => true,
            CommandOutcome::Message(msg) => {
                println!("{}", msg);
                true
            }
            CommandOutcome::Error(e) => {
                println!("{} {}", "Error:".bright_red().bold(), e.red());
                true
            }
            CommandOutcome::Exit => {
                println!("{} 🎹", "Goodbye!".bright_cyan());
                false
            }
        }
    }
}
