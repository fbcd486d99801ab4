//! Command registry for REPL commands
//!
//! Input that matches no registered prefix is played as piano keys.

pub mod delegate;
pub mod general;
pub mod play;

use crate::config::PianoConfig;
use crate::instrument::Instrument;
use crate::timing::CommandClient;
use instruments_core::KeyMap;

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command, play the input as keys
    NotACommand,
    /// Error occurred
    Error(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub instrument: Instrument,
    pub client: CommandClient,
    pub config: PianoConfig,
    pub keymap: KeyMap,
}

impl CommandContext {
    pub fn new(instrument: Instrument, client: CommandClient, config: PianoConfig) -> Self {
        Self {
            instrument,
            client,
            config,
            keymap: KeyMap::default(),
        }
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandOutcome;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandOutcome {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = input[prefix.len()..].trim();
                return handler(args, ctx);
            }
        }
        CommandOutcome::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register("play", play::cmd_play);
    registry.register("stop", play::cmd_stop);
    registry.register("notes", play::cmd_notes);

    registry.register("send", delegate::cmd_send);

    registry.register("octave", general::cmd_octave);
    registry.register("length", general::cmd_length);
    registry.register("chord", general::cmd_chord);
    registry.register("keys", general::cmd_keys);
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);

    registry
}
