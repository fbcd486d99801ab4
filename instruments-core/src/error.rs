//! Argument and command-path errors
//!
//! Every validation error names the offending argument and its position,
//! rendered as `<'source' | 1st Argument> is not acceptable`.

use std::fmt;
use thiserror::Error;

/// 1-based position of an argument, displayed as an English ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position(pub usize);

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        let suffix = match (n % 10, n % 100) {
            (_, 11..=13) => "th",
            (1, _) => "st",
            (2, _) => "nd",
            (3, _) => "rd",
            _ => "th",
        };
        write!(f, "{}{}", n, suffix)
    }
}

/// Alternatives a caller could have passed instead
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Acceptable(pub Vec<String>);

impl fmt::Display for Acceptable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, " (expected {})", self.0.join(" | "))
        }
    }
}

/// Error raised when a call receives a missing or unusable argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgumentError {
    /// A required argument was not supplied
    #[error("<'{name}' | {position} Argument> is required")]
    NotDefined { name: String, position: Position },
    /// An argument was supplied but has the wrong type or shape
    #[error("<'{name}' | {position} Argument> is not acceptable{acceptable}")]
    NotAcceptable {
        name: String,
        position: Position,
        acceptable: Acceptable,
    },
}

impl ArgumentError {
    pub fn not_defined(name: &str, position: usize) -> Self {
        ArgumentError::NotDefined {
            name: name.to_string(),
            position: Position(position),
        }
    }

    pub fn not_acceptable(name: &str, position: usize) -> Self {
        Self::not_acceptable_of(name, position, &[])
    }

    /// Not acceptable, listing what would have been accepted
    pub fn not_acceptable_of(name: &str, position: usize, acceptable: &[&str]) -> Self {
        ArgumentError::NotAcceptable {
            name: name.to_string(),
            position: Position(position),
            acceptable: Acceptable(acceptable.iter().map(|s| s.to_string()).collect()),
        }
    }

    /// Name of the offending argument
    pub fn name(&self) -> &str {
        match self {
            ArgumentError::NotDefined { name, .. } | ArgumentError::NotAcceptable { name, .. } => {
                name
            }
        }
    }

    /// 1-based position of the offending argument
    pub fn position(&self) -> usize {
        match self {
            ArgumentError::NotDefined { position, .. }
            | ArgumentError::NotAcceptable { position, .. } => position.0,
        }
    }
}

/// A dotted command path that does not resolve to any command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Provided command '{path}' doesn't exist")]
pub struct UnknownCommandError {
    pub path: String,
}

/// Failure to turn a command path and positional arguments into a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    UnknownCommand(#[from] UnknownCommandError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101]
            .iter()
            .map(|n| Position(*n).to_string())
            .collect();
        assert_eq!(
            rendered,
            vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st"]
        );
    }

    #[test]
    fn test_not_defined_message() {
        let err = ArgumentError::not_defined("command", 1);
        assert_eq!(err.to_string(), "<'command' | 1st Argument> is required");
        assert_eq!(err.name(), "command");
        assert_eq!(err.position(), 1);
    }

    #[test]
    fn test_not_acceptable_lists_alternatives() {
        let err = ArgumentError::not_acceptable_of("source", 1, &["Note", "Chord"]);
        assert_eq!(
            err.to_string(),
            "<'source' | 1st Argument> is not acceptable (expected Note | Chord)"
        );

        let bare = ArgumentError::not_acceptable("type", 2);
        assert_eq!(bare.to_string(), "<'type' | 2nd Argument> is not acceptable");
    }

    #[test]
    fn test_command_error_is_transparent() {
        let err: CommandError = UnknownCommandError {
            path: "Note.play".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Provided command 'Note.play' doesn't exist");
    }
}
