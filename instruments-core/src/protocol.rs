//! Messages exchanged between an instrument and the timing delegate
//!
//! Every request carries a [`RequestId`] that the delegate echoes back in
//! its response. Command names are dotted paths such as `Note.stop`; the
//! path form exists for text front ends, while code builds [`Command`]
//! values directly.

use crate::error::{ArgumentError, CommandError, UnknownCommandError};
use crate::types::note::NoteLength;
use std::fmt;

pub type InstrumentId = usize;
pub type NoteId = usize;

/// Correlation token tying a response to the request that caused it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of commands the timing delegate understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandKind {
    InstrumentRegister,
    InstrumentUnregister,
    InstrumentsNextId,
    NoteStop,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [
        CommandKind::InstrumentRegister,
        CommandKind::InstrumentUnregister,
        CommandKind::InstrumentsNextId,
        CommandKind::NoteStop,
    ];

    /// Dotted wire name
    pub fn path(self) -> &'static str {
        match self {
            CommandKind::InstrumentRegister => "Instrument.register",
            CommandKind::InstrumentUnregister => "Instrument.unregister",
            CommandKind::InstrumentsNextId => "Instruments.getNextId",
            CommandKind::NoteStop => "Note.stop",
        }
    }

    /// Resolve a dotted path to its command
    pub fn from_path(path: &str) -> Result<Self, CommandError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(ArgumentError::not_defined("command", 1).into());
        }

        CommandKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.path() == path)
            .ok_or_else(|| {
                UnknownCommandError {
                    path: path.to_string(),
                }
                .into()
            })
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Positional argument in the path form of a command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgValue {
    Integer(i64),
    Text(String),
}

impl ArgValue {
    /// Integers become `Integer`, anything else stays text
    pub fn parse_token(token: &str) -> Self {
        token
            .parse::<i64>()
            .map(ArgValue::Integer)
            .unwrap_or_else(|_| ArgValue::Text(token.to_string()))
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Integer(n) => write!(f, "{}", n),
            ArgValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Identifies one scheduled note stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteStop {
    pub instrument_id: InstrumentId,
    pub note_id: NoteId,
    pub length: NoteLength,
}

impl fmt::Display for NoteStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "instrument {} note {} after {}",
            self.instrument_id, self.note_id, self.length
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Allocate a fresh instrument id
    RegisterInstrument,
    /// Release an instrument id for reuse
    UnregisterInstrument { instrument_id: InstrumentId },
    /// Report the id the next registration would receive
    NextInstrumentId,
    /// Answer after the note's length has elapsed
    StopNote(NoteStop),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::RegisterInstrument => CommandKind::InstrumentRegister,
            Command::UnregisterInstrument { .. } => CommandKind::InstrumentUnregister,
            Command::NextInstrumentId => CommandKind::InstrumentsNextId,
            Command::StopNote(_) => CommandKind::NoteStop,
        }
    }

    /// Positional arguments in wire order
    pub fn args(&self) -> Vec<ArgValue> {
        match self {
            Command::RegisterInstrument | Command::NextInstrumentId => Vec::new(),
            Command::UnregisterInstrument { instrument_id } => {
                vec![ArgValue::Integer(*instrument_id as i64)]
            }
            Command::StopNote(stop) => {
                let mut args = vec![
                    ArgValue::Integer(stop.instrument_id as i64),
                    ArgValue::Integer(stop.note_id as i64),
                ];
                if let NoteLength::Millis(ms) = stop.length {
                    args.push(ArgValue::Integer(ms as i64));
                }
                args
            }
        }
    }

    /// Build a command from its dotted path and positional arguments
    ///
    /// For `Note.stop` a missing or negative duration means a held note.
    pub fn from_path(path: &str, args: &[ArgValue]) -> Result<Self, CommandError> {
        let command = match CommandKind::from_path(path)? {
            CommandKind::InstrumentRegister => Command::RegisterInstrument,
            CommandKind::InstrumentsNextId => Command::NextInstrumentId,
            CommandKind::InstrumentUnregister => Command::UnregisterInstrument {
                instrument_id: index_arg(args, 1, "instrumentId")?,
            },
            CommandKind::NoteStop => Command::StopNote(NoteStop {
                instrument_id: index_arg(args, 1, "instrumentId")?,
                note_id: index_arg(args, 2, "noteId")?,
                length: length_arg(args, 3, "duration")?,
            }),
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args().iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.kind(), args.join(", "))
    }
}

fn index_arg(args: &[ArgValue], position: usize, name: &str) -> Result<usize, ArgumentError> {
    match args.get(position - 1) {
        None => Err(ArgumentError::not_defined(name, position)),
        Some(ArgValue::Integer(n)) if *n >= 0 => Ok(*n as usize),
        Some(_) => Err(ArgumentError::not_acceptable_of(
            name,
            position,
            &["non-negative integer"],
        )),
    }
}

fn length_arg(args: &[ArgValue], position: usize, name: &str) -> Result<NoteLength, ArgumentError> {
    match args.get(position - 1) {
        None => Ok(NoteLength::Indefinite),
        Some(ArgValue::Integer(n)) if *n < 0 => Ok(NoteLength::Indefinite),
        Some(ArgValue::Integer(n)) => Ok(NoteLength::Millis(*n as u64)),
        Some(ArgValue::Text(text)) => text.parse().map_err(|_| {
            ArgumentError::not_acceptable_of(name, position, &["milliseconds", "hold"])
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandRequest {
    pub correlation: RequestId,
    pub command: Command,
}

/// Payload of a response
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandResult {
    Registered(InstrumentId),
    Unregistered(InstrumentId),
    NextId(InstrumentId),
    NoteStopped(NoteStop),
    /// The delegate refused the command
    Failed(String),
}

impl CommandResult {
    pub fn note_stop(&self) -> Option<&NoteStop> {
        match self {
            CommandResult::NoteStopped(stop) => Some(stop),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CommandResult::Failed(_))
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Registered(id) => write!(f, "registered instrument {}", id),
            CommandResult::Unregistered(id) => write!(f, "unregistered instrument {}", id),
            CommandResult::NextId(id) => write!(f, "next instrument id {}", id),
            CommandResult::NoteStopped(stop) => write!(f, "stopped {}", stop),
            CommandResult::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandResponse {
    pub correlation: RequestId,
    pub command: CommandKind,
    pub result: CommandResult,
}

impl CommandResponse {
    /// Response to `request` carrying `result`
    pub fn to(request: &CommandRequest, result: CommandResult) -> Self {
        CommandResponse {
            correlation: request.correlation,
            command: request.command.kind(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<ArgValue> {
        values.iter().map(|v| ArgValue::Integer(*v)).collect()
    }

    #[test]
    fn test_paths_round_trip() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_path(kind.path()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_path_is_reference_error() {
        let err = CommandKind::from_path("Note.play").unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand(_)));

        // A missing segment does not resolve either
        let err = CommandKind::from_path("Note").unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand(_)));
    }

    #[test]
    fn test_empty_path_is_required() {
        let err = CommandKind::from_path("").unwrap_err();
        assert_eq!(
            err.to_string(),
            "<'command' | 1st Argument> is required"
        );
    }

    #[test]
    fn test_note_stop_from_path() {
        let command = Command::from_path("Note.stop", &ints(&[2, 5, 300])).unwrap();
        assert_eq!(
            command,
            Command::StopNote(NoteStop {
                instrument_id: 2,
                note_id: 5,
                length: NoteLength::Millis(300),
            })
        );
        assert_eq!(command.args(), ints(&[2, 5, 300]));
    }

    #[test]
    fn test_note_stop_without_duration_is_held() {
        let command = Command::from_path("Note.stop", &ints(&[0, 1])).unwrap();
        match command {
            Command::StopNote(stop) => assert!(stop.length.is_indefinite()),
            other => panic!("unexpected {:?}", other),
        }
        let negative = Command::from_path("Note.stop", &ints(&[0, 1, -1])).unwrap();
        assert_eq!(negative.args(), ints(&[0, 1]));
    }

    #[test]
    fn test_note_stop_argument_errors() {
        let missing = Command::from_path("Note.stop", &ints(&[0])).unwrap_err();
        assert_eq!(
            missing.to_string(),
            "<'noteId' | 2nd Argument> is required"
        );

        let negative = Command::from_path("Note.stop", &ints(&[-3, 0])).unwrap_err();
        assert!(negative.to_string().starts_with("<'instrumentId' | 1st Argument> is not acceptable"));

        let bad_length = Command::from_path(
            "Note.stop",
            &[
                ArgValue::Integer(0),
                ArgValue::Integer(0),
                ArgValue::Text("soon".to_string()),
            ],
        )
        .unwrap_err();
        assert!(bad_length.to_string().contains("'duration' | 3rd Argument"));
    }

    #[test]
    fn test_arg_tokens() {
        assert_eq!(ArgValue::parse_token("42"), ArgValue::Integer(42));
        assert_eq!(
            ArgValue::parse_token("hold"),
            ArgValue::Text("hold".to_string())
        );
    }

    #[test]
    fn test_response_echoes_request() {
        let request = CommandRequest {
            correlation: RequestId(9),
            command: Command::RegisterInstrument,
        };
        let response = CommandResponse::to(&request, CommandResult::Registered(0));
        assert_eq!(response.correlation, RequestId(9));
        assert_eq!(response.command, CommandKind::InstrumentRegister);
    }
}
