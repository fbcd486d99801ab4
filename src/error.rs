use instruments_core::{ArgumentError, CommandError};
use std::time::Duration;
use thiserror::Error;

/// Failures of the request/response channel itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The timing delegate thread has shut down
    #[error("timing delegate is not running")]
    Disconnected,
    /// No matching response arrived in time
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("instrument was not registered within {0:?}")]
    NotReady(Duration),
    #[error(transparent)]
    Audio(#[from] anyhow::Error),
}
