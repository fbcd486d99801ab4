//! Instrument session: registration, note slots and delayed stops

pub mod ready;
pub mod session;

pub use ready::{ReadySignal, SessionState};
pub use session::Instrument;
