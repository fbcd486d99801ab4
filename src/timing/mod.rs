//! Timing delegate and the client that talks to it
//!
//! The delegate runs on its own thread and is reachable only through
//! messages: requests flow in on one channel, responses flow back on another
//! and are routed to whichever listener accepts them.

pub mod client;
pub mod delegate;

pub use client::{CommandClient, MatchScope, Matcher, Pending};
pub use delegate::{Timer, TimingDelegate};

use instruments_core::CommandRequest;

/// Messages accepted by the delegate thread
#[derive(Debug)]
pub enum DelegateMessage {
    Request(CommandRequest),
    Shutdown,
}
