//! Caller side of the timing protocol
//!
//! Each request installs a listener on the shared response stream before it
//! is sent. A router thread offers every response to the listeners in
//! installation order; each listener that accepts it is removed and resolved.
//! With [`Matcher::token`] only the request's own response is accepted. With
//! [`Matcher::command`] any response for the same command is, so two
//! outstanding requests for one command resolve together on the first reply.

use super::DelegateMessage;
use crate::error::{InstrumentError, ProtocolError};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use instruments_core::{
    ArgValue, Command, CommandKind, CommandRequest, CommandResponse, CommandResult, RequestId,
};
use log::{debug, trace};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Extra condition a response's result must meet
pub type Predicate = Box<dyn Fn(&CommandResult) -> bool + Send>;

type Continuation = Box<dyn FnOnce(CommandResult) + Send>;

/// Which responses a listener considers at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    /// Only the response carrying the request's correlation token
    Token,
    /// Any response for the same command
    Command,
}

/// Decides which response resolves a request
pub struct Matcher {
    scope: MatchScope,
    predicate: Option<Predicate>,
}

impl Matcher {
    pub fn token() -> Self {
        Matcher {
            scope: MatchScope::Token,
            predicate: None,
        }
    }

    pub fn command() -> Self {
        Matcher {
            scope: MatchScope::Command,
            predicate: None,
        }
    }

    /// Additionally require `predicate` to accept the result
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CommandResult) -> bool + Send + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn scope(&self) -> MatchScope {
        self.scope
    }

    fn accepts(&self, correlation: RequestId, kind: CommandKind, response: &CommandResponse) -> bool {
        let in_scope = match self.scope {
            MatchScope::Token => response.correlation == correlation,
            MatchScope::Command => response.command == kind,
        };
        in_scope
            && self
                .predicate
                .as_ref()
                .map_or(true, |predicate| predicate(&response.result))
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::token()
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("scope", &self.scope)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

struct Listener {
    correlation: RequestId,
    kind: CommandKind,
    matcher: Matcher,
    resolve: Continuation,
}

impl Listener {
    fn accepts(&self, response: &CommandResponse) -> bool {
        self.matcher.accepts(self.correlation, self.kind, response)
    }
}

/// Result of a request that may not have arrived yet
///
/// A response that never matches leaves this pending forever; use
/// [`Pending::wait_timeout`] to bound the wait.
#[derive(Debug)]
pub struct Pending {
    correlation: RequestId,
    rx: Receiver<CommandResult>,
}

impl Pending {
    pub fn correlation(&self) -> RequestId {
        self.correlation
    }

    /// Block until the request resolves
    pub fn wait(self) -> Result<CommandResult, ProtocolError> {
        self.rx.recv().map_err(|_| ProtocolError::Disconnected)
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Result<CommandResult, ProtocolError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Ok(result),
            Err(RecvTimeoutError::Timeout) => Err(ProtocolError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ProtocolError::Disconnected),
        }
    }

    /// The result, if it has already arrived
    pub fn try_result(&self) -> Option<CommandResult> {
        self.rx.try_recv().ok()
    }
}

/// Handle for issuing commands to a timing delegate
#[derive(Clone)]
pub struct CommandClient {
    request_tx: Sender<DelegateMessage>,
    listeners: Arc<Mutex<Vec<Listener>>>,
    next_correlation: Arc<AtomicU64>,
}

impl CommandClient {
    /// Attach to a delegate's channels and spawn the response router
    ///
    /// The router exits once every response sender is gone; listeners still
    /// installed at that point are dropped, so their waiters see
    /// [`ProtocolError::Disconnected`].
    pub fn connect(
        request_tx: Sender<DelegateMessage>,
        response_rx: Receiver<CommandResponse>,
    ) -> (Self, JoinHandle<()>) {
        let listeners = Arc::new(Mutex::new(Vec::new()));
        let router_listeners = listeners.clone();
        let router = thread::spawn(move || route_responses(router_listeners, response_rx));

        let client = CommandClient {
            request_tx,
            listeners,
            next_correlation: Arc::new(AtomicU64::new(1)),
        };
        (client, router)
    }

    /// Send a command and get a handle to its eventual result
    pub fn request_command(
        &self,
        command: Command,
        matcher: Matcher,
    ) -> Result<Pending, ProtocolError> {
        let (tx, rx) = bounded(1);
        let correlation = self.request_with(command, matcher, move |result| {
            let _ = tx.send(result);
        })?;
        Ok(Pending { correlation, rx })
    }

    /// Send a command and run `on_result` on the router thread when it resolves
    ///
    /// `on_result` runs outside the listener lock, so it may issue further
    /// requests.
    pub fn request_with<F>(
        &self,
        command: Command,
        matcher: Matcher,
        on_result: F,
    ) -> Result<RequestId, ProtocolError>
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        let correlation = RequestId(self.next_correlation.fetch_add(1, Ordering::Relaxed));
        let kind = command.kind();

        // Listen first so a fast response cannot slip past
        lock(&self.listeners).push(Listener {
            correlation,
            kind,
            matcher,
            resolve: Box::new(on_result),
        });

        debug!("request {} {}", correlation, command);
        let message = DelegateMessage::Request(CommandRequest {
            correlation,
            command,
        });
        if self.request_tx.send(message).is_err() {
            lock(&self.listeners).retain(|listener| listener.correlation != correlation);
            return Err(ProtocolError::Disconnected);
        }
        Ok(correlation)
    }

    /// Send a command given by dotted path and positional arguments
    pub fn request_path(
        &self,
        path: &str,
        args: &[ArgValue],
        matcher: Matcher,
    ) -> Result<Pending, InstrumentError> {
        let command = Command::from_path(path, args)?;
        Ok(self.request_command(command, matcher)?)
    }

    /// Listeners still waiting for a response
    pub fn outstanding(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Ask the delegate thread to stop
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(DelegateMessage::Shutdown);
    }
}

impl fmt::Debug for CommandClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandClient")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

fn route_responses(listeners: Arc<Mutex<Vec<Listener>>>, response_rx: Receiver<CommandResponse>) {
    for response in response_rx.iter() {
        let matched = {
            let mut guard = lock(&listeners);
            let mut matched = Vec::new();
            let mut index = 0;
            while index < guard.len() {
                if guard[index].accepts(&response) {
                    matched.push(guard.remove(index));
                } else {
                    index += 1;
                }
            }
            matched
        };

        if matched.is_empty() {
            debug!(
                "unclaimed response {} for {}: {}",
                response.correlation, response.command, response.result
            );
        }
        for listener in matched {
            trace!(
                "response {} resolves request {}",
                response.correlation,
                listener.correlation
            );
            (listener.resolve)(response.result.clone());
        }
    }

    let abandoned = {
        let mut guard = lock(&listeners);
        guard.drain(..).count()
    };
    if abandoned > 0 {
        debug!("response stream closed with {} listeners waiting", abandoned);
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
