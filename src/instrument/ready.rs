//! One-shot registration signal

use crate::timing::client::lock;
use instruments_core::InstrumentId;
use std::fmt;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Lifecycle of an instrument's registration with the timing delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Registering,
    Ready,
    /// The instrument was dropped; no further id will be accepted
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Registering => "registering",
            SessionState::Ready => "ready",
            SessionState::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}

type ReadyCallback = Box<dyn FnOnce(InstrumentId) + Send>;

struct Inner {
    state: SessionState,
    id: Option<InstrumentId>,
    callbacks: Vec<ReadyCallback>,
}

/// Carries the instrument id from the registration response to every waiter
pub struct ReadySignal {
    inner: Mutex<Inner>,
    ready: Condvar,
}

impl ReadySignal {
    pub fn new() -> Self {
        ReadySignal {
            inner: Mutex::new(Inner {
                state: SessionState::Uninitialized,
                id: None,
                callbacks: Vec::new(),
            }),
            ready: Condvar::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        lock(&self.inner).state
    }

    pub fn id(&self) -> Option<InstrumentId> {
        lock(&self.inner).id
    }

    /// Registration request has been sent
    pub fn begin(&self) {
        let mut inner = lock(&self.inner);
        if inner.state == SessionState::Uninitialized {
            inner.state = SessionState::Registering;
        }
    }

    /// Record the id; only the first call after `begin` takes effect
    pub fn fulfill(&self, id: InstrumentId) -> bool {
        let callbacks = {
            let mut inner = lock(&self.inner);
            match inner.state {
                SessionState::Ready | SessionState::Closed => return false,
                SessionState::Uninitialized | SessionState::Registering => {}
            }
            inner.state = SessionState::Ready;
            inner.id = Some(id);
            std::mem::take(&mut inner.callbacks)
        };
        self.ready.notify_all();

        for callback in callbacks {
            callback(id);
        }
        true
    }

    /// Stop accepting an id and return the one already granted, if any
    pub fn close(&self) -> Option<InstrumentId> {
        let mut inner = lock(&self.inner);
        inner.state = SessionState::Closed;
        inner.callbacks.clear();
        let id = inner.id.take();
        drop(inner);
        self.ready.notify_all();
        id
    }

    /// Run `callback` once ready, immediately if that has already happened
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce(InstrumentId) + Send + 'static,
    {
        let id = {
            let mut inner = lock(&self.inner);
            match (inner.state, inner.id) {
                (SessionState::Ready, Some(id)) => id,
                (SessionState::Closed, _) => return,
                _ => {
                    inner.callbacks.push(Box::new(callback));
                    return;
                }
            }
        };
        callback(id);
    }

    /// Block until ready; None on timeout or once closed
    pub fn wait(&self, timeout: Duration) -> Option<InstrumentId> {
        let deadline = Instant::now() + timeout;
        let mut inner = lock(&self.inner);
        loop {
            match inner.state {
                SessionState::Ready => return inner.id,
                SessionState::Closed => return None,
                SessionState::Uninitialized | SessionState::Registering => {}
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            inner = match self.ready.wait_timeout(inner, remaining) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fulfilled_exactly_once() {
        let signal = ReadySignal::new();
        signal.begin();
        assert_eq!(signal.state(), SessionState::Registering);

        assert!(signal.fulfill(3));
        assert!(!signal.fulfill(4));
        assert_eq!(signal.id(), Some(3));
        assert_eq!(signal.state(), SessionState::Ready);
    }

    #[test]
    fn test_callbacks_run_once() {
        let signal = ReadySignal::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let before = calls.clone();
        signal.on_ready(move |id| {
            assert_eq!(id, 2);
            before.fetch_add(1, Ordering::SeqCst);
        });
        signal.begin();
        signal.fulfill(2);
        signal.fulfill(2);

        let after = calls.clone();
        signal.on_ready(move |_| {
            after.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_wait_wakes_on_fulfill() {
        let signal = Arc::new(ReadySignal::new());
        signal.begin();
        assert_eq!(signal.wait(Duration::from_millis(20)), None);

        let fulfiller = signal.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            fulfiller.fulfill(5);
        });
        assert_eq!(signal.wait(Duration::from_secs(2)), Some(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_closed_signal_rejects_late_id() {
        let signal = ReadySignal::new();
        signal.begin();
        assert_eq!(signal.close(), None);
        assert!(!signal.fulfill(1));
        assert_eq!(signal.wait(Duration::from_millis(10)), None);
    }
}
