//! Timing delegate thread
//!
//! Owns the instrument registry and a min-heap of scheduled note stops. The
//! loop blocks on the request channel until the earliest stop is due, so
//! idle waiting costs nothing.

use super::client::CommandClient;
use super::DelegateMessage;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use instruments_core::{
    Command, CommandKind, CommandRequest, CommandResponse, CommandResult, NoteStop, RequestId,
    SlotTable,
};
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::thread::{self, JoinHandle};
use std::time::Instant;

#[derive(Debug)]
struct InstrumentRecord {
    registered_at: Instant,
}

/// A stop waiting for its deadline
#[derive(Debug)]
struct ScheduledStop {
    deadline: Instant,
    /// Arrival order, breaks ties between equal deadlines
    sequence: u64,
    correlation: RequestId,
    stop: NoteStop,
}

impl PartialEq for ScheduledStop {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledStop {}

impl PartialOrd for ScheduledStop {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledStop {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap behavior (earliest first)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

pub struct TimingDelegate {
    instruments: SlotTable<InstrumentRecord>,
    scheduled: BinaryHeap<ScheduledStop>,
    sequence: u64,
    request_rx: Receiver<DelegateMessage>,
    response_tx: Sender<CommandResponse>,
}

impl TimingDelegate {
    /// Run a delegate on its own thread
    pub fn spawn(
        request_rx: Receiver<DelegateMessage>,
        response_tx: Sender<CommandResponse>,
    ) -> JoinHandle<()> {
        let delegate = TimingDelegate {
            instruments: SlotTable::new(),
            scheduled: BinaryHeap::new(),
            sequence: 0,
            request_rx,
            response_tx,
        };
        thread::spawn(move || delegate.run_loop())
    }

    fn run_loop(mut self) {
        debug!("timing delegate started");
        loop {
            let received = match self.scheduled.peek() {
                Some(next) => self.request_rx.recv_deadline(next.deadline),
                None => self
                    .request_rx
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(DelegateMessage::Request(request)) => self.handle_request(request),
                Ok(DelegateMessage::Shutdown) => break,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.fire_due_stops();
        }

        if !self.scheduled.is_empty() {
            warn!(
                "timing delegate stopping with {} scheduled stops",
                self.scheduled.len()
            );
        }
        debug!("timing delegate stopped");
    }

    fn handle_request(&mut self, request: CommandRequest) {
        debug!("delegate received {} {}", request.correlation, request.command);
        match request.command {
            Command::RegisterInstrument => {
                let id = self.instruments.insert(InstrumentRecord {
                    registered_at: Instant::now(),
                });
                info!("registered instrument {}", id);
                self.respond(&request, CommandResult::Registered(id));
            }
            Command::UnregisterInstrument { instrument_id } => {
                let result = match self.instruments.remove(instrument_id) {
                    Some(record) => {
                        info!(
                            "unregistered instrument {} after {:?}",
                            instrument_id,
                            record.registered_at.elapsed()
                        );
                        CommandResult::Unregistered(instrument_id)
                    }
                    None => CommandResult::Failed(format!(
                        "instrument {} is not registered",
                        instrument_id
                    )),
                };
                self.respond(&request, result);
            }
            Command::NextInstrumentId => {
                let id = self.instruments.next_id();
                self.respond(&request, CommandResult::NextId(id));
            }
            Command::StopNote(stop) => self.schedule_stop(&request, stop),
        }
    }

    fn schedule_stop(&mut self, request: &CommandRequest, stop: NoteStop) {
        if !self.instruments.contains(stop.instrument_id) {
            let reason = format!("instrument {} is not registered", stop.instrument_id);
            self.respond(request, CommandResult::Failed(reason));
            return;
        }
        let Some(delay) = stop.length.as_duration() else {
            let reason = format!("note {} is held and never scheduled", stop.note_id);
            self.respond(request, CommandResult::Failed(reason));
            return;
        };

        self.sequence += 1;
        self.scheduled.push(ScheduledStop {
            deadline: Instant::now() + delay,
            sequence: self.sequence,
            correlation: request.correlation,
            stop,
        });
    }

    fn fire_due_stops(&mut self) {
        let now = Instant::now();
        while self.scheduled.peek().is_some_and(|next| next.deadline <= now) {
            let Some(due) = self.scheduled.pop() else {
                break;
            };
            debug!("firing stop {} ({})", due.correlation, due.stop);
            self.send(CommandResponse {
                correlation: due.correlation,
                command: CommandKind::NoteStop,
                result: CommandResult::NoteStopped(due.stop),
            });
        }
    }

    fn respond(&self, request: &CommandRequest, result: CommandResult) {
        self.send(CommandResponse::to(request, result));
    }

    fn send(&self, response: CommandResponse) {
        if self.response_tx.send(response).is_err() {
            warn!("response dropped: no router is listening");
        }
    }
}

/// A running timing delegate together with its response router
///
/// Dropping the timer stops the delegate; stops still scheduled are discarded.
pub struct Timer {
    client: CommandClient,
    delegate: Option<JoinHandle<()>>,
    router: Option<JoinHandle<()>>,
}

impl Timer {
    pub fn start() -> Self {
        let (request_tx, request_rx) = unbounded();
        let (response_tx, response_rx) = unbounded();

        let delegate = TimingDelegate::spawn(request_rx, response_tx);
        let (client, router) = CommandClient::connect(request_tx, response_rx);

        Timer {
            client,
            delegate: Some(delegate),
            router: Some(router),
        }
    }

    /// A client for issuing commands to this timer
    pub fn client(&self) -> CommandClient {
        self.client.clone()
    }

    /// Stop the delegate and wait for both threads to finish
    pub fn shutdown(mut self) {
        self.stop_threads();
    }

    fn stop_threads(&mut self) {
        self.client.shutdown();
        if let Some(delegate) = self.delegate.take() {
            let _ = delegate.join();
        }
        if let Some(router) = self.router.take() {
            let _ = router.join();
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop_threads();
    }
}
