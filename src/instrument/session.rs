//! An instrument registered with the timing delegate
//!
//! Notes live in a slot table shared with the stop continuations that run on
//! the router thread. A slot is reserved before its stop request is sent, and
//! every slot carries a generation so that a late stop never silences a newer
//! note that reused the same id.

use super::ready::{ReadySignal, SessionState};
use crate::audio::{AudioHost, SoundHandle};
use crate::config::InstrumentConfig;
use crate::error::InstrumentError;
use crate::timing::client::lock;
use crate::timing::{CommandClient, Matcher};
use instruments_core::{
    ArgumentError, Command, CommandResult, InstrumentId, Note, NoteId, NoteLength, NoteStop,
    Playable, SlotTable,
};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const INITIALIZED_EVENT: &str = "initialized";

struct ActiveNote {
    sound: Box<dyn SoundHandle>,
    generation: u64,
}

type NoteTable = Arc<Mutex<SlotTable<ActiveNote>>>;

pub struct Instrument {
    client: CommandClient,
    host: Arc<dyn AudioHost>,
    config: InstrumentConfig,
    ready: Arc<ReadySignal>,
    notes: NoteTable,
    generation: AtomicU64,
}

impl Instrument {
    /// Create an instrument and start registering it
    ///
    /// Returns before registration completes; `play` waits for it.
    pub fn new(
        client: CommandClient,
        host: Arc<dyn AudioHost>,
        config: &InstrumentConfig,
    ) -> Result<Self, InstrumentError> {
        let ready = Arc::new(ReadySignal::new());
        ready.begin();

        let signal = ready.clone();
        let unregister_client = client.clone();
        client.request_with(
            Command::RegisterInstrument,
            Matcher::token(),
            move |result| match result {
                CommandResult::Registered(id) => {
                    if signal.fulfill(id) {
                        info!("instrument {} ready", id);
                    } else if signal.state() == SessionState::Closed {
                        // Dropped while registering
                        unregister(&unregister_client, id);
                    }
                }
                other => warn!("instrument registration failed: {}", other),
            },
        )?;

        Ok(Instrument {
            client,
            host,
            config: config.clone(),
            ready,
            notes: Arc::new(Mutex::new(SlotTable::new())),
            generation: AtomicU64::new(0),
        })
    }

    pub fn state(&self) -> SessionState {
        self.ready.state()
    }

    /// Id assigned by the delegate, once registered
    pub fn id(&self) -> Option<InstrumentId> {
        self.ready.id()
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == SessionState::Ready
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    /// Block until registered, at most `timeout`
    pub fn wait_ready(&self, timeout: Duration) -> Result<InstrumentId, InstrumentError> {
        self.ready
            .wait(timeout)
            .ok_or(InstrumentError::NotReady(timeout))
    }

    /// Subscribe to an instrument event; only `initialized` exists
    pub fn on<F>(&self, event_name: &str, callback: F) -> Result<(), ArgumentError>
    where
        F: FnOnce(InstrumentId) + Send + 'static,
    {
        if event_name != INITIALIZED_EVENT {
            return Err(ArgumentError::not_acceptable_of(
                "eventName",
                1,
                &[INITIALIZED_EVENT],
            ));
        }
        self.ready.on_ready(callback);
        Ok(())
    }

    pub fn on_initialized<F>(&self, callback: F)
    where
        F: FnOnce(InstrumentId) + Send + 'static,
    {
        self.ready.on_ready(callback);
    }

    /// Sound a note, chord or key index, returning the note ids used
    ///
    /// Key indices take the configured note length; notes and chords keep
    /// their own.
    pub fn play(&self, source: impl Into<Playable>) -> Result<Vec<NoteId>, InstrumentError> {
        let notes = source.into().notes(self.config.note_length);
        self.play_notes(notes)
    }

    /// Like `play`, with every note lasting `length`
    pub fn play_for(
        &self,
        source: impl Into<Playable>,
        length: NoteLength,
    ) -> Result<Vec<NoteId>, InstrumentError> {
        let notes = source.into().with_length(length).notes(length);
        self.play_notes(notes)
    }

    /// Play every note or none: tones already started are silenced on error
    fn play_notes(&self, notes: Vec<Note>) -> Result<Vec<NoteId>, InstrumentError> {
        let instrument_id = self.wait_ready(self.config.ready_timeout)?;
        let mut played: Vec<(NoteId, u64)> = Vec::with_capacity(notes.len());
        for note in notes {
            match self.play_note(instrument_id, note) {
                Ok(slot) => played.push(slot),
                Err(e) => {
                    for (note_id, generation) in played {
                        finish_note(&self.notes, note_id, generation);
                    }
                    return Err(e);
                }
            }
        }
        Ok(played.into_iter().map(|(note_id, _)| note_id).collect())
    }

    fn play_note(
        &self,
        instrument_id: InstrumentId,
        note: Note,
    ) -> Result<(NoteId, u64), InstrumentError> {
        let mut sound = self
            .host
            .create_oscillator(note.frequency(), self.config.waveform)?;
        sound.start()?;

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let note_id = lock(&self.notes).insert(ActiveNote { sound, generation });
        debug!(
            "instrument {} note {} plays {} ({:.2} Hz)",
            instrument_id,
            note_id,
            note,
            note.frequency()
        );

        let length = note.length();
        if length.is_indefinite() {
            return Ok((note_id, generation));
        }

        let stop = NoteStop {
            instrument_id,
            note_id,
            length,
        };
        let matcher = Matcher::token().with_predicate(move |result| {
            result.note_stop().map_or(true, |stopped| {
                stopped.instrument_id == instrument_id && stopped.note_id == note_id
            })
        });
        let notes = self.notes.clone();
        let sent = self
            .client
            .request_with(Command::StopNote(stop), matcher, move |result| {
                if let CommandResult::Failed(reason) = &result {
                    warn!("stop for note {} failed: {}", note_id, reason);
                }
                finish_note(&notes, note_id, generation);
            });

        if let Err(e) = sent {
            finish_note(&self.notes, note_id, generation);
            return Err(e.into());
        }
        Ok((note_id, generation))
    }

    /// Silence one note now; false if it is not sounding
    pub fn release(&self, note_id: NoteId) -> bool {
        let removed = lock(&self.notes).remove(note_id);
        match removed {
            Some(mut active) => {
                stop_sound(note_id, active.sound.as_mut());
                true
            }
            None => false,
        }
    }

    /// Silence every note, returning how many were sounding
    pub fn stop_all(&self) -> usize {
        let drained = lock(&self.notes).drain();
        let count = drained.len();
        for (note_id, mut active) in drained {
            stop_sound(note_id, active.sound.as_mut());
        }
        count
    }

    pub fn active_notes(&self) -> usize {
        lock(&self.notes).len()
    }

    pub fn active_note_ids(&self) -> Vec<NoteId> {
        lock(&self.notes).ids()
    }
}

impl Drop for Instrument {
    fn drop(&mut self) {
        self.stop_all();
        if let Some(id) = self.ready.close() {
            unregister(&self.client, id);
        }
    }
}

/// Free a slot if it still holds the note from `generation`
fn finish_note(notes: &Mutex<SlotTable<ActiveNote>>, note_id: NoteId, generation: u64) -> bool {
    let removed = {
        let mut table = lock(notes);
        match table.get(note_id) {
            Some(active) if active.generation == generation => table.remove(note_id),
            _ => None,
        }
    };
    match removed {
        Some(mut active) => {
            stop_sound(note_id, active.sound.as_mut());
            true
        }
        None => {
            debug!("stale stop for note {} ignored", note_id);
            false
        }
    }
}

fn stop_sound(note_id: NoteId, sound: &mut dyn SoundHandle) {
    if let Err(e) = sound.stop() {
        warn!("failed to stop note {}: {}", note_id, e);
    }
}

fn unregister(client: &CommandClient, instrument_id: InstrumentId) {
    let sent = client.request_with(
        Command::UnregisterInstrument { instrument_id },
        Matcher::token(),
        move |result| debug!("instrument {}: {}", instrument_id, result),
    );
    if sent.is_err() {
        debug!("timing delegate gone; instrument {} not unregistered", instrument_id);
    }
}
