#![allow(dead_code)]

use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use instruments::audio::{AudioHost, SoundHandle};
use instruments::timing::{CommandClient, DelegateMessage};
use instruments_core::{CommandRequest, CommandResponse, CommandResult, Waveform};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub const WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundEvent {
    Started { sound: usize, frequency: f32 },
    Stopped { sound: usize },
}

/// Host that remembers every start and stop
#[derive(Clone, Default)]
pub struct RecordingHost {
    events: Arc<Mutex<Vec<SoundEvent>>>,
    created: Arc<Mutex<usize>>,
    capacity: Option<usize>,
}

impl RecordingHost {
    /// Host whose oscillator creation fails once `capacity` sounds exist
    pub fn with_capacity(capacity: usize) -> Self {
        RecordingHost {
            capacity: Some(capacity),
            ..RecordingHost::default()
        }
    }

    pub fn events(&self) -> Vec<SoundEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Sounds started and not yet stopped
    pub fn sounding(&self) -> Vec<usize> {
        let events = self.events();
        events
            .iter()
            .filter_map(|event| match event {
                SoundEvent::Started { sound, .. } => Some(*sound),
                SoundEvent::Stopped { .. } => None,
            })
            .filter(|sound| !events.contains(&SoundEvent::Stopped { sound: *sound }))
            .collect()
    }
}

impl AudioHost for RecordingHost {
    fn create_oscillator(
        &self,
        frequency: f32,
        _waveform: Waveform,
    ) -> Result<Box<dyn SoundHandle>> {
        let mut created = self.created.lock().unwrap();
        if self.capacity.is_some_and(|capacity| *created >= capacity) {
            return Err(anyhow!("no free voices"));
        }
        let sound = *created;
        *created += 1;
        Ok(Box::new(RecordedSound {
            sound,
            frequency,
            events: self.events.clone(),
        }))
    }
}

struct RecordedSound {
    sound: usize,
    frequency: f32,
    events: Arc<Mutex<Vec<SoundEvent>>>,
}

impl SoundHandle for RecordedSound {
    fn start(&mut self) -> Result<()> {
        self.events.lock().unwrap().push(SoundEvent::Started {
            sound: self.sound,
            frequency: self.frequency,
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(SoundEvent::Stopped { sound: self.sound });
        Ok(())
    }

    fn frequency(&self) -> f32 {
        self.frequency
    }
}

/// Client whose delegate side is driven by the test
pub struct ManualDelegate {
    pub client: CommandClient,
    pub requests: Receiver<DelegateMessage>,
    pub responses: Sender<CommandResponse>,
}

impl ManualDelegate {
    pub fn new() -> Self {
        let (request_tx, requests) = unbounded();
        let (responses, response_rx) = unbounded();
        let (client, _router) = CommandClient::connect(request_tx, response_rx);
        ManualDelegate {
            client,
            requests,
            responses,
        }
    }

    pub fn next_request(&self) -> CommandRequest {
        match self.requests.recv_timeout(WAIT).unwrap() {
            DelegateMessage::Request(request) => request,
            DelegateMessage::Shutdown => panic!("unexpected shutdown"),
        }
    }

    pub fn reply(&self, request: &CommandRequest, result: CommandResult) {
        self.responses
            .send(CommandResponse::to(request, result))
            .unwrap();
    }
}

/// Poll `done` until it holds or `WAIT` passes
pub fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}
