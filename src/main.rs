use anyhow::{Context, Result};
use clap::Parser;
use instruments::audio::{AudioEngine, AudioHost, SilentHost};
use instruments::commands::CommandContext;
use instruments::config::{InstrumentConfig, PianoConfig};
use instruments::instrument::Instrument;
use instruments::repl::Repl;
use instruments::timing::Timer;
use instruments_core::{ChordType, NoteLength, Waveform};
use log::{info, warn};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "instruments")]
#[command(about = "A keyboard piano with delegated note timing")]
struct Cli {
    /// Oscillator waveform (sine, saw, square, triangle)
    #[arg(short, long, default_value = "sine")]
    waveform: String,
    /// Octave of the lowest keyboard row
    #[arg(short, long, default_value_t = 5)]
    octave: i32,
    /// Note length in milliseconds, or "hold"
    #[arg(short, long, default_value = "500")]
    length: String,
    /// Play every key as a chord (major, minor, sus2, sus4, aug)
    #[arg(short, long)]
    chord: Option<String>,
    /// Output gain between 0.0 and 1.0
    #[arg(short, long, default_value_t = 0.3)]
    gain: f32,
    /// Run without opening an audio device
    #[arg(long)]
    silent: bool,
}

impl Cli {
    fn piano_config(&self) -> Result<PianoConfig> {
        let waveform: Waveform = self.waveform.parse().context("--waveform")?;
        let length: NoteLength = self.length.parse().context("--length")?;
        let chord = match &self.chord {
            Some(name) => Some(name.parse::<ChordType>().context("--chord")?),
            None => None,
        };

        Ok(PianoConfig::new()
            .with_instrument(
                InstrumentConfig::new()
                    .with_waveform(waveform)
                    .with_note_length(length),
            )
            .with_base_octave(self.octave)
            .with_chord(chord)
            .with_gain(self.gain))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.piano_config()?;

    let timer = Timer::start();
    let client = timer.client();

    // Keep the engine alive for as long as the instrument plays into it
    let mut engine = None;
    let host: Arc<dyn AudioHost> = if cli.silent {
        Arc::new(SilentHost)
    } else {
        match AudioEngine::new(config.gain).and_then(|e| e.play().map(|_| e)) {
            Ok(started) => {
                let mixer = started.mixer();
                engine = Some(started);
                Arc::new(mixer)
            }
            Err(e) => {
                warn!("audio unavailable ({}), continuing silently", e);
                Arc::new(SilentHost)
            }
        }
    };

    let instrument = Instrument::new(client.clone(), host, &config.instrument)?;
    match instrument.wait_ready(config.instrument.ready_timeout) {
        Ok(id) => info!("playing on instrument {}", id),
        Err(e) => warn!("{}; notes will wait for registration", e),
    }

    let ctx = CommandContext::new(instrument, client, config);
    let mut repl = Repl::new(ctx).context("failed to start the line editor")?;
    repl.run()?;

    drop(repl);
    drop(engine);
    timer.shutdown();
    Ok(())
}
