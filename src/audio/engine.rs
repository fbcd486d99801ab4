use super::mixer::{Mixer, MixerHandle};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use log::{error, info};

/// Output stream on the default device, fed by a shared mixer
pub struct AudioEngine {
    stream: Stream,
    mixer: MixerHandle,
    sample_rate: f32,
}

impl AudioEngine {
    pub fn new(gain: f32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;
        let config = device.default_output_config()?;

        let sample_format = config.sample_format();
        let config: StreamConfig = config.into();
        let sample_rate = config.sample_rate.0 as f32;

        let mixer = MixerHandle::new(Mixer::new(sample_rate, gain));
        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, mixer.clone())?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, mixer.clone())?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, mixer.clone())?,
            _ => return Err(anyhow!("Unsupported sample format: {:?}", sample_format)),
        };

        info!(
            "audio output on {} at {} Hz",
            device.name().unwrap_or_else(|_| "unknown device".to_string()),
            config.sample_rate.0
        );
        Ok(AudioEngine {
            stream,
            mixer,
            sample_rate,
        })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        mixer: MixerHandle,
    ) -> Result<Stream>
    where
        T: Sample + SizedSample + Send + 'static + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;
        let mut mono = Vec::new();

        let err_fn = |err| error!("an error occurred on the output audio stream: {:?}", err);

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels.max(1);
                    mono.resize(frames, 0.0f32);
                    mixer.render(&mut mono);

                    for (frame, value) in data.chunks_mut(channels).zip(mono.iter()) {
                        let value: T = cpal::Sample::from_sample(*value);
                        for sample in frame.iter_mut() {
                            *sample = value;
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| anyhow!("Failed to build output stream: {}", e))?;

        Ok(stream)
    }

    /// Handle for creating voices on this engine
    pub fn mixer(&self) -> MixerHandle {
        self.mixer.clone()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn play(&self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| anyhow!("Failed to play stream: {}", e))
    }

    pub fn pause(&self) -> Result<()> {
        self.stream
            .pause()
            .map_err(|e| anyhow!("Failed to pause stream: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        // No output device on most CI machines
        match AudioEngine::new(0.3) {
            Ok(engine) => {
                assert!(engine.sample_rate() > 0.0);
                assert_eq!(engine.mixer().active_voices(), 0);
            }
            Err(e) => println!("AudioEngine creation failed ({}), likely no audio device", e),
        }
    }
}
