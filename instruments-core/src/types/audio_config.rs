//! Oscillator settings shared by the audio engine and the front end

use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;

/// Available waveform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
        }
    }
}

impl FromStr for Waveform {
    type Err = anyhow::Error;

    /// Case-insensitive, accepts short aliases
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sine" | "sin" => Ok(Waveform::Sine),
            "saw" | "sawtooth" => Ok(Waveform::Saw),
            "square" | "sq" => Ok(Waveform::Square),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            other => Err(anyhow!("Unknown waveform: {}", other)),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_parsing() {
        assert_eq!("sine".parse::<Waveform>().unwrap(), Waveform::Sine);
        assert_eq!("SAW".parse::<Waveform>().unwrap(), Waveform::Saw);
        assert_eq!("Square".parse::<Waveform>().unwrap(), Waveform::Square);
        assert_eq!("tri".parse::<Waveform>().unwrap(), Waveform::Triangle);
        assert!("noise".parse::<Waveform>().is_err());
    }

    #[test]
    fn test_default_waveform_is_sine() {
        assert_eq!(Waveform::default(), Waveform::Sine);
    }
}
