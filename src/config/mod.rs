// src/config/mod.rs
//! Engine configuration

pub mod constants;
pub mod loader;

pub use loader::{load_from_path, load_from_toml_str};

use crate::acquisition::AcquisitionConfig;
use crate::error::EngineError;
use crate::synth::{Waveform, WaveformSpec};
use constants::{engine, waveform};
use serde::{Deserialize, Serialize};

/// Complete engine configuration.
///
/// Defaults mirror the observed bench setup: 500 Hz loop rate, a
/// 1000-sample retained window, a 10 Hz sine on channel 1 and a 200 Hz
/// sine on channel 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Channel-1 waveform.
    pub channel1: WaveformSpec,
    /// Channel-2 waveform (ignored while mirror mode is active).
    pub channel2: WaveformSpec,
    /// Scheduling-loop behavior.
    pub acquisition: AcquisitionConfig,
    /// Maximum retained sample count.
    pub buffer_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channel1: WaveformSpec::default(),
            channel2: WaveformSpec {
                shape: Waveform::Sine,
                frequency_hz: waveform::DEFAULT_FREQUENCY2_HZ,
                amplitude_v: waveform::DEFAULT_AMPLITUDE_V,
                offset_v: waveform::DEFAULT_OFFSET_V,
            },
            acquisition: AcquisitionConfig::default(),
            buffer_capacity: engine::DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Boundary validation for the whole configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.channel1.validate()?;
        self.channel2.validate()?;
        self.acquisition.validate()?;
        if self.buffer_capacity == 0 {
            return Err(EngineError::config("buffer_capacity", "must be nonzero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = EngineConfig {
            buffer_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_channel_validation_propagates() {
        let mut config = EngineConfig::default();
        config.channel2.frequency_hz = 0.0;
        assert!(config.validate().is_err());
    }
}
