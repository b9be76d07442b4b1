// src/synth.rs
//! Deterministic waveform synthesis
//!
//! Pure per-sample synthesis: no state, no I/O. The scheduler snapshots a
//! [`WaveformSpec`] once per iteration and evaluates it at the nominal
//! sample instant, so live edits take effect on the next sample and never
//! mid-iteration.

use crate::config::constants::waveform;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Wave shapes producible on an output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    /// `amp * sin(2π·f·t) + offset`
    Sine,
    /// Sign of the sine at the same phase; `sin(..) >= 0` maps to +1.
    Square,
    /// Ramp from `-amp` to `+amp` over the first half period and back.
    Triangle,
    /// Ramp from `-amp` to `+amp` over one full period.
    Sawtooth,
}

impl Waveform {
    /// Instantaneous value of this shape at time `t` seconds.
    ///
    /// Deterministic and total for `frequency_hz > 0`; a non-positive
    /// frequency is a caller precondition violation checked at the
    /// configuration boundary, not here.
    pub fn value(self, frequency_hz: f64, amplitude_v: f64, offset_v: f64, t: f64) -> f64 {
        match self {
            Waveform::Sine => amplitude_v * (TAU * frequency_hz * t).sin() + offset_v,
            Waveform::Square => {
                let sign = if (TAU * frequency_hz * t).sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                };
                amplitude_v * sign + offset_v
            }
            Waveform::Triangle => {
                let phase = (t * frequency_hz).rem_euclid(1.0);
                if phase < 0.5 {
                    offset_v + amplitude_v * (4.0 * phase - 1.0)
                } else {
                    offset_v + amplitude_v * (3.0 - 4.0 * phase)
                }
            }
            Waveform::Sawtooth => {
                let phase = (t * frequency_hz).rem_euclid(1.0);
                offset_v + amplitude_v * (2.0 * phase - 1.0)
            }
        }
    }
}

/// Per-channel synthesis settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformSpec {
    /// Shape synthesized on this channel.
    pub shape: Waveform,
    /// Fundamental frequency, Hz. Must be positive.
    pub frequency_hz: f64,
    /// Peak amplitude, volts. Must be non-negative.
    pub amplitude_v: f64,
    /// DC offset, volts.
    pub offset_v: f64,
}

impl Default for WaveformSpec {
    fn default() -> Self {
        Self {
            shape: Waveform::Sine,
            frequency_hz: waveform::DEFAULT_FREQUENCY1_HZ,
            amplitude_v: waveform::DEFAULT_AMPLITUDE_V,
            offset_v: waveform::DEFAULT_OFFSET_V,
        }
    }
}

impl WaveformSpec {
    /// Boundary validation for user-supplied specs.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.frequency_hz > 0.0 && self.frequency_hz.is_finite()) {
            return Err(EngineError::config(
                "frequency_hz",
                format!("must be positive and finite, got {}", self.frequency_hz),
            ));
        }
        if !(self.amplitude_v >= 0.0 && self.amplitude_v.is_finite()) {
            return Err(EngineError::config(
                "amplitude_v",
                format!("must be non-negative and finite, got {}", self.amplitude_v),
            ));
        }
        if !self.offset_v.is_finite() {
            return Err(EngineError::config(
                "offset_v",
                format!("must be finite, got {}", self.offset_v),
            ));
        }
        Ok(())
    }

    /// Instantaneous value of this spec at time `t` seconds.
    pub fn sample(&self, t: f64) -> f64 {
        self.shape
            .value(self.frequency_hz, self.amplitude_v, self.offset_v, t)
    }
}

/// Mirror-mode channel-2 derivation: the reflection of a channel-1 value
/// about channel 1's offset. Computed pre-clamp; the caller clamps the
/// result to the output interval independently.
pub fn mirror_value(offset1_v: f64, value1_v: f64) -> f64 {
    2.0 * offset1_v - value1_v
}
