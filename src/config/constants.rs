// src/config/constants.rs
//! Design-level constants for the acquisition core

/// Electrical characteristics of the analog transducer.
pub mod transducer {
    /// Lower bound of the DAC output interval, volts.
    pub const OUTPUT_MIN_V: f64 = 0.0;

    /// Upper bound of the DAC output interval, volts (2.048 V reference
    /// with the gain factor 2 the observed board ships with).
    pub const OUTPUT_MAX_V: f64 = 4.096;

    /// Zero offset of a raw ADC reading, volts. The device reports
    /// unsigned voltages; subtracting this recovers the signed measurement.
    pub const INPUT_ZERO_OFFSET_V: f64 = 1.5;

    /// First valid ADC input channel.
    pub const INPUT_CHANNEL_MIN: u8 = 1;

    /// Last valid ADC input channel.
    pub const INPUT_CHANNEL_MAX: u8 = 8;
}

/// Scheduling-loop defaults and diagnostics thresholds.
pub mod engine {
    /// Default target sampling/update rate, Hz.
    pub const DEFAULT_TARGET_RATE_HZ: f64 = 500.0;

    /// Default retained-sample window.
    pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

    /// Default ADC channel wired to output 1.
    pub const DEFAULT_INPUT_CHANNEL1: u8 = 7;

    /// Default ADC channel wired to output 2.
    pub const DEFAULT_INPUT_CHANNEL2: u8 = 8;

    /// Samples between achieved-rate recomputations. Coarser than the
    /// sampling period so the diagnostic never competes with pacing.
    pub const RATE_REPORT_INTERVAL: u64 = 128;

    /// Achieved/target ratio below which a sustained-overrun warning is logged.
    pub const OVERRUN_WARN_RATIO: f64 = 0.9;
}

/// Waveform-spec defaults matching the observed bench setup.
pub mod waveform {
    /// Default channel-1 frequency, Hz.
    pub const DEFAULT_FREQUENCY1_HZ: f64 = 10.0;

    /// Default channel-2 frequency, Hz.
    pub const DEFAULT_FREQUENCY2_HZ: f64 = 200.0;

    /// Default peak amplitude, volts.
    pub const DEFAULT_AMPLITUDE_V: f64 = 1.0;

    /// Default DC offset, volts.
    pub const DEFAULT_OFFSET_V: f64 = 0.0;
}
