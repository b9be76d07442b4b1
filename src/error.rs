// src/error.rs
//! Unified error type for the acquisition core
//!
//! Configuration violations are rejected at the boundary where input is
//! accepted; the pure functions inside the core assume validated input.
//! Transducer faults are fatal to the current run and surfaced through
//! [`AcquisitionScheduler::last_fault`](crate::AcquisitionScheduler::last_fault)
//! rather than retried silently.

use thiserror::Error;

/// Errors surfaced by the acquisition core.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration field failed boundary validation.
    #[error("invalid {field}: {reason}")]
    Config {
        /// Name of the rejected field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A configuration file could not be read or merged.
    #[error("configuration file error: {0}")]
    ConfigFile(#[from] ::config::ConfigError),

    /// Inline TOML configuration could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The transducer reported a device I/O failure. Fatal to the current
    /// run; the scheduling loop transitions to `Idle` instead of retrying.
    #[error("transducer fault: {0}")]
    Transducer(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::Config {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn transducer<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EngineError::Transducer(Box::new(err))
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
