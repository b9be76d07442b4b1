// src/config/loader.rs
//! Configuration loading
//!
//! Files are layered over the built-in defaults, so a partial file that
//! only overrides a couple of fields is valid.

use super::EngineConfig;
use crate::error::EngineError;
use std::path::Path;

/// Load and validate an engine configuration from a TOML file.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<EngineConfig, EngineError> {
    let settings = ::config::Config::builder()
        .add_source(::config::File::from(path.as_ref()))
        .build()?;
    let loaded: EngineConfig = settings.try_deserialize()?;
    loaded.validate()?;
    Ok(loaded)
}

/// Parse and validate an engine configuration from inline TOML.
pub fn load_from_toml_str(content: &str) -> Result<EngineConfig, EngineError> {
    let loaded: EngineConfig = toml::from_str(content)?;
    loaded.validate()?;
    Ok(loaded)
}
