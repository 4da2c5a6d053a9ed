//! Settings persistence layer
//!
//! Overrides are stored as a versioned JSON document. Loading is safe
//! against corruption: a bad document falls back to no overrides.

use crate::{OriginOverrides, SettingKey, SettingValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Serializable container for settings overrides
/// Uses BTreeMap for stable ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsOverridesData {
    /// Version of the settings format
    pub version: u32,
    /// Origin-specific overrides
    pub origin_overrides: BTreeMap<String, BTreeMap<String, SettingValue>>,
}

impl SettingsOverridesData {
    /// Current version of the settings format
    pub const CURRENT_VERSION: u32 = 1;

    /// Creates an empty document
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            origin_overrides: BTreeMap::new(),
        }
    }

    /// Creates a document from registry overrides
    pub fn from_overrides(overrides: &OriginOverrides) -> Self {
        let origin_overrides = overrides
            .iter()
            .map(|(origin, settings)| {
                let settings = settings
                    .iter()
                    .map(|(key, value)| (key.as_str().to_string(), value.clone()))
                    .collect();
                (origin.clone(), settings)
            })
            .collect();
        Self {
            version: Self::CURRENT_VERSION,
            origin_overrides,
        }
    }

    /// Converts the document back to registry overrides
    pub fn to_overrides(&self) -> OriginOverrides {
        self.origin_overrides
            .iter()
            .map(|(origin, settings)| {
                let settings = settings
                    .iter()
                    .map(|(key, value)| (SettingKey::new(key.as_str()), value.clone()))
                    .collect();
                (origin.clone(), settings)
            })
            .collect()
    }
}

impl Default for SettingsOverridesData {
    fn default() -> Self {
        Self::new()
    }
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize settings: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize settings: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported settings version: {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes settings overrides to JSON bytes
pub fn serialize_overrides(data: &SettingsOverridesData) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(data).map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
}

/// Deserializes settings overrides from JSON bytes
pub fn deserialize_overrides(bytes: &[u8]) -> PersistenceResult<SettingsOverridesData> {
    let data: SettingsOverridesData = serde_json::from_slice(bytes)
        .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;

    if data.version != SettingsOverridesData::CURRENT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(data.version));
    }

    Ok(data)
}

/// Attempts to load settings from bytes, falling back to defaults on error
pub fn load_overrides_safe(bytes: &[u8]) -> SettingsOverridesData {
    deserialize_overrides(bytes).unwrap_or_else(|e| {
        warn!(error = %e, "discarding settings document");
        SettingsOverridesData::new()
    })
}

/// Reads a settings file
///
/// A missing file is an empty document; a corrupt one falls back to empty too.
pub fn load_file(path: &Path) -> PersistenceResult<SettingsOverridesData> {
    match fs::read(path) {
        Ok(bytes) => Ok(load_overrides_safe(&bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no settings file, using defaults");
            Ok(SettingsOverridesData::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes a settings file
pub fn save_file(path: &Path, data: &SettingsOverridesData) -> PersistenceResult<()> {
    let bytes = serialize_overrides(data)?;
    fs::write(path, bytes)?;
    Ok(())
}
