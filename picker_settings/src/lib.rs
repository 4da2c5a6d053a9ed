//! # Picker Settings
//!
//! Typed, origin-scoped settings for the column picker.
//!
//! ## Philosophy
//!
//! - **Typed settings**: All settings have explicit types, not stringly-typed
//! - **Origin-scoped**: Overrides belong to one sandbox origin and never leak to another
//! - **Layered**: Read-only defaults + per-origin overrides
//! - **Deterministic**: Settings are serializable and reproducible
//!
//! ## Example
//!
//! ```
//! use picker_settings::{create_default_registry, keys, PickerSettings, SettingValue};
//!
//! let mut registry = create_default_registry();
//! registry.set_origin_override("https://app.example", keys::SHOW_HIDDEN, SettingValue::Boolean(true));
//!
//! let settings = PickerSettings::resolve(&registry, "https://app.example");
//! assert!(settings.show_hidden);
//! assert!(!PickerSettings::resolve(&registry, "local").show_hidden);
//! ```

pub mod persistence;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Setting key (path-like identifier)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettingKey(String);

impl SettingKey {
    /// Creates a new setting key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SettingKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Setting value (strongly typed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// String value
    String(String),
}

impl SettingValue {
    /// Tries to get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Tries to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Boolean(_) => "boolean",
            SettingValue::Integer(_) => "integer",
            SettingValue::String(_) => "string",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Boolean(v) => write!(f, "{}", v),
            SettingValue::Integer(v) => write!(f, "{}", v),
            SettingValue::String(v) => write!(f, "{}", v),
        }
    }
}

/// Sandbox origin an override belongs to
pub type OriginId = String;

/// Overrides grouped by origin
pub type OriginOverrides = BTreeMap<OriginId, BTreeMap<SettingKey, SettingValue>>;

/// Settings registry
#[derive(Debug, Clone, Default)]
pub struct SettingsRegistry {
    /// Default settings (read-only)
    defaults: BTreeMap<SettingKey, SettingValue>,
    /// Origin-specific overrides
    origin_overrides: OriginOverrides,
}

impl SettingsRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a default setting
    pub fn register_default(&mut self, key: impl Into<SettingKey>, value: SettingValue) {
        self.defaults.insert(key.into(), value);
    }

    /// Sets an origin-specific override
    pub fn set_origin_override(
        &mut self,
        origin: impl Into<OriginId>,
        key: impl Into<SettingKey>,
        value: SettingValue,
    ) {
        self.origin_overrides
            .entry(origin.into())
            .or_default()
            .insert(key.into(), value);
    }

    /// Gets the effective value for an origin (override or default)
    pub fn get(&self, origin: &str, key: &SettingKey) -> Option<&SettingValue> {
        self.get_origin_override(origin, key)
            .or_else(|| self.defaults.get(key))
    }

    /// Gets the override (if any) for a setting
    pub fn get_origin_override(&self, origin: &str, key: &SettingKey) -> Option<&SettingValue> {
        self.origin_overrides
            .get(origin)
            .and_then(|settings| settings.get(key))
    }

    /// Exports all overrides for persistence
    pub fn export_overrides(&self) -> OriginOverrides {
        self.origin_overrides.clone()
    }

    /// Imports overrides (replaces existing overrides)
    pub fn import_overrides(&mut self, overrides: OriginOverrides) {
        self.origin_overrides = overrides;
    }
}

/// Setting keys used by the picker
pub mod keys {
    /// Whether dot-entries are listed
    pub const SHOW_HIDDEN: &str = "picker.show_hidden";
    /// Maximum number of history entries (0 = unbounded)
    pub const HISTORY_LIMIT: &str = "picker.history_limit";
    /// Width of one column in the text renderer
    pub const COLUMN_WIDTH: &str = "picker.column_width";
}

/// Creates a registry holding the picker defaults
pub fn create_default_registry() -> SettingsRegistry {
    let defaults = PickerSettings::default();
    let mut registry = SettingsRegistry::new();

    registry.register_default(keys::SHOW_HIDDEN, SettingValue::Boolean(defaults.show_hidden));
    registry.register_default(
        keys::HISTORY_LIMIT,
        SettingValue::Integer(defaults.history_limit as i64),
    );
    registry.register_default(
        keys::COLUMN_WIDTH,
        SettingValue::Integer(defaults.column_width as i64),
    );

    registry
}

/// Effective picker settings for one origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PickerSettings {
    pub show_hidden: bool,
    pub history_limit: usize,
    pub column_width: usize,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            show_hidden: false,
            history_limit: 256,
            column_width: 24,
        }
    }
}

impl PickerSettings {
    /// Resolves the settings an origin sees
    ///
    /// Values of the wrong type or out of range fall back to the built-in default.
    pub fn resolve(registry: &SettingsRegistry, origin: &str) -> Self {
        let defaults = Self::default();
        Self {
            show_hidden: lookup(registry, origin, keys::SHOW_HIDDEN, SettingValue::as_boolean)
                .unwrap_or(defaults.show_hidden),
            history_limit: lookup(registry, origin, keys::HISTORY_LIMIT, as_count)
                .unwrap_or(defaults.history_limit),
            column_width: lookup(registry, origin, keys::COLUMN_WIDTH, as_count)
                .filter(|width| *width > 0)
                .unwrap_or(defaults.column_width),
        }
    }
}

fn as_count(value: &SettingValue) -> Option<usize> {
    value.as_integer().and_then(|v| usize::try_from(v).ok())
}

fn lookup<T>(
    registry: &SettingsRegistry,
    origin: &str,
    key: &str,
    convert: impl Fn(&SettingValue) -> Option<T>,
) -> Option<T> {
    let value = registry.get(origin, &SettingKey::new(key))?;
    let converted = convert(value);
    if converted.is_none() {
        warn!(key, origin, found = value.type_name(), value = %value, "ignoring unusable setting");
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_value_accessors() {
        assert_eq!(SettingValue::Boolean(true).as_boolean(), Some(true));
        assert_eq!(SettingValue::Boolean(true).as_integer(), None);
        assert_eq!(SettingValue::Integer(42).as_integer(), Some(42));
        assert_eq!(SettingValue::String("x".to_string()).as_boolean(), None);
    }

    #[test]
    fn test_registry_origin_override() {
        let mut registry = SettingsRegistry::new();
        registry.register_default("test.key", SettingValue::Integer(42));
        registry.set_origin_override("https://one.example", "test.key", SettingValue::Integer(100));

        let key = SettingKey::new("test.key");
        assert_eq!(registry.get("https://one.example", &key), Some(&SettingValue::Integer(100)));
        assert_eq!(registry.get("https://two.example", &key), Some(&SettingValue::Integer(42)));
    }

    #[test]
    fn test_export_import_replaces_overrides() {
        let mut registry = create_default_registry();
        registry.set_origin_override("local", keys::SHOW_HIDDEN, SettingValue::Boolean(true));
        let exported = registry.export_overrides();

        let mut restored = create_default_registry();
        restored.set_origin_override("other", keys::COLUMN_WIDTH, SettingValue::Integer(8));
        restored.import_overrides(exported);

        assert!(PickerSettings::resolve(&restored, "local").show_hidden);
        assert_eq!(PickerSettings::resolve(&restored, "other").column_width, 24);
    }

    #[test]
    fn test_default_registry() {
        let registry = create_default_registry();
        assert_eq!(
            registry.get("local", &SettingKey::new(keys::HISTORY_LIMIT)),
            Some(&SettingValue::Integer(256))
        );
        assert_eq!(
            registry.get("local", &SettingKey::new(keys::SHOW_HIDDEN)),
            Some(&SettingValue::Boolean(false))
        );
        assert_eq!(
            registry.get("local", &SettingKey::new(keys::COLUMN_WIDTH)),
            Some(&SettingValue::Integer(24))
        );
    }

    #[test]
    fn test_resolve_defaults() {
        let registry = create_default_registry();
        assert_eq!(PickerSettings::resolve(&registry, "local"), PickerSettings::default());
    }

    #[test]
    fn test_resolve_from_empty_registry() {
        let registry = SettingsRegistry::new();
        assert_eq!(PickerSettings::resolve(&registry, "local"), PickerSettings::default());
    }

    #[test]
    fn test_resolve_overrides() {
        let mut registry = create_default_registry();
        registry.set_origin_override("local", keys::HISTORY_LIMIT, SettingValue::Integer(0));
        registry.set_origin_override("local", keys::COLUMN_WIDTH, SettingValue::Integer(16));

        let settings = PickerSettings::resolve(&registry, "local");
        assert_eq!(settings.history_limit, 0);
        assert_eq!(settings.column_width, 16);
        assert!(!settings.show_hidden);
    }

    #[test]
    fn test_resolve_ignores_unusable_values() {
        let mut registry = create_default_registry();
        registry.set_origin_override("local", keys::SHOW_HIDDEN, SettingValue::Integer(1));
        registry.set_origin_override("local", keys::HISTORY_LIMIT, SettingValue::Integer(-5));
        registry.set_origin_override("local", keys::COLUMN_WIDTH, SettingValue::Integer(0));

        assert_eq!(PickerSettings::resolve(&registry, "local"), PickerSettings::default());
    }
}
