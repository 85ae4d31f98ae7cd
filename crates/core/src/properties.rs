//! Property maps: the bulk configuration surface
//!
//! Builders are configured in bulk from a [`PropertyMap`], a JSON object
//! keyed by attribute name. Keys that no attribute recognises are ignored by
//! the builder and left in the map, so configuration can be shared between
//! builders of different kinds.
//!
//! Property maps can be loaded from TOML tables:
//!
//! ```toml
//! size = 16
//! base_rate = 2.5
//! label = "cortex"
//! ```

use serde_json::Value;

use crate::error::{BuilderError, BuilderResult};

/// Attribute name to JSON value
pub type PropertyMap = serde_json::Map<String, Value>;

/// Parse a TOML table into a property map
///
/// # Errors
///
/// Returns [`BuilderError::Config`] if the text is not valid TOML.
pub fn properties_from_toml(source: &str) -> BuilderResult<PropertyMap> {
    let table: toml::Table =
        toml::from_str(source).map_err(|e| BuilderError::Config(format!("Failed to parse TOML properties: {}", e)))?;
    match serde_json::to_value(table) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(BuilderError::Config(format!(
            "TOML properties must be a table, got {}",
            other
        ))),
        Err(e) => Err(BuilderError::Config(format!("Failed to convert TOML properties: {}", e))),
    }
}

/// Parse a JSON object into a property map
///
/// # Errors
///
/// Returns [`BuilderError::Config`] if the text is not a JSON object.
pub fn properties_from_json(source: &str) -> BuilderResult<PropertyMap> {
    match serde_json::from_str::<Value>(source) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(BuilderError::Config(format!(
            "JSON properties must be an object, got {}",
            other
        ))),
        Err(e) => Err(BuilderError::Config(format!("Failed to parse JSON properties: {}", e))),
    }
}
