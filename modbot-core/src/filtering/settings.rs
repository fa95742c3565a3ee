use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::Error;

/// Filter-type specific settings stored in a filter's `additional_settings`.
pub trait ExtraSettings: DeserializeOwned + Serialize + Default {
    /// Checks that go beyond what the types can express.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Parse raw extra settings into their typed form.
///
/// `null` means no overrides, so every field takes its default.
pub fn parse_settings<T: ExtraSettings>(value: &Value) -> Result<T, Error> {
    let settings: T = if value.is_null() {
        T::default()
    } else {
        serde_path_to_error::deserialize(value).map_err(|e| {
            Error::InvalidSettings(format!("{}: {}", e.path(), e.inner()))
        })?
    };

    settings.validate().map_err(Error::InvalidSettings)?;
    Ok(settings)
}

/// Check user-supplied settings, returning the reason they were rejected.
pub fn validate_settings<T: ExtraSettings>(value: &Value) -> Result<(), String> {
    parse_settings::<T>(value).map(|_| ()).map_err(|e| match e {
        Error::InvalidSettings(reason) => reason,
        other => other.to_string(),
    })
}

/// The typed fields of `parsed` that were present in `raw`.
///
/// Fields that fell back to a default are not reported, so callers can tell
/// a per-filter override apart from the filter type's defaults.
pub fn explicit_fields<T: ExtraSettings>(raw: &Value, parsed: &T) -> Map<String, Value> {
    let Some(raw) = raw.as_object() else {
        return Map::new();
    };
    let Ok(Value::Object(mut typed)) = serde_json::to_value(parsed) else {
        return Map::new();
    };

    typed.retain(|field, _| raw.contains_key(field));
    typed
}
