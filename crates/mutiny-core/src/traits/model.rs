//! Raw-payload model trait
//!
//! Every cached entity keeps the JSON object it was decoded from next to its typed
//! fields. Partial updates are applied to the raw object and the entity is decoded
//! again, so the typed view and the raw payload never drift apart.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};

/// Raw JSON object backing an entity
pub type RawObject = Map<String, Value>;

/// Mapping from a `clear` marker to the raw path it removes
pub type ClearMarkers = &'static [(&'static str, &'static [&'static str])];

/// Behaviour shared by entities that are cached and patched in place
pub trait Model: DeserializeOwned + Sized {
    /// Name used in error messages and logs
    const NAME: &'static str;

    /// Clear markers understood by this entity
    const CLEAR_MARKERS: ClearMarkers = &[];

    /// The raw payload this entity was decoded from
    fn raw(&self) -> &RawObject;

    /// Replace the stored raw payload (typed fields are not touched)
    fn set_raw(&mut self, raw: RawObject);

    /// Move state that does not live in the payload from the previous value
    fn carry_over(&mut self, _previous: &mut Self) {}

    /// Decode an entity from a raw object
    fn from_raw(raw: RawObject) -> ModelResult<Self> {
        let mut model: Self = serde_json::from_value(Value::Object(raw.clone()))
            .map_err(|e| ModelError::decode(Self::NAME, e))?;
        model.set_raw(raw);
        Ok(model)
    }

    /// Decode an entity from any JSON value, rejecting non-objects
    fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Object(raw) => Self::from_raw(raw),
            other => Err(ModelError::NotAnObject {
                model: Self::NAME,
                found: value_kind(&other).to_string(),
            }),
        }
    }

    /// Apply a partial update: remove every cleared field, then insert every key of `data`
    ///
    /// Fields named in both `clear` and `data` end up with the `data` value.
    /// If the result no longer decodes, the entity is left untouched.
    fn apply_patch(&mut self, clear: &[String], data: &RawObject) -> ModelResult<()> {
        let mut raw = self.raw().clone();

        for marker in clear {
            match Self::CLEAR_MARKERS.iter().find(|(name, _)| name == marker) {
                Some((_, path)) => remove_path(&mut raw, path),
                None => tracing::debug!(
                    model = Self::NAME,
                    marker = %marker,
                    "Ignoring unknown clear marker"
                ),
            }
        }

        for (key, value) in data {
            if key.contains('.') {
                // Nested partial updates (e.g. "profile.content") are not applied
                tracing::debug!(model = Self::NAME, key = %key, "Skipping nested partial update");
                continue;
            }
            raw.insert(key.clone(), value.clone());
        }

        let mut updated = Self::from_raw(raw)?;
        updated.carry_over(self);
        *self = updated;
        Ok(())
    }

    /// Set a single top-level field
    fn set_field(&mut self, key: &str, value: Value) -> ModelResult<()> {
        let mut data = RawObject::new();
        data.insert(key.to_string(), value);
        self.apply_patch(&[], &data)
    }
}

/// Remove the value at `path`, walking nested objects
fn remove_path(raw: &mut RawObject, path: &[&str]) {
    match path {
        [] => {}
        [last] => {
            raw.remove(*last);
        }
        [head, rest @ ..] => {
            if let Some(Value::Object(inner)) = raw.get_mut(*head) {
                remove_path(inner, rest);
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
