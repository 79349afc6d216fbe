//! Live resources: snapshots of resources observed in the remote system.
//!
//! The normalizer turns a [`RawModel`] into a [`LiveResource`] whose
//! attributes are plain JSON values. Named references collapse to their
//! identifier and identifiers render as strings, so nothing downstream needs
//! to know about the API model types.

use crate::error::{Error, Result};
use crate::model::{RawModel, RawValue};
use crate::registry::ResourceTypeDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Attribute carrying the remote-stable identifier.
pub const ID_FIELD: &str = "id";
/// Attribute marking resources owned by the remote system.
pub const SYSTEM_FIELD: &str = "is_system";
/// Etag-like attribute that changes on every read.
pub const VERSION_FIELD: &str = "version";
/// Attribute used for display and for name-based matching.
pub const NAME_FIELD: &str = "name";

/// One resource instance observed in the remote system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveResource {
    pub type_tag: String,
    /// Remote-stable identifier (typically a UUID)
    pub remote_id: String,
    /// Manifest ID this resource was matched to, if any
    #[serde(default)]
    pub manifest_id: Option<String>,
    /// System-owned resources are never managed through a manifest
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl LiveResource {
    pub fn new(type_tag: &str, remote_id: &str) -> Self {
        Self {
            type_tag: type_tag.to_string(),
            remote_id: remote_id.to_string(),
            manifest_id: None,
            is_system: false,
            attributes: Map::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Mark as system-owned.
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Value of the `name` attribute when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get(NAME_FIELD).and_then(Value::as_str)
    }

    /// Whether this resource has been matched to a manifest entry.
    pub fn is_matched(&self) -> bool {
        self.manifest_id.is_some()
    }

    /// Human-readable description: name and id, or just the id.
    pub fn describe(&self) -> String {
        match self.name() {
            Some(name) => format!("{name} (id {})", self.remote_id),
            None => self.remote_id.clone(),
        }
    }

    /// Normalize a raw API model of the type described by `descriptor`.
    pub fn normalize(descriptor: &ResourceTypeDescriptor, model: &RawModel) -> Result<Self> {
        let type_tag = descriptor.type_tag.as_str();
        let remote_id = match model.field(ID_FIELD).map(|f| &f.value) {
            Some(RawValue::Uuid(id)) => id.to_string(),
            Some(_) => {
                return Err(Error::malformed(type_tag, "id field is not an identifier"));
            }
            None => return Err(Error::malformed(type_tag, "missing id field")),
        };

        let mut resource = Self::new(type_tag, &remote_id);
        for field in &model.fields {
            let name = field.name.as_str();
            if name.is_empty() || name == ID_FIELD || name == VERSION_FIELD {
                continue;
            }
            if name == SYSTEM_FIELD {
                resource.is_system = matches!(field.value, RawValue::Bool(true));
                continue;
            }
            if descriptor.omit.contains(name) {
                continue;
            }
            if !field.required && field.value.is_zero() {
                continue;
            }
            let value = transform(&field.value)
                .map_err(|message| Error::malformed(type_tag, format!("field {name}: {message}")))?;
            resource.attributes.insert(name.to_string(), value);
        }

        log::trace!("normalized {type_tag} {}", resource.describe());
        Ok(resource)
    }
}

fn transform(value: &RawValue) -> std::result::Result<Value, String> {
    Ok(match value {
        RawValue::Null | RawValue::Optional(None) => Value::Null,
        RawValue::Bool(b) => Value::Bool(*b),
        RawValue::Int(i) => Value::from(*i),
        RawValue::Uint(u) => Value::from(*u),
        RawValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        RawValue::String(s) => Value::String(s.clone()),
        RawValue::Uuid(id) => Value::String(id.to_string()),
        RawValue::ResourceRef { id, name } => {
            if id.is_nil() && !name.is_empty() {
                return Err(format!("reference to {name} has a nil ID"));
            }
            Value::String(id.to_string())
        }
        RawValue::Optional(Some(inner)) => transform(inner)?,
        RawValue::List(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| transform(item).map_err(|e| format!("index {i}: {e}")))
                .collect::<std::result::Result<_, _>>()?,
        ),
        RawValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), transform(v).map_err(|e| format!("key {k}: {e}"))?)))
                .collect::<std::result::Result<_, String>>()?,
        ),
        RawValue::Struct(model) => {
            let mut object = Map::new();
            for field in &model.fields {
                if field.name.is_empty() || (!field.required && field.value.is_zero()) {
                    continue;
                }
                let value =
                    transform(&field.value).map_err(|e| format!("field {}: {e}", field.name))?;
                object.insert(field.name.clone(), value);
            }
            Value::Object(object)
        }
    })
}
