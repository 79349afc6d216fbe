//! Raw API models as handed over by the live-listing collaborator.
//!
//! A [`RawModel`] is a field-by-field description of one API object, keeping
//! enough type information (identifiers, named references, optional wrappers,
//! required flags) for the normalizer to decide what to keep and how to
//! flatten it.

use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One API object: an ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawModel {
    pub fields: Vec<RawField>,
}

/// A single field of an API object.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    /// Serialized attribute name; empty for internal-only fields
    pub name: String,
    /// Required fields are kept even when they hold their zero value
    pub required: bool,
    pub value: RawValue,
}

/// Typed value of an API model field.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Uuid(Uuid),
    /// Reference to another resource, carrying its display name
    ResourceRef { id: Uuid, name: String },
    /// Pointer-like optional wrapper
    Optional(Option<Box<RawValue>>),
    List(Vec<RawValue>),
    Map(BTreeMap<String, RawValue>),
    Struct(RawModel),
}

impl RawModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a required field.
    pub fn with(mut self, name: &str, value: RawValue) -> Self {
        self.fields.push(RawField {
            name: name.to_string(),
            required: true,
            value,
        });
        self
    }

    /// Append an optional field (dropped by the normalizer when zero).
    pub fn with_optional(mut self, name: &str, value: RawValue) -> Self {
        self.fields.push(RawField {
            name: name.to_string(),
            required: false,
            value,
        });
        self
    }

    /// Find a field by serialized name.
    pub fn field(&self, name: &str) -> Option<&RawField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Build a model from a JSON API object.
    ///
    /// Every field is treated as required. The `id` field becomes a UUID when
    /// it parses as one, and `{ "id": ..., "name": ... }` objects become
    /// resource references.
    pub fn from_json(object: &serde_json::Map<String, Value>) -> Self {
        let fields = object
            .iter()
            .map(|(name, value)| {
                let value = if name == "id" {
                    match value.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
                        Some(id) => RawValue::Uuid(id),
                        None => RawValue::from_json(value),
                    }
                } else {
                    RawValue::from_json(value)
                };
                RawField {
                    name: name.clone(),
                    required: true,
                    value,
                }
            })
            .collect();
        Self { fields }
    }

    fn is_zero(&self) -> bool {
        self.fields.iter().all(|f| f.value.is_zero())
    }
}

impl RawValue {
    /// Whether this value is its type's zero value.
    pub fn is_zero(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Bool(b) => !b,
            RawValue::Int(i) => *i == 0,
            RawValue::Uint(u) => *u == 0,
            RawValue::Float(f) => *f == 0.0,
            RawValue::String(s) => s.is_empty(),
            RawValue::Uuid(id) => id.is_nil(),
            RawValue::ResourceRef { id, name } => id.is_nil() && name.is_empty(),
            RawValue::Optional(inner) => inner.is_none(),
            RawValue::List(items) => items.is_empty(),
            RawValue::Map(entries) => entries.is_empty(),
            RawValue::Struct(model) => model.is_zero(),
        }
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    RawValue::Uint(u)
                } else {
                    RawValue::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => RawValue::String(s.clone()),
            Value::Array(items) => RawValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(object) => {
                if let Some(reference) = Self::resource_ref_from_json(object) {
                    return reference;
                }
                RawValue::Struct(RawModel::from_json(object))
            }
        }
    }

    fn resource_ref_from_json(object: &serde_json::Map<String, Value>) -> Option<Self> {
        if object.len() != 2 {
            return None;
        }
        let id = object.get("id")?.as_str()?;
        let name = object.get("name")?.as_str()?;
        let id = if id.is_empty() {
            Uuid::nil()
        } else {
            Uuid::parse_str(id).ok()?
        };
        Some(RawValue::ResourceRef {
            id,
            name: name.to_string(),
        })
    }
}
