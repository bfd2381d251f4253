//! Record and identity types.
//!
//! A record is an arbitrary JSON object. Its identity lives in the `id` field
//! and is either an integer or a string.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{CoreError, Result};

/// Name of the identity field every record is keyed by.
pub const ID_FIELD: &str = "id";

/// Identity of a record within a store.
///
/// Serializes as the bare JSON scalar, so `{"id": 1}` and `{"id": "abc"}`
/// both round-trip through a [`Record`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer identity, the kind assigned by stores.
    Int(i64),
    /// Caller-chosen string identity.
    Str(String),
}

impl RecordId {
    /// Read an identity out of a JSON value.
    ///
    /// `null` means "no identity"; anything other than an integer or a
    /// string is rejected.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(Self::Str(s.clone()))),
            Value::Number(n) => n
                .as_i64()
                .map(|i| Some(Self::Int(i)))
                .ok_or_else(|| CoreError::InvalidId(n.to_string())),
            other => Err(CoreError::InvalidId(other.to_string())),
        }
    }

    /// Convert to the JSON scalar stored in the `id` field.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(i) => Value::from(*i),
            Self::Str(s) => Value::String(s.clone()),
        }
    }

    /// The integer value, if this is an integer identity.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "RecordId({})", i),
            Self::Str(s) => write!(f, "RecordId({:?})", s),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// A keyed record: a JSON object whose `id` field is its identity.
///
/// Records are replaced whole by `put`, never patched in place by a store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record with no identity.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a record from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => {
                if let Some(id) = map.get(ID_FIELD) {
                    RecordId::from_value(id)?;
                }
                Ok(Self(map))
            }
            Value::Null => Err(CoreError::NotAnObject("null")),
            Value::Bool(_) => Err(CoreError::NotAnObject("bool")),
            Value::Number(_) => Err(CoreError::NotAnObject("number")),
            Value::String(_) => Err(CoreError::NotAnObject("string")),
            Value::Array(_) => Err(CoreError::NotAnObject("array")),
        }
    }

    /// Builder: set the identity.
    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.set_id(id.into());
        self
    }

    /// Builder: set a field.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// The record's identity, if it has a valid one.
    pub fn id(&self) -> Option<RecordId> {
        self.try_id().ok().flatten()
    }

    /// The record's identity, rejecting malformed `id` values.
    pub fn try_id(&self) -> Result<Option<RecordId>> {
        match self.0.get(ID_FIELD) {
            Some(value) => RecordId::from_value(value),
            None => Ok(None),
        }
    }

    /// Overwrite the identity.
    pub fn set_id(&mut self, id: RecordId) {
        self.0.insert(ID_FIELD.to_string(), id.to_value());
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field value, returning the previous one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Remove a field, returning its value.
    pub fn remove_field(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Borrow the underlying JSON object.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for Record {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_from_value() {
        assert_eq!(RecordId::from_value(&json!(7)).unwrap(), Some(RecordId::Int(7)));
        assert_eq!(
            RecordId::from_value(&json!("abc")).unwrap(),
            Some(RecordId::Str("abc".into()))
        );
        assert_eq!(RecordId::from_value(&Value::Null).unwrap(), None);
        assert!(RecordId::from_value(&json!(1.5)).is_err());
        assert!(RecordId::from_value(&json!([1])).is_err());
    }

    #[test]
    fn test_record_id_serializes_as_scalar() {
        assert_eq!(serde_json::to_string(&RecordId::Int(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&RecordId::from("x")).unwrap(), "\"x\"");
        let back: RecordId = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(back, RecordId::from("x"));
    }

    #[test]
    fn test_record_rejects_non_objects() {
        assert!(matches!(
            Record::from_value(json!([1, 2])),
            Err(CoreError::NotAnObject("array"))
        ));
        assert!(matches!(
            Record::from_value(json!({"id": {"nested": true}})),
            Err(CoreError::InvalidId(_))
        ));
    }

    #[test]
    fn test_record_builder() {
        let record = Record::new().with_id(1).with("firstName", "Angus");
        assert_eq!(record.id(), Some(RecordId::Int(1)));
        assert_eq!(record.get("firstName"), Some(&json!("Angus")));
        assert_eq!(record.into_value(), json!({"id": 1, "firstName": "Angus"}));
    }

    #[test]
    fn test_record_without_id() {
        let record = Record::from_value(json!({"name": "anon"})).unwrap();
        assert_eq!(record.id(), None);

        let record = Record::from_value(json!({"id": null})).unwrap();
        assert_eq!(record.id(), None);
    }
}
