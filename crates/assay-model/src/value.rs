use indexmap::IndexMap;

use crate::property::PropertyKind;
use crate::registry::{TypeRegistry, INSTANCED_STRUCT};

/// Sentinel integer value meaning "no index".
pub const INDEX_NONE: i64 = -1;

/// Name value that counts as unset.
pub const NAME_NONE: &str = "None";

/// A property value inside an object or struct instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// String, name and text values.
    Str(String),
    /// Byte and enum values, stored as the underlying integer.
    Enum(i64),
    /// Hard object reference by object path.
    Object(Option<String>),
    /// Soft object reference by object path.
    SoftObject(Option<String>),
    Struct(StructValue),
    /// Dynamically typed struct payload.
    Instanced(Option<Box<StructValue>>),
    Array(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

/// Field values of one struct instance.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub struct_type: String,
    pub fields: IndexMap<String, Value>,
}

impl StructValue {
    pub fn new(struct_type: impl Into<String>) -> Self {
        Self {
            struct_type: struct_type.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String-like field, treating a missing field as empty.
    pub fn str_field(&self, name: &str) -> &str {
        self.field(name).and_then(Value::as_str).unwrap_or_default()
    }
}

impl Value {
    /// Zero value of a property kind. Struct defaults are filled from the registry.
    pub fn default_for(kind: &PropertyKind, types: &TypeRegistry) -> Value {
        match kind {
            PropertyKind::Bool => Value::Bool(false),
            PropertyKind::Int => Value::Int(0),
            PropertyKind::Float => Value::Float(0.0),
            PropertyKind::Str | PropertyKind::Text => Value::Str(String::new()),
            PropertyKind::Name => Value::Str(NAME_NONE.to_string()),
            PropertyKind::Byte { .. } | PropertyKind::Enum { .. } => Value::Enum(0),
            PropertyKind::Object { .. } => Value::Object(None),
            PropertyKind::SoftObject { .. } => Value::SoftObject(None),
            PropertyKind::Struct { struct_type } if struct_type == INSTANCED_STRUCT => {
                Value::Instanced(None)
            }
            PropertyKind::Struct { struct_type } => {
                let mut value = StructValue::new(struct_type.clone());
                types.complete_struct(&mut value);
                Value::Struct(value)
            }
            PropertyKind::Array { .. } => Value::Array(Vec::new()),
            PropertyKind::Set { .. } => Value::Set(Vec::new()),
            PropertyKind::Map { .. } => Value::Map(Vec::new()),
        }
    }

    pub fn object(path: impl Into<String>) -> Value {
        Value::Object(Some(path.into()))
    }

    pub fn string(value: impl Into<String>) -> Value {
        Value::Str(value.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer view: ints and enum values.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) | Value::Enum(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view in double precision.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) | Value::Enum(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Referenced object path, `Some(None)` for a null reference.
    pub fn as_object_ref(&self) -> Option<Option<&str>> {
        match self {
            Value::Object(path) | Value::SoftObject(path) => Some(path.as_deref()),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(value) => Some(value),
            _ => None,
        }
    }

    /// Name values are unset when empty or `None`.
    pub fn is_none_name(value: &str) -> bool {
        value.is_empty() || value.eq_ignore_ascii_case(NAME_NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let types = TypeRegistry::with_builtins();
        assert_eq!(Value::default_for(&PropertyKind::Int, &types), Value::Int(0));
        assert_eq!(
            Value::default_for(&PropertyKind::Name, &types),
            Value::string("None")
        );
        assert_eq!(
            Value::default_for(&PropertyKind::object("Actor"), &types),
            Value::Object(None)
        );
        assert_eq!(
            Value::default_for(&PropertyKind::structure(INSTANCED_STRUCT), &types),
            Value::Instanced(None)
        );
    }

    #[test]
    fn test_struct_default_is_complete() {
        let types = TypeRegistry::with_builtins();
        let value = Value::default_for(&PropertyKind::structure("GameplayTag"), &types);
        let value = value.as_struct().unwrap();
        assert_eq!(value.field("TagName"), Some(&Value::string("None")));
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Enum(2).as_int(), Some(2));
        assert_eq!(Value::Float(1.5).as_int(), None);
        assert_eq!(Value::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_object_ref_view() {
        assert_eq!(Value::Object(None).as_object_ref(), Some(None));
        assert_eq!(Value::object("/Game/A").as_object_ref(), Some(Some("/Game/A")));
        assert_eq!(Value::Int(0).as_object_ref(), None);
    }

    #[test]
    fn test_none_names() {
        assert!(Value::is_none_name(""));
        assert!(Value::is_none_name("None"));
        assert!(Value::is_none_name("none"));
        assert!(Value::is_none_name("NONE"));
        assert!(!Value::is_none_name("Weapon"));
    }
}
