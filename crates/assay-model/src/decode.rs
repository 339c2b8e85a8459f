//! JSON to [`Value`] decoding, guided by the declared property kinds.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::content::{Object, ObjectFlags};
use crate::error::ReflectError;
use crate::property::{Property, PropertyKind};
use crate::registry::{TypeCategory, TypeRegistry, INSTANCED_STRUCT};
use crate::value::{StructValue, Value};

/// Object as written in `*.objects.json`, before its fields are decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObject {
    pub path: String,
    pub class: String,
    #[serde(default)]
    pub flags: ObjectFlags,
    #[serde(default)]
    pub fields: serde_json::Map<String, Json>,
}

impl RawObject {
    /// Decode field values against the object's class.
    pub fn decode(self, types: &TypeRegistry) -> Result<Object, ReflectError> {
        if types.class(&self.class).is_none() {
            return Err(ReflectError::UnknownClass(self.class));
        }
        let fields = decode_fields(types, TypeCategory::Class, &self.class, &self.fields)?;
        Ok(Object {
            path: self.path,
            class: self.class,
            flags: self.flags,
            fields,
        })
    }
}

/// Decode the fields of a class or struct instance. Unset fields are left out.
pub fn decode_fields(
    types: &TypeRegistry,
    category: TypeCategory,
    type_name: &str,
    json: &serde_json::Map<String, Json>,
) -> Result<IndexMap<String, Value>, ReflectError> {
    let mut fields = IndexMap::new();
    for (name, raw) in json {
        let (_, property) = types
            .find_property(category, type_name, name)
            .ok_or_else(|| ReflectError::UnknownField {
                owner: type_name.to_string(),
                field: name.clone(),
            })?;
        fields.insert(name.clone(), decode_value(types, property, raw)?);
    }
    Ok(fields)
}

/// Decode one JSON value as the given property.
pub fn decode_value(types: &TypeRegistry, property: &Property, json: &Json) -> Result<Value, ReflectError> {
    let mismatch = || ReflectError::TypeMismatch {
        property: property.name.clone(),
        expected: property.tag(),
        found: json_kind(json).to_string(),
    };

    let value = match &property.kind {
        PropertyKind::Bool => Value::Bool(json.as_bool().ok_or_else(mismatch)?),
        PropertyKind::Int => Value::Int(json.as_i64().ok_or_else(mismatch)?),
        PropertyKind::Float => Value::Float(json.as_f64().ok_or_else(mismatch)?),
        PropertyKind::Str | PropertyKind::Name | PropertyKind::Text => {
            Value::Str(json.as_str().ok_or_else(mismatch)?.to_string())
        }
        PropertyKind::Byte { enum_type } => match (json, enum_type) {
            (Json::Number(n), _) => Value::Enum(n.as_i64().ok_or_else(mismatch)?),
            (Json::String(member), Some(enum_type)) => {
                Value::Enum(enum_member(types, enum_type, member)?)
            }
            _ => return Err(mismatch()),
        },
        PropertyKind::Enum { enum_type } => match json {
            Json::Number(n) => Value::Enum(n.as_i64().ok_or_else(mismatch)?),
            Json::String(member) => Value::Enum(enum_member(types, enum_type, member)?),
            _ => return Err(mismatch()),
        },
        PropertyKind::Object { .. } => Value::Object(object_path(json).ok_or_else(mismatch)?),
        PropertyKind::SoftObject { .. } => {
            Value::SoftObject(object_path(json).ok_or_else(mismatch)?)
        }
        PropertyKind::Struct { struct_type } if struct_type == INSTANCED_STRUCT => match json {
            Json::Null => Value::Instanced(None),
            Json::Object(map) => {
                let payload_type = map.get("type").and_then(Json::as_str).ok_or_else(mismatch)?;
                let empty = serde_json::Map::new();
                let payload = match map.get("value") {
                    Some(Json::Object(value)) => value,
                    Some(Json::Null) | None => &empty,
                    Some(_) => return Err(mismatch()),
                };
                Value::Instanced(Some(Box::new(decode_struct(types, payload_type, payload)?)))
            }
            _ => return Err(mismatch()),
        },
        PropertyKind::Struct { struct_type } => match json {
            Json::Object(map) => Value::Struct(decode_struct(types, struct_type, map)?),
            _ => return Err(mismatch()),
        },
        PropertyKind::Array { element } => Value::Array(decode_items(types, element, json, mismatch)?),
        PropertyKind::Set { element } => Value::Set(decode_items(types, element, json, mismatch)?),
        PropertyKind::Map { key, value } => {
            let mut entries = Vec::new();
            match json {
                Json::Array(pairs) => {
                    for pair in pairs {
                        let [k, v] = pair.as_array().map(Vec::as_slice).unwrap_or_default() else {
                            return Err(mismatch());
                        };
                        entries.push((decode_value(types, key, k)?, decode_value(types, value, v)?));
                    }
                }
                Json::Object(map) if is_string_like(&key.kind) => {
                    for (k, v) in map {
                        entries.push((Value::Str(k.clone()), decode_value(types, value, v)?));
                    }
                }
                _ => return Err(mismatch()),
            }
            Value::Map(entries)
        }
    };
    Ok(value)
}

fn decode_items(
    types: &TypeRegistry,
    element: &Property,
    json: &Json,
    mismatch: impl Fn() -> ReflectError,
) -> Result<Vec<Value>, ReflectError> {
    json.as_array()
        .ok_or_else(mismatch)?
        .iter()
        .map(|item| decode_value(types, element, item))
        .collect()
}

/// Decode a struct value and fill the fields it leaves out with defaults.
pub fn decode_struct(
    types: &TypeRegistry,
    struct_type: &str,
    json: &serde_json::Map<String, Json>,
) -> Result<StructValue, ReflectError> {
    if types.struct_def(struct_type).is_none() {
        return Err(ReflectError::UnknownStruct(struct_type.to_string()));
    }
    let mut value = StructValue {
        struct_type: struct_type.to_string(),
        fields: decode_fields(types, TypeCategory::Struct, struct_type, json)?,
    };
    types.complete_struct(&mut value);
    Ok(value)
}

/// Enum member by name, accepting both `Member` and `EType::Member`.
fn enum_member(types: &TypeRegistry, enum_type: &str, member: &str) -> Result<i64, ReflectError> {
    let def = types
        .enum_def(enum_type)
        .ok_or_else(|| ReflectError::UnknownEnum(enum_type.to_string()))?;
    let short = member
        .strip_prefix(enum_type)
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(member);
    def.value_of(short)
        .ok_or_else(|| ReflectError::UnknownEnumMember {
            enum_type: enum_type.to_string(),
            member: member.to_string(),
        })
}

fn object_path(json: &Json) -> Option<Option<String>> {
    match json {
        Json::Null => Some(None),
        Json::String(path) if path.is_empty() => Some(None),
        Json::String(path) => Some(Some(path.clone())),
        _ => None,
    }
}

fn is_string_like(kind: &PropertyKind) -> bool {
    matches!(kind, PropertyKind::Str | PropertyKind::Name | PropertyKind::Text)
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{EnumDef, TypeDef, GAMEPLAY_TAG};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn types() -> TypeRegistry {
        let mut types = TypeRegistry::with_builtins();
        types
            .add_enum(EnumDef::sequential("EQuality", &["None", "Common", "Rare"]))
            .unwrap();
        types
            .add_struct(
                TypeDef::new("Loot", "/Game/Data")
                    .with_property(Property::new("Item", PropertyKind::object("Item")))
                    .with_property(Property::new("Chance", PropertyKind::Float)),
            )
            .unwrap();
        types
            .add_class(
                TypeDef::new("Chest", "/Game/Data")
                    .with_property(Property::new("Quality", PropertyKind::enumeration("EQuality")))
                    .with_property(Property::new(
                        "Loot",
                        PropertyKind::array(PropertyKind::structure("Loot")),
                    ))
                    .with_property(Property::new(
                        "Weights",
                        PropertyKind::map(PropertyKind::Name, PropertyKind::Int),
                    ))
                    .with_property(Property::new(
                        "Payload",
                        PropertyKind::structure(INSTANCED_STRUCT),
                    )),
            )
            .unwrap();
        types
    }

    fn decode(types: &TypeRegistry, property: &str, json: Json) -> Result<Value, ReflectError> {
        let (_, property) = types
            .find_property(TypeCategory::Class, "Chest", property)
            .unwrap();
        decode_value(types, property, &json)
    }

    #[test]
    fn test_enum_by_name_or_number() {
        let types = types();
        assert_eq!(decode(&types, "Quality", json!("Rare")).unwrap(), Value::Enum(2));
        assert_eq!(
            decode(&types, "Quality", json!("EQuality::Common")).unwrap(),
            Value::Enum(1)
        );
        assert_eq!(decode(&types, "Quality", json!(0)).unwrap(), Value::Enum(0));
        let err = decode(&types, "Quality", json!("Epic")).unwrap_err();
        assert!(matches!(err, ReflectError::UnknownEnumMember { .. }));
    }

    #[test]
    fn test_struct_array_completes_defaults() {
        let types = types();
        let value = decode(&types, "Loot", json!([{ "Item": "/Game/Sword.Sword" }, {}])).unwrap();
        let Value::Array(items) = value else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 2);
        let second = items[1].as_struct().unwrap();
        assert_eq!(second.field("Item"), Some(&Value::Object(None)));
        assert_eq!(second.field("Chance"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn test_map_pairs_and_object_forms() {
        let types = types();
        let pairs = decode(&types, "Weights", json!([["Gold", 3]])).unwrap();
        let object = decode(&types, "Weights", json!({ "Gold": 3 })).unwrap();
        assert_eq!(pairs, object);
        assert_eq!(pairs, Value::Map(vec![(Value::string("Gold"), Value::Int(3))]));
    }

    #[test]
    fn test_instanced_struct() {
        let types = types();
        assert_eq!(decode(&types, "Payload", Json::Null).unwrap(), Value::Instanced(None));

        let value = decode(
            &types,
            "Payload",
            json!({ "type": GAMEPLAY_TAG, "value": { "TagName": "Loot.Rare" } }),
        )
        .unwrap();
        let Value::Instanced(Some(payload)) = value else {
            panic!("expected payload");
        };
        assert_eq!(payload.struct_type, GAMEPLAY_TAG);
        assert_eq!(payload.str_field("TagName"), "Loot.Rare");
    }

    #[test]
    fn test_type_mismatch() {
        let types = types();
        let err = decode(&types, "Loot", json!("nope")).unwrap_err();
        assert!(matches!(err, ReflectError::TypeMismatch { found, .. } if found == "string"));
    }

    #[test]
    fn test_raw_object_unknown_field() {
        let types = types();
        let raw: RawObject = serde_json::from_value(json!({
            "path": "/Game/Chest.Chest",
            "class": "Chest",
            "fields": { "Missing": 1 }
        }))
        .unwrap();
        let err = raw.decode(&types).unwrap_err();
        assert!(matches!(err, ReflectError::UnknownField { field, .. } if field == "Missing"));
    }
}
