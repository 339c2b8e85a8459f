use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field-less discriminant of [`PropertyKind`].
///
/// Validators are indexed by tag; struct validators additionally match on the
/// concrete struct type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KindTag {
    Bool,
    Int,
    Float,
    Str,
    Name,
    Text,
    Byte,
    Enum,
    Object,
    SoftObject,
    Struct,
    Array,
    Set,
    Map,
}

impl KindTag {
    /// Array, set and map properties hold element properties.
    pub fn is_container(self) -> bool {
        matches!(self, KindTag::Array | KindTag::Set | KindTag::Map)
    }
}

/// Reflected type of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    Str,
    Name,
    Text,
    Byte {
        #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
        enum_type: Option<String>,
    },
    Enum {
        #[serde(rename = "enum")]
        enum_type: String,
    },
    Object {
        class: String,
    },
    SoftObject {
        class: String,
    },
    Struct {
        #[serde(rename = "struct")]
        struct_type: String,
    },
    Array {
        element: Box<Property>,
    },
    Set {
        element: Box<Property>,
    },
    Map {
        key: Box<Property>,
        value: Box<Property>,
    },
}

impl PropertyKind {
    pub fn tag(&self) -> KindTag {
        match self {
            PropertyKind::Bool => KindTag::Bool,
            PropertyKind::Int => KindTag::Int,
            PropertyKind::Float => KindTag::Float,
            PropertyKind::Str => KindTag::Str,
            PropertyKind::Name => KindTag::Name,
            PropertyKind::Text => KindTag::Text,
            PropertyKind::Byte { .. } => KindTag::Byte,
            PropertyKind::Enum { .. } => KindTag::Enum,
            PropertyKind::Object { .. } => KindTag::Object,
            PropertyKind::SoftObject { .. } => KindTag::SoftObject,
            PropertyKind::Struct { .. } => KindTag::Struct,
            PropertyKind::Array { .. } => KindTag::Array,
            PropertyKind::Set { .. } => KindTag::Set,
            PropertyKind::Map { .. } => KindTag::Map,
        }
    }

    /// Concrete element type: struct type, enum type or object class.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            PropertyKind::Byte { enum_type } => enum_type.as_deref(),
            PropertyKind::Enum { enum_type } => Some(enum_type),
            PropertyKind::Object { class } | PropertyKind::SoftObject { class } => Some(class),
            PropertyKind::Struct { struct_type } => Some(struct_type),
            _ => None,
        }
    }

    /// Enum type backing a byte or enum property.
    pub fn enum_type(&self) -> Option<&str> {
        match self {
            PropertyKind::Byte { enum_type } => enum_type.as_deref(),
            PropertyKind::Enum { enum_type } => Some(enum_type),
            _ => None,
        }
    }

    /// Type name as the evaluation context reports it: enum name for enum-backed
    /// properties, a native spelling for everything else.
    pub fn cpp_type(&self) -> String {
        match self {
            PropertyKind::Bool => "bool".to_string(),
            PropertyKind::Int => "int64".to_string(),
            PropertyKind::Float => "double".to_string(),
            PropertyKind::Str => "FString".to_string(),
            PropertyKind::Name => "FName".to_string(),
            PropertyKind::Text => "FText".to_string(),
            PropertyKind::Byte { enum_type: None } => "uint8".to_string(),
            PropertyKind::Byte {
                enum_type: Some(name),
            }
            | PropertyKind::Enum { enum_type: name } => name.clone(),
            PropertyKind::Object { class } => format!("{class}*"),
            PropertyKind::SoftObject { class } => format!("TSoftObjectPtr<{class}>"),
            PropertyKind::Struct { struct_type } => struct_type.clone(),
            PropertyKind::Array { element } => format!("TArray<{}>", element.kind.cpp_type()),
            PropertyKind::Set { element } => format!("TSet<{}>", element.kind.cpp_type()),
            PropertyKind::Map { key, value } => {
                format!("TMap<{}, {}>", key.kind.cpp_type(), value.kind.cpp_type())
            }
        }
    }

    pub fn array(element: PropertyKind) -> Self {
        PropertyKind::Array {
            element: Box::new(Property::element(element)),
        }
    }

    pub fn set(element: PropertyKind) -> Self {
        PropertyKind::Set {
            element: Box::new(Property::element(element)),
        }
    }

    pub fn map(key: PropertyKind, value: PropertyKind) -> Self {
        PropertyKind::Map {
            key: Box::new(Property::element(key)),
            value: Box::new(Property::element(value)),
        }
    }

    pub fn object(class: impl Into<String>) -> Self {
        PropertyKind::Object {
            class: class.into(),
        }
    }

    pub fn soft_object(class: impl Into<String>) -> Self {
        PropertyKind::SoftObject {
            class: class.into(),
        }
    }

    pub fn structure(struct_type: impl Into<String>) -> Self {
        PropertyKind::Struct {
            struct_type: struct_type.into(),
        }
    }

    pub fn enumeration(enum_type: impl Into<String>) -> Self {
        PropertyKind::Enum {
            enum_type: enum_type.into(),
        }
    }
}

/// Property flags relevant to validation eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFlags {
    #[serde(default = "default_true")]
    pub edit: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub transient: bool,
    #[serde(default)]
    pub skip_serialization: bool,
    /// Editable on templates only ("EditDefaultsOnly").
    #[serde(default)]
    pub disable_edit_on_instance: bool,
    /// Editable on instances only ("EditInstanceOnly").
    #[serde(default)]
    pub disable_edit_on_template: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PropertyFlags {
    fn default() -> Self {
        Self {
            edit: true,
            deprecated: false,
            transient: false,
            skip_serialization: false,
            disable_edit_on_instance: false,
            disable_edit_on_template: false,
        }
    }
}

impl PropertyFlags {
    /// Flags of a property that is not editable at all.
    pub fn hidden() -> Self {
        Self {
            edit: false,
            ..Self::default()
        }
    }
}

/// One reflected field of a class or struct.
///
/// Element properties of containers carry the container's name and no metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub kind: PropertyKind,
    #[serde(default)]
    pub flags: PropertyFlags,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub meta: IndexMap<String, String>,
}

impl Property {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        let mut property = Self {
            name: name.into(),
            display_name: None,
            kind,
            flags: PropertyFlags::default(),
            meta: IndexMap::new(),
        };
        property.name_elements();
        property
    }

    fn element(kind: PropertyKind) -> Self {
        Self::new(String::new(), kind)
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Add a value-less tag such as `Validate`.
    pub fn with_tag(self, key: impl Into<String>) -> Self {
        self.with_meta(key, "")
    }

    pub fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.kind.type_name()
    }

    pub fn is_container(&self) -> bool {
        self.tag().is_container()
    }

    pub fn is_struct(&self) -> bool {
        self.tag() == KindTag::Struct
    }

    pub fn has_meta(&self, key: &str) -> bool {
        self.meta.contains_key(key)
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// Element properties inherit the container's name, recursively.
    pub fn name_elements(&mut self) {
        let name = self.name.clone();
        let display = self.display_name.clone();
        let mut adopt = |element: &mut Property| {
            element.name = name.clone();
            element.display_name = display.clone();
            element.name_elements();
        };
        match &mut self.kind {
            PropertyKind::Array { element } | PropertyKind::Set { element } => adopt(element),
            PropertyKind::Map { key, value } => {
                adopt(key);
                adopt(value);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_tags() {
        assert_eq!(PropertyKind::Bool.tag(), KindTag::Bool);
        assert_eq!(PropertyKind::array(PropertyKind::Int).tag(), KindTag::Array);
        assert!(KindTag::Map.is_container());
        assert!(!KindTag::Struct.is_container());
    }

    #[test]
    fn test_type_name() {
        assert_eq!(PropertyKind::structure("GameplayTag").type_name(), Some("GameplayTag"));
        assert_eq!(PropertyKind::object("Actor").type_name(), Some("Actor"));
        assert_eq!(PropertyKind::Byte { enum_type: None }.type_name(), None);
        assert_eq!(PropertyKind::Str.type_name(), None);
    }

    #[test]
    fn test_cpp_type() {
        assert_eq!(PropertyKind::enumeration("ESimpleEnum").cpp_type(), "ESimpleEnum");
        assert_eq!(PropertyKind::object("Actor").cpp_type(), "Actor*");
        assert_eq!(
            PropertyKind::map(PropertyKind::Name, PropertyKind::Int).cpp_type(),
            "TMap<FName, int64>"
        );
    }

    #[test]
    fn test_elements_take_container_name() {
        let property = Property::new(
            "Lookup",
            PropertyKind::map(PropertyKind::Name, PropertyKind::array(PropertyKind::Int)),
        );
        let PropertyKind::Map { key, value } = &property.kind else {
            panic!("expected map");
        };
        assert_eq!(key.name, "Lookup");
        assert_eq!(value.name, "Lookup");
        let PropertyKind::Array { element } = &value.kind else {
            panic!("expected array");
        };
        assert_eq!(element.name, "Lookup");
    }

    #[test]
    fn test_property_json_format() {
        let json = serde_json::json!({
            "name": "Items",
            "kind": "array",
            "element": { "kind": "object", "class": "Item" },
            "meta": { "Validate": "" }
        });
        let mut property: Property = serde_json::from_value(json).unwrap();
        property.name_elements();

        assert_eq!(property.tag(), KindTag::Array);
        assert!(property.flags.edit);
        assert!(property.has_meta("Validate"));
        let PropertyKind::Array { element } = &property.kind else {
            panic!("expected array");
        };
        assert_eq!(element.name, "Items");
        assert_eq!(element.type_name(), Some("Item"));
    }

    #[test]
    fn test_display_name_falls_back_to_name() {
        let property = Property::new("bEnabled", PropertyKind::Bool);
        assert_eq!(property.display_name(), "bEnabled");
        let property = property.with_display_name("Enabled");
        assert_eq!(property.display_name(), "Enabled");
    }
}
