use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ReflectError;
use crate::property::{Property, PropertyFlags, PropertyKind};
use crate::value::{StructValue, Value};

// ── Engine struct types claimed by built-in struct validators ──

pub const GAMEPLAY_TAG: &str = "GameplayTag";
pub const GAMEPLAY_TAG_CONTAINER: &str = "GameplayTagContainer";
pub const GAMEPLAY_ATTRIBUTE: &str = "GameplayAttribute";
pub const DATA_TABLE_ROW_HANDLE: &str = "DataTableRowHandle";
pub const SOFT_OBJECT_PATH: &str = "SoftObjectPath";
pub const INSTANCED_STRUCT: &str = "InstancedStruct";

const ENGINE_PACKAGE: &str = "/Script/Engine";

/// Class or struct definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    pub name: String,
    #[serde(default, rename = "super", skip_serializing_if = "Option::is_none")]
    pub super_type: Option<String>,
    #[serde(default = "default_package")]
    pub package: String,
    #[serde(default)]
    pub flags: TypeFlags,
    /// Properties declared on this type, not including super types.
    #[serde(default)]
    pub properties: Vec<Property>,
}

fn default_package() -> String {
    "/Game".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFlags {
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub deprecated: bool,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_type: None,
            package: package.into(),
            flags: TypeFlags::default(),
            properties: Vec::new(),
        }
    }

    pub fn with_super(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Declared property by name, this type only.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Enumeration with named integer members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub members: IndexMap<String, i64>,
}

impl EnumDef {
    /// Members numbered from zero in declaration order.
    pub fn sequential(name: impl Into<String>, members: &[&str]) -> Self {
        Self {
            name: name.into(),
            members: members
                .iter()
                .enumerate()
                .map(|(i, m)| (m.to_string(), i as i64))
                .collect(),
        }
    }

    pub fn with_values(name: impl Into<String>, members: &[(&str, i64)]) -> Self {
        Self {
            name: name.into(),
            members: members.iter().map(|(m, v)| (m.to_string(), *v)).collect(),
        }
    }

    pub fn value_of(&self, member: &str) -> Option<i64> {
        self.members.get(member).copied()
    }

    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| **v == value)
            .map(|(name, _)| name.as_str())
    }
}

/// Which table a type lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Class,
    Struct,
}

/// Reflection data for every known class, struct and enum.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    classes: IndexMap<String, TypeDef>,
    structs: IndexMap<String, TypeDef>,
    enums: IndexMap<String, EnumDef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the engine structs the built-in validators claim.
    pub fn with_builtins() -> Self {
        let mut types = Self::new();
        let hidden = PropertyFlags::hidden();
        let builtins = [
            TypeDef::new(GAMEPLAY_TAG, "/Script/GameplayTags")
                .with_property(Property::new("TagName", PropertyKind::Name).with_flags(hidden)),
            TypeDef::new(GAMEPLAY_TAG_CONTAINER, "/Script/GameplayTags").with_property(
                Property::new(
                    "GameplayTags",
                    PropertyKind::array(PropertyKind::structure(GAMEPLAY_TAG)),
                )
                .with_flags(hidden),
            ),
            TypeDef::new(GAMEPLAY_ATTRIBUTE, "/Script/GameplayAbilities")
                .with_property(Property::new("AttributeName", PropertyKind::Str).with_flags(hidden)),
            TypeDef::new(DATA_TABLE_ROW_HANDLE, ENGINE_PACKAGE)
                .with_property(
                    Property::new("DataTable", PropertyKind::object("DataTable")).with_flags(hidden),
                )
                .with_property(Property::new("RowName", PropertyKind::Name).with_flags(hidden)),
            TypeDef::new(SOFT_OBJECT_PATH, "/Script/CoreUObject")
                .with_property(Property::new("AssetPath", PropertyKind::Str).with_flags(hidden)),
            TypeDef::new(INSTANCED_STRUCT, "/Script/StructUtils"),
        ];
        for def in builtins {
            types.structs.insert(def.name.clone(), def);
        }
        types
    }

    pub fn add_class(&mut self, def: TypeDef) -> Result<(), ReflectError> {
        Self::insert(&mut self.classes, def)
    }

    pub fn add_struct(&mut self, def: TypeDef) -> Result<(), ReflectError> {
        Self::insert(&mut self.structs, def)
    }

    pub fn add_enum(&mut self, def: EnumDef) -> Result<(), ReflectError> {
        if self.enums.contains_key(&def.name) {
            return Err(ReflectError::DuplicateType(def.name));
        }
        self.enums.insert(def.name.clone(), def);
        Ok(())
    }

    fn insert(table: &mut IndexMap<String, TypeDef>, mut def: TypeDef) -> Result<(), ReflectError> {
        if table.contains_key(&def.name) {
            return Err(ReflectError::DuplicateType(def.name));
        }
        for property in &mut def.properties {
            property.name_elements();
        }
        table.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&TypeDef> {
        self.classes.get(name)
    }

    pub fn struct_def(&self, name: &str) -> Option<&TypeDef> {
        self.structs.get(name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    pub fn type_def(&self, category: TypeCategory, name: &str) -> Option<&TypeDef> {
        match category {
            TypeCategory::Class => self.class(name),
            TypeCategory::Struct => self.struct_def(name),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &TypeDef> {
        self.classes.values()
    }

    pub fn structs(&self) -> impl Iterator<Item = &TypeDef> {
        self.structs.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDef> {
        self.enums.values()
    }

    /// The type followed by its super types, most derived first.
    /// A malformed super cycle ends the chain at the first repeat.
    pub fn chain(&self, category: TypeCategory, name: &str) -> Vec<&TypeDef> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = self.type_def(category, name);
        while let Some(def) = next {
            if !seen.insert(def.name.as_str()) {
                break;
            }
            chain.push(def);
            next = def
                .super_type
                .as_deref()
                .and_then(|s| self.type_def(category, s));
        }
        chain
    }

    /// Property declared on the type or any of its super types.
    pub fn find_property(
        &self,
        category: TypeCategory,
        type_name: &str,
        property: &str,
    ) -> Option<(&TypeDef, &Property)> {
        self.chain(category, type_name)
            .into_iter()
            .find_map(|def| def.property(property).map(|p| (def, p)))
    }

    /// Whether `class` is `ancestor` or derives from it.
    pub fn is_child_of(&self, class: &str, ancestor: &str) -> bool {
        self.chain(TypeCategory::Class, class)
            .iter()
            .any(|def| def.name == ancestor)
    }

    /// Fill fields missing from a struct value with defaults, recursing into
    /// nested struct values that are present.
    pub fn complete_struct(&self, value: &mut StructValue) {
        let struct_type = value.struct_type.clone();
        self.complete_fields(TypeCategory::Struct, &struct_type, &mut value.fields);
    }

    /// Fill fields missing from an instance of `type_name` with defaults.
    pub fn complete_fields(
        &self,
        category: TypeCategory,
        type_name: &str,
        fields: &mut IndexMap<String, Value>,
    ) {
        for def in self.chain(category, type_name) {
            for property in &def.properties {
                match fields.get_mut(&property.name) {
                    Some(existing) => self.complete_value(&property.kind, existing),
                    None => {
                        fields.insert(property.name.clone(), Value::default_for(&property.kind, self));
                    }
                }
            }
        }
    }

    fn complete_value(&self, kind: &PropertyKind, value: &mut Value) {
        match (kind, value) {
            (PropertyKind::Struct { .. }, Value::Struct(inner)) => self.complete_struct(inner),
            (PropertyKind::Struct { .. }, Value::Instanced(Some(inner))) => self.complete_struct(inner),
            (PropertyKind::Array { element }, Value::Array(items))
            | (PropertyKind::Set { element }, Value::Set(items)) => {
                for item in items {
                    self.complete_value(&element.kind, item);
                }
            }
            (PropertyKind::Map { key, value: val }, Value::Map(entries)) => {
                for (k, v) in entries {
                    self.complete_value(&key.kind, k);
                    self.complete_value(&val.kind, v);
                }
            }
            _ => {}
        }
    }
}
