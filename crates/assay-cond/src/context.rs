use indexmap::IndexMap;

use assay_model::property::{Property, PropertyKind};
use assay_model::registry::{TypeCategory, TypeRegistry};
use assay_model::value::Value;

/// Property lookups an edit condition needs from the instance it is evaluated on.
///
/// Every getter returns `None` when the property does not exist or does not
/// have the requested shape.
pub trait EditConditionContext {
    /// Name of the type the properties are looked up on.
    fn context_name(&self) -> &str;

    fn bool_value(&self, property: &str) -> Option<bool>;

    /// Integer properties, plus enum properties through their underlying value.
    fn integer_value(&self, property: &str) -> Option<i64>;

    /// Integer and floating point properties in double precision.
    fn numeric_value(&self, property: &str) -> Option<f64>;

    /// Member name of an enum-typed property's current value.
    fn enum_value(&self, property: &str) -> Option<String>;

    /// Referenced object path, `Some(None)` for a null reference.
    fn object_value(&self, property: &str) -> Option<Option<String>>;

    /// Enum name for enum-typed properties, the native type name otherwise.
    fn type_name(&self, property: &str) -> Option<String>;

    fn enum_member_value(&self, enum_type: &str, member: &str) -> Option<i64>;
}

/// Context over one class or struct instance of the reflection model.
pub struct InstanceContext<'a> {
    types: &'a TypeRegistry,
    category: TypeCategory,
    type_name: &'a str,
    fields: &'a IndexMap<String, Value>,
}

impl<'a> InstanceContext<'a> {
    pub fn new(
        types: &'a TypeRegistry,
        category: TypeCategory,
        type_name: &'a str,
        fields: &'a IndexMap<String, Value>,
    ) -> Self {
        Self {
            types,
            category,
            type_name,
            fields,
        }
    }

    fn lookup(&self, name: &str) -> Option<(&'a Property, &'a Value)> {
        let (_, property) = self.types.find_property(self.category, self.type_name, name)?;
        let value = self.fields.get(name)?;
        Some((property, value))
    }
}

impl EditConditionContext for InstanceContext<'_> {
    fn context_name(&self) -> &str {
        self.type_name
    }

    fn bool_value(&self, property: &str) -> Option<bool> {
        match self.lookup(property)? {
            (Property { kind: PropertyKind::Bool, .. }, value) => value.as_bool(),
            _ => None,
        }
    }

    fn integer_value(&self, property: &str) -> Option<i64> {
        match self.lookup(property)? {
            (
                Property {
                    kind: PropertyKind::Int | PropertyKind::Byte { .. } | PropertyKind::Enum { .. },
                    ..
                },
                value,
            ) => value.as_int(),
            _ => None,
        }
    }

    fn numeric_value(&self, property: &str) -> Option<f64> {
        match self.lookup(property)? {
            (
                Property {
                    kind: PropertyKind::Int | PropertyKind::Float | PropertyKind::Byte { .. },
                    ..
                },
                value,
            ) => value.as_f64(),
            _ => None,
        }
    }

    fn enum_value(&self, property: &str) -> Option<String> {
        let (property, value) = self.lookup(property)?;
        let enum_type = property.kind.enum_type()?;
        let def = self.types.enum_def(enum_type)?;
        def.name_of(value.as_int()?).map(str::to_string)
    }

    fn object_value(&self, property: &str) -> Option<Option<String>> {
        match self.lookup(property)? {
            (
                Property {
                    kind: PropertyKind::Object { .. } | PropertyKind::SoftObject { .. },
                    ..
                },
                value,
            ) => value.as_object_ref().map(|path| path.map(str::to_string)),
            _ => None,
        }
    }

    fn type_name(&self, property: &str) -> Option<String> {
        let (_, property) = self
            .types
            .find_property(self.category, self.type_name, property)?;
        Some(property.kind.cpp_type())
    }

    fn enum_member_value(&self, enum_type: &str, member: &str) -> Option<i64> {
        self.types.enum_def(enum_type)?.value_of(member)
    }
}
