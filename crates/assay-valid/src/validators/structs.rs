//! Value validators for engine struct types, each claiming one exact struct.

use assay_model::registry::{
    DATA_TABLE_ROW_HANDLE, GAMEPLAY_ATTRIBUTE, GAMEPLAY_TAG, GAMEPLAY_TAG_CONTAINER, INSTANCED_STRUCT,
    SOFT_OBJECT_PATH,
};
use assay_model::{StructValue, Value};

use crate::context::ValidationContext;
use crate::descriptor::PropertyValidatorDescriptor;
use crate::validator::{PropertyValidator, ValidationTarget};
use crate::validators::scalar::message;

fn is_unset_name(value: &StructValue, field: &str) -> bool {
    Value::is_none_name(value.str_field(field))
}

pub struct GameplayTagValidator;

impl PropertyValidator for GameplayTagValidator {
    fn name(&self) -> &'static str {
        "GameplayTag"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::structure(GAMEPLAY_TAG)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target.value.as_struct().map_or(true, |tag| is_unset_name(tag, "TagName"));
        context.fail_on_condition(
            unset,
            target,
            message(target, "Gameplay tag property not set", "Gameplay tag not set"),
        );
    }
}

pub struct GameplayTagContainerValidator;

impl PropertyValidator for GameplayTagContainerValidator {
    fn name(&self) -> &'static str {
        "GameplayTagContainer"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::structure(GAMEPLAY_TAG_CONTAINER)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let empty = match target.value.as_struct().and_then(|c| c.field("GameplayTags")) {
            Some(Value::Array(tags)) => tags.is_empty(),
            _ => true,
        };
        context.fail_on_condition(
            empty,
            target,
            message(
                target,
                "Gameplay tag container property is empty",
                "Gameplay tag container is empty",
            ),
        );
    }
}

pub struct GameplayAttributeValidator;

impl PropertyValidator for GameplayAttributeValidator {
    fn name(&self) -> &'static str {
        "GameplayAttribute"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::structure(GAMEPLAY_ATTRIBUTE)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target
            .value
            .as_struct()
            .map_or(true, |attribute| attribute.str_field("AttributeName").is_empty());
        context.fail_on_condition(
            unset,
            target,
            message(target, "Gameplay attribute property is not set", "Gameplay attribute is not set"),
        );
    }
}

/// A row handle needs both a table and a row name.
pub struct DataTableRowHandleValidator;

impl PropertyValidator for DataTableRowHandleValidator {
    fn name(&self) -> &'static str {
        "DataTableRowHandle"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::structure(DATA_TABLE_ROW_HANDLE)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let null = target.value.as_struct().map_or(true, |handle| {
            let no_table = handle
                .field("DataTable")
                .and_then(Value::as_object_ref)
                .flatten()
                .is_none();
            no_table || is_unset_name(handle, "RowName")
        });
        context.fail_on_condition(
            null,
            target,
            message(target, "Data table row property is not set", "Data table row is not set"),
        );
    }
}

pub struct SoftObjectPathValidator;

impl PropertyValidator for SoftObjectPathValidator {
    fn name(&self) -> &'static str {
        "SoftObjectPath"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::structure(SOFT_OBJECT_PATH)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target
            .value
            .as_struct()
            .map_or(true, |path| path.str_field("AssetPath").is_empty());
        context.fail_on_condition(
            unset,
            target,
            message(target, "Soft object path property is not set", "Soft object path is not set"),
        );
    }
}

/// Fails on an empty payload. A present payload is walked by the struct
/// container validator under its dynamic type.
pub struct InstancedStructValidator;

impl PropertyValidator for InstancedStructValidator {
    fn name(&self) -> &'static str {
        "InstancedStruct"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::structure(INSTANCED_STRUCT)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let empty = !matches!(target.value, Value::Instanced(Some(_)));
        context.fail_on_condition(
            empty,
            target,
            message(target, "Instanced struct property is not set", "Instanced struct is not set"),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::engine::ValidationEngine;
    use crate::metadata::MetaDataSource;
    use assay_model::names::VALIDATE;
    use assay_model::{Content, Object, Property, PropertyKind, TypeRegistry};
    use pretty_assertions::assert_eq;

    fn run(validator: &dyn PropertyValidator, struct_type: &str, value: Value) -> Vec<String> {
        let engine = ValidationEngine::default();
        let content = Content::new(TypeRegistry::with_builtins());
        let object = Object::new("/Game/Probe.Probe", "Probe");
        let mut context = ValidationContext::new(&engine, &content, &object);

        let property = Property::new("Field", PropertyKind::structure(struct_type)).with_tag(VALIDATE);
        let meta = MetaDataSource::Property(Cow::Borrowed(&property));
        let target = ValidationTarget::new(&property, &value, &meta);
        assert!(validator.can_validate(&target));
        validator.validate(&target, &mut context);
        context.issues().iter().map(|i| i.message.clone()).collect()
    }

    fn tag(name: &str) -> Value {
        Value::Struct(StructValue::new(GAMEPLAY_TAG).with_field("TagName", Value::string(name)))
    }

    #[test]
    fn test_gameplay_tag() {
        assert_eq!(
            run(&GameplayTagValidator, GAMEPLAY_TAG, tag("None")),
            vec!["Field: Gameplay tag property not set"]
        );
        assert!(run(&GameplayTagValidator, GAMEPLAY_TAG, tag("Weapon.Rifle")).is_empty());
    }

    #[test]
    fn test_gameplay_tag_container() {
        let empty = Value::Struct(StructValue::new(GAMEPLAY_TAG_CONTAINER).with_field("GameplayTags", Value::Array(vec![])));
        assert_eq!(run(&GameplayTagContainerValidator, GAMEPLAY_TAG_CONTAINER, empty).len(), 1);
        let full = Value::Struct(
            StructValue::new(GAMEPLAY_TAG_CONTAINER).with_field("GameplayTags", Value::Array(vec![tag("A")])),
        );
        assert!(run(&GameplayTagContainerValidator, GAMEPLAY_TAG_CONTAINER, full).is_empty());
    }

    #[test]
    fn test_gameplay_attribute() {
        let unset = Value::Struct(StructValue::new(GAMEPLAY_ATTRIBUTE).with_field("AttributeName", Value::string("")));
        assert_eq!(
            run(&GameplayAttributeValidator, GAMEPLAY_ATTRIBUTE, unset),
            vec!["Field: Gameplay attribute property is not set"]
        );
        let set = Value::Struct(StructValue::new(GAMEPLAY_ATTRIBUTE).with_field("AttributeName", Value::string("Health")));
        assert!(run(&GameplayAttributeValidator, GAMEPLAY_ATTRIBUTE, set).is_empty());
    }

    #[test]
    fn test_data_table_row_handle() {
        let handle = |table: Option<&str>, row: &str| {
            Value::Struct(
                StructValue::new(DATA_TABLE_ROW_HANDLE)
                    .with_field("DataTable", Value::Object(table.map(str::to_string)))
                    .with_field("RowName", Value::string(row)),
            )
        };
        let v = DataTableRowHandleValidator;
        assert_eq!(run(&v, DATA_TABLE_ROW_HANDLE, handle(None, "Row")).len(), 1);
        assert_eq!(run(&v, DATA_TABLE_ROW_HANDLE, handle(Some("/Game/DT.DT"), "None")).len(), 1);
        assert!(run(&v, DATA_TABLE_ROW_HANDLE, handle(Some("/Game/DT.DT"), "Row")).is_empty());
    }

    #[test]
    fn test_soft_object_path() {
        let path = |p: &str| Value::Struct(StructValue::new(SOFT_OBJECT_PATH).with_field("AssetPath", Value::string(p)));
        assert_eq!(run(&SoftObjectPathValidator, SOFT_OBJECT_PATH, path("")).len(), 1);
        assert!(run(&SoftObjectPathValidator, SOFT_OBJECT_PATH, path("/Game/A.A")).is_empty());
    }

    #[test]
    fn test_instanced_struct() {
        assert_eq!(
            run(&InstancedStructValidator, INSTANCED_STRUCT, Value::Instanced(None)),
            vec!["Field: Instanced struct property is not set"]
        );
        let payload = Value::Instanced(Some(Box::new(StructValue::new("Loot"))));
        assert!(run(&InstancedStructValidator, INSTANCED_STRUCT, payload).is_empty());
    }
}
