//! Container validators: walk into arrays, sets, maps, structs and referenced
//! objects and dispatch their contents back through the engine.

use log::debug;

use assay_model::names::{VALIDATE, VALIDATE_KEY, VALIDATE_RECURSIVE, VALIDATE_VALUE, VALIDATE_WARNING};
use assay_model::{KindTag, Property, PropertyKind, TypeCategory, Value};

use crate::context::ValidationContext;
use crate::descriptor::PropertyValidatorDescriptor;
use crate::metadata::ValidateMode;
use crate::validator::{ContainerValidator, ValidationTarget};

fn auto_validates_structs(context: &ValidationContext<'_>) -> bool {
    context.engine().settings().auto_validate_struct_inner_properties
}

fn has_validate_tag(target: &ValidationTarget<'_>) -> bool {
    target.meta.has_meta(VALIDATE) || target.meta.has_meta(VALIDATE_WARNING)
}

/// Array and set elements share one dispatch: every element is checked when
/// the container asks for validation, structs also when auto-validated.
fn can_validate_elements(element: &Property, target: &ValidationTarget<'_>, context: &ValidationContext<'_>) -> bool {
    if element.is_struct() && auto_validates_structs(context) {
        return true;
    }
    has_validate_tag(target) && context.engine().registry().has_validator_for(element)
}

fn validate_elements<'t>(
    element: &'t Property,
    items: &'t [Value],
    target: &ValidationTarget<'t>,
    context: &mut ValidationContext<'_>,
) {
    let mode = if has_validate_tag(target) {
        ValidateMode::ValidateAll
    } else {
        ValidateMode::None
    };
    for (index, item) in items.iter().enumerate() {
        let mut scoped = context.scoped_prefix(format!("{}[{index}]", target.property.name));
        scoped.is_property_value_valid(&target.element(element, item, mode));
    }
}

pub struct ArrayContainerValidator;

impl ContainerValidator for ArrayContainerValidator {
    fn name(&self) -> &'static str {
        "ArrayContainer"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Array)
    }

    fn can_validate(&self, target: &ValidationTarget<'_>, context: &ValidationContext<'_>) -> bool {
        match &target.property.kind {
            PropertyKind::Array { element } => can_validate_elements(element, target, context),
            _ => false,
        }
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let property = target.property;
        if let (PropertyKind::Array { element }, Value::Array(items)) = (&property.kind, target.value) {
            validate_elements(element, items, target, context);
        }
    }
}

pub struct SetContainerValidator;

impl ContainerValidator for SetContainerValidator {
    fn name(&self) -> &'static str {
        "SetContainer"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Set)
    }

    fn can_validate(&self, target: &ValidationTarget<'_>, context: &ValidationContext<'_>) -> bool {
        match &target.property.kind {
            PropertyKind::Set { element } => can_validate_elements(element, target, context),
            _ => false,
        }
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let property = target.property;
        if let (PropertyKind::Set { element }, Value::Set(items)) = (&property.kind, target.value) {
            validate_elements(element, items, target, context);
        }
    }
}

/// Maps honor `ValidateKey` and `ValidateValue` to check one side only.
pub struct MapContainerValidator;

impl ContainerValidator for MapContainerValidator {
    fn name(&self) -> &'static str {
        "MapContainer"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Map)
    }

    fn can_validate(&self, target: &ValidationTarget<'_>, context: &ValidationContext<'_>) -> bool {
        let PropertyKind::Map { key, value } = &target.property.kind else {
            return false;
        };
        let meta = target.meta;
        if [VALIDATE, VALIDATE_KEY, VALIDATE_VALUE, VALIDATE_WARNING]
            .iter()
            .any(|tag| meta.has_meta(tag))
        {
            return true;
        }
        auto_validates_structs(context) && (key.is_struct() || value.is_struct())
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let property = target.property;
        let (PropertyKind::Map { key, value }, Value::Map(entries)) = (&property.kind, target.value) else {
            return;
        };

        let auto_structs = auto_validates_structs(context);
        let mode_for = |validates: bool| {
            if validates {
                ValidateMode::ValidateAll
            } else {
                ValidateMode::None
            }
        };
        let key_mode = mode_for(target.mode.validates_key() || (auto_structs && key.is_struct()));
        let value_mode = mode_for(target.mode.validates_value() || (auto_structs && value.is_struct()));

        for (index, (entry_key, entry_value)) in entries.iter().enumerate() {
            let mut scoped = context.scoped_prefix(format!("{}[{index}]", property.name));
            if !key_mode.is_none() {
                scoped.is_property_value_valid(&target.element(key, entry_key, key_mode));
            }
            if !value_mode.is_none() {
                scoped.is_property_value_valid(&target.element(value, entry_value, value_mode));
            }
        }
    }
}

/// Walks a struct value's own properties, including the payload of an
/// instanced struct under its dynamic type.
pub struct StructContainerValidator;

impl ContainerValidator for StructContainerValidator {
    fn name(&self) -> &'static str {
        "StructContainer"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Struct)
    }

    fn can_validate(&self, target: &ValidationTarget<'_>, context: &ValidationContext<'_>) -> bool {
        self.descriptor().matches(target.property)
            && (auto_validates_structs(context) || target.meta.has_meta(VALIDATE_RECURSIVE))
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let value = match target.value {
            Value::Struct(value) => value,
            Value::Instanced(Some(value)) => value.as_ref(),
            _ => return,
        };
        // Elements already sit under the container's `Name[i]` prefix.
        let mut scoped = context.conditional_prefix(target.property.display_name(), !target.element);
        scoped.is_property_container_valid(TypeCategory::Struct, &value.struct_type, &value.fields);
    }
}

/// Follows hard and soft references into the referenced object when asked
/// with `ValidateRecursive`.
pub struct ObjectContainerValidator;

impl ContainerValidator for ObjectContainerValidator {
    fn name(&self) -> &'static str {
        "ObjectContainer"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Object)
    }

    fn can_validate(&self, target: &ValidationTarget<'_>, _context: &ValidationContext<'_>) -> bool {
        matches!(target.property.tag(), KindTag::Object | KindTag::SoftObject)
            && target.meta.has_meta(VALIDATE_RECURSIVE)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let Some(Some(path)) = target.value.as_object_ref() else {
            return;
        };
        let Some(object) = context.content().object(path) else {
            debug!("'{}' references unknown object '{path}'", target.property.name);
            return;
        };

        let prefix = if target.element {
            object.name()
        } else {
            target.property.display_name()
        };
        let mut scoped = context.scoped_prefix(prefix);
        scoped.is_object_valid(object);
    }
}
