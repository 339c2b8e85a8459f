//! Value validators for scalar and reference properties.

use assay_model::{KindTag, Value};

use crate::context::ValidationContext;
use crate::descriptor::PropertyValidatorDescriptor;
use crate::validator::{PropertyValidator, ValidationTarget};

/// Pick the property or the element wording of a failure message.
pub(crate) fn message<'m>(target: &ValidationTarget<'_>, property: &'m str, element: &'m str) -> &'m str {
    if target.element {
        element
    } else {
        property
    }
}

/// Byte properties, usually enum-backed. Zero is the unset value.
pub struct ByteValidator;

impl PropertyValidator for ByteValidator {
    fn name(&self) -> &'static str {
        "Byte"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Byte)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target.value.as_int() == Some(0);
        context.fail_on_condition(unset, target, message(target, "Enum property not set.", "Enum value not set"));
    }
}

pub struct EnumValidator;

impl PropertyValidator for EnumValidator {
    fn name(&self) -> &'static str {
        "Enum"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Enum)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target.value.as_int() == Some(0);
        context.fail_on_condition(unset, target, message(target, "Enum property not set.", "Enum value not set"));
    }
}

/// Names are unset when empty or `None`.
pub struct NameValidator;

impl PropertyValidator for NameValidator {
    fn name(&self) -> &'static str {
        "Name"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Name)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target.value.as_str().map_or(true, Value::is_none_name);
        context.fail_on_condition(unset, target, message(target, "Name property not set", "Name value not set"));
    }
}

pub struct StringValidator;

impl PropertyValidator for StringValidator {
    fn name(&self) -> &'static str {
        "String"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Str)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target.value.as_str().map_or(true, str::is_empty);
        context.fail_on_condition(unset, target, message(target, "String property not set", "String value not set"));
    }
}

pub struct TextValidator;

impl PropertyValidator for TextValidator {
    fn name(&self) -> &'static str {
        "Text"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Text)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target.value.as_str().map_or(true, str::is_empty);
        context.fail_on_condition(unset, target, message(target, "Text property is not set", "Text value is not set"));
    }
}

/// Hard object references must point somewhere.
pub struct ObjectValidator;

impl PropertyValidator for ObjectValidator {
    fn name(&self) -> &'static str {
        "Object"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::Object)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target.value.as_object_ref().flatten().is_none();
        context.fail_on_condition(unset, target, message(target, "Object property not set", "Object value not set"));
    }
}

pub struct SoftObjectValidator;

impl PropertyValidator for SoftObjectValidator {
    fn name(&self) -> &'static str {
        "SoftObject"
    }

    fn descriptor(&self) -> PropertyValidatorDescriptor {
        PropertyValidatorDescriptor::kind(KindTag::SoftObject)
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>) {
        let unset = target.value.as_object_ref().flatten().is_none();
        context.fail_on_condition(
            unset,
            target,
            message(target, "Soft object property not set", "Soft object value not set"),
        );
    }
}
