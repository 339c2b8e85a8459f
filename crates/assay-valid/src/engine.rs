//! Dispatch engine: walks class and struct instances property by property and
//! hands each value to the validators registered for its type.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use log::{debug, warn};

use assay_cond::{EditConditionExpression, EditConditionParser, InstanceContext, ParseError};
use assay_model::names::EDIT_CONDITION;
use assay_model::settings::is_blueprint_generated;
use assay_model::{
    Content, ExternalValidationData, Object, Property, PropertyValidationResult, StructValue, TypeCategory,
    ValidationReport, ValidationSettings, Value,
};

use crate::context::ValidationContext;
use crate::metadata::MetaDataSource;
use crate::registry::ValidatorRegistry;
use crate::validator::ValidationTarget;

type ConditionCache = HashMap<String, Result<Arc<EditConditionExpression>, ParseError>>;

/// Owns the validator registry and the settings a validation pass runs under.
///
/// Read-only during validation apart from the edit-condition cache, so one
/// engine can serve any number of validation calls.
pub struct ValidationEngine {
    registry: ValidatorRegistry,
    settings: ValidationSettings,
    external: ExternalValidationData,
    conditions: EditConditionParser,
    condition_cache: Mutex<ConditionCache>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(ValidationSettings::default())
    }
}

impl ValidationEngine {
    /// Engine with the built-in validators.
    pub fn new(settings: ValidationSettings) -> Self {
        Self::with_registry(ValidatorRegistry::with_builtins(), settings)
    }

    pub fn with_registry(registry: ValidatorRegistry, settings: ValidationSettings) -> Self {
        Self {
            registry,
            settings,
            external: ExternalValidationData::default(),
            conditions: EditConditionParser::new(),
            condition_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_external_data(mut self, external: ExternalValidationData) -> Self {
        self.external = external;
        self
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    pub fn external_data(&self) -> &ExternalValidationData {
        &self.external
    }

    // ── Top-level entry points ──

    /// Validate every property of an object.
    pub fn validate_object(&self, content: &Content, object: &Object) -> PropertyValidationResult {
        let Some(class) = content.types.class(&object.class) else {
            warn!("cannot validate '{}': unknown class '{}'", object.path, object.class);
            return PropertyValidationResult::valid();
        };
        if class.flags.is_abstract || class.flags.deprecated {
            return PropertyValidationResult::valid();
        }
        if !self.settings.can_validate_package(&class.package) {
            debug!("skipping '{}': package '{}' is not validated", object.path, class.package);
            return PropertyValidationResult::not_validated();
        }

        let mut context = ValidationContext::new(self, content, object);
        self.validate_container_with_context(&mut context, TypeCategory::Class, &object.class, &object.fields);
        context.make_validation_result()
    }

    /// Validate every property of a struct value owned by `owner`.
    pub fn validate_struct(&self, content: &Content, owner: &Object, value: &StructValue) -> PropertyValidationResult {
        if content.types.struct_def(&value.struct_type).is_none() {
            return PropertyValidationResult::valid();
        }
        let mut context = ValidationContext::new(self, content, owner);
        self.validate_container_with_context(&mut context, TypeCategory::Struct, &value.struct_type, &value.fields);
        context.make_validation_result()
    }

    /// Validate a single property of an object, declared on its class or a super class.
    pub fn validate_object_property(
        &self,
        content: &Content,
        object: &Object,
        property_name: &str,
    ) -> PropertyValidationResult {
        let Some(class) = content.types.class(&object.class) else {
            return PropertyValidationResult::valid();
        };
        if class.flags.is_abstract || class.flags.deprecated {
            return PropertyValidationResult::valid();
        }
        let Some((owner, property)) = content
            .types
            .find_property(TypeCategory::Class, &object.class, property_name)
        else {
            return PropertyValidationResult::valid();
        };
        if !self.settings.can_validate_package(&owner.package) {
            return PropertyValidationResult::not_validated();
        }

        let mut context = ValidationContext::new(self, content, object);
        let instance = Instance::new(TypeCategory::Class, &object.class, &object.fields);
        self.validate_property_with_context(&mut context, &instance, &owner.name, property);
        context.make_validation_result()
    }

    /// Validate a single property of a struct value owned by `owner`.
    pub fn validate_struct_property(
        &self,
        content: &Content,
        owner: &Object,
        value: &StructValue,
        property_name: &str,
    ) -> PropertyValidationResult {
        let Some((declaring, property)) =
            content
                .types
                .find_property(TypeCategory::Struct, &value.struct_type, property_name)
        else {
            return PropertyValidationResult::valid();
        };
        if let Some(class) = content.types.class(&owner.class) {
            if !self.settings.can_validate_package(&class.package) {
                return PropertyValidationResult::not_validated();
            }
        }

        let mut context = ValidationContext::new(self, content, owner);
        let instance = Instance::new(TypeCategory::Struct, &value.struct_type, &value.fields);
        self.validate_property_with_context(&mut context, &instance, &declaring.name, property);
        context.make_validation_result()
    }

    /// Validate every object in the content, in load order.
    pub fn validate_content(&self, content: &Content) -> ValidationReport {
        let mut report = ValidationReport::success();
        for object in content.objects() {
            report.push_object(object.path.clone(), self.validate_object(content, object));
        }
        report
    }

    // ── Dispatch ──

    /// Walk the properties of a class or struct instance, most derived type first.
    ///
    /// Class walks stop at the first super class whose package is filtered
    /// out; struct walks always cover the whole chain.
    pub(crate) fn validate_container_with_context(
        &self,
        context: &mut ValidationContext<'_>,
        category: TypeCategory,
        type_name: &str,
        fields: &IndexMap<String, Value>,
    ) {
        let types = &context.content().types;
        let instance = Instance::new(category, type_name, fields);
        let is_struct = category == TypeCategory::Struct;

        for def in types.chain(category, type_name) {
            if !is_struct && !self.settings.can_validate_package(&def.package) {
                break;
            }
            if !is_struct && self.settings.skip_blueprint_generated_classes && is_blueprint_generated(&def.package) {
                continue;
            }
            for property in &def.properties {
                self.validate_property_with_context(context, &instance, &def.name, property);
            }
        }
    }

    fn validate_property_with_context(
        &self,
        context: &mut ValidationContext<'_>,
        instance: &Instance<'_>,
        declaring_type: &str,
        property: &Property,
    ) {
        if !self.should_validate_property(context, property) {
            return;
        }
        let meta = MetaDataSource::resolve(&self.external, declaring_type, property);
        if let Some(condition) = meta.meta(EDIT_CONDITION) {
            if !self.edit_condition_passes(context, instance, property, condition) {
                debug!("'{}' skipped: edit condition '{condition}' is not met", property.name);
                return;
            }
        }
        let Some(value) = instance.fields.get(&property.name) else {
            debug!("'{}' has no value on {}", property.name, instance.type_name);
            return;
        };

        let target = ValidationTarget::new(property, value, &meta);
        self.validate_value_with_context(context, &target);
    }

    /// First property validator that accepts the value, then every container
    /// validator that accepts it.
    pub(crate) fn validate_value_with_context(&self, context: &mut ValidationContext<'_>, target: &ValidationTarget<'_>) {
        if let Some(validator) = self
            .registry
            .property_validators(target.property)
            .find(|v| v.can_validate(target))
        {
            debug!("{} validates '{}'", validator.name(), target.property.name);
            validator.validate(target, context);
        }

        for validator in self.registry.container_validators(target.property) {
            if validator.can_validate(target, context) {
                validator.validate(target, context);
            }
        }
    }

    /// Editable, persistent properties only; edit-on-instance/template
    /// restrictions apply to non-asset source objects.
    fn should_validate_property(&self, context: &ValidationContext<'_>, property: &Property) -> bool {
        let flags = &property.flags;
        if !flags.edit || flags.deprecated || flags.transient || flags.skip_serialization {
            return false;
        }

        let source = context.source_object();
        if source.flags.asset {
            return true;
        }
        if flags.disable_edit_on_instance && !source.flags.template {
            return false;
        }
        if flags.disable_edit_on_template && source.flags.template {
            return false;
        }
        true
    }

    fn edit_condition_passes(
        &self,
        context: &ValidationContext<'_>,
        instance: &Instance<'_>,
        property: &Property,
        condition: &str,
    ) -> bool {
        let fail_policy = self.settings.fail_open_on_condition_error;
        let expression = match self.parse_condition(condition) {
            Ok(expression) => expression,
            Err(e) => {
                warn!("failed to parse EditCondition of '{}': {e}", property.name);
                return fail_policy;
            }
        };

        let types = &context.content().types;
        let condition_context = InstanceContext::new(types, instance.category, instance.type_name, instance.fields);
        match self.conditions.evaluate(&expression, &condition_context) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    "failed to evaluate EditCondition of '{}' on {}: {e}",
                    property.name, instance.type_name
                );
                fail_policy
            }
        }
    }

    /// Parsed expression for `source`, from the cache when seen before.
    pub fn parse_condition(&self, source: &str) -> Result<Arc<EditConditionExpression>, ParseError> {
        let mut cache = self.condition_cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(source) {
            return cached.clone();
        }
        let parsed = self.conditions.parse(source).map(Arc::new);
        cache.insert(source.to_string(), parsed.clone());
        parsed
    }

    pub fn cached_condition_count(&self) -> usize {
        self.condition_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// The class or struct instance whose properties are being walked.
struct Instance<'i> {
    category: TypeCategory,
    type_name: &'i str,
    fields: &'i IndexMap<String, Value>,
}

impl<'i> Instance<'i> {
    fn new(category: TypeCategory, type_name: &'i str, fields: &'i IndexMap<String, Value>) -> Self {
        Self {
            category,
            type_name,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_model::names::{VALIDATE, VALIDATE_RECURSIVE};
    use assay_model::registry::{TypeDef, TypeFlags};
    use assay_model::{ObjectFlags, PropertyFlags, PropertyKind, TypeRegistry, Verdict};
    use pretty_assertions::assert_eq;

    fn content(class: TypeDef) -> Content {
        let mut types = TypeRegistry::with_builtins();
        types.add_class(class).unwrap();
        Content::new(types)
    }

    fn settings() -> ValidationSettings {
        ValidationSettings {
            project_name: "Shooter".to_string(),
            ..ValidationSettings::default()
        }
    }

    #[test]
    fn test_unknown_and_abstract_classes_are_valid() {
        let engine = ValidationEngine::new(settings());
        let content = content(TypeDef::new("Base", "/Game/Base").with_flags(TypeFlags {
            is_abstract: true,
            deprecated: false,
        }));

        let result = engine.validate_object(&content, &Object::new("/Game/A.A", "Missing"));
        assert_eq!(result.verdict, Verdict::Valid);
        let result = engine.validate_object(&content, &Object::new("/Game/A.A", "Base"));
        assert_eq!(result.verdict, Verdict::Valid);
    }

    #[test]
    fn test_filtered_package_is_not_validated() {
        let engine = ValidationEngine::new(settings());
        let content = content(
            TypeDef::new("EngineActor", "/Script/Engine")
                .with_property(Property::new("Mesh", PropertyKind::object("StaticMesh")).with_tag(VALIDATE)),
        );
        let object = Object::new("/Game/Maps/Level.Actor_1", "EngineActor").with_field("Mesh", Value::Object(None));
        let result = engine.validate_object(&content, &object);
        assert_eq!(result.verdict, Verdict::NotValidated);
    }

    #[test]
    fn test_project_package_is_validated() {
        let engine = ValidationEngine::new(settings());
        let content = content(
            TypeDef::new("ShooterActor", "/Script/Shooter")
                .with_property(Property::new("Mesh", PropertyKind::object("StaticMesh")).with_tag(VALIDATE)),
        );
        let object = Object::new("/Game/Maps/Level.Actor_1", "ShooterActor").with_field("Mesh", Value::Object(None));
        let result = engine.validate_object(&content, &object);
        assert_eq!(result.verdict, Verdict::Invalid);
        assert_eq!(result.errors, vec!["Mesh: Object property not set".to_string()]);
    }

    #[test]
    fn test_eligibility_flags() {
        let engine = ValidationEngine::new(settings());
        let hidden = Property::new("Hidden", PropertyKind::Name)
            .with_tag(VALIDATE)
            .with_flags(PropertyFlags::hidden());
        let defaults_only = Property::new("DefaultsOnly", PropertyKind::Name)
            .with_tag(VALIDATE)
            .with_flags(PropertyFlags {
                disable_edit_on_instance: true,
                ..PropertyFlags::default()
            });
        let content = content(
            TypeDef::new("Spawner", "/Game/Spawner")
                .with_property(hidden)
                .with_property(defaults_only),
        );

        let asset = Object::new("/Game/Spawner.Spawner", "Spawner")
            .with_field("Hidden", Value::Str("None".into()))
            .with_field("DefaultsOnly", Value::Str("None".into()));
        let result = engine.validate_object(&content, &asset);
        assert_eq!(result.errors, vec!["DefaultsOnly: Name property not set".to_string()]);

        let instance = asset.clone().with_flags(ObjectFlags::instance());
        assert_eq!(engine.validate_object(&content, &instance).errors.len(), 0);

        let template = asset.with_flags(ObjectFlags::template());
        assert_eq!(engine.validate_object(&content, &template).errors.len(), 1);
    }

    #[test]
    fn test_edit_condition_gates_property() {
        let engine = ValidationEngine::new(settings());
        let content = content(
            TypeDef::new("Weapon", "/Game/Weapon")
                .with_property(Property::new("bUsesAmmo", PropertyKind::Bool))
                .with_property(
                    Property::new("AmmoType", PropertyKind::object("Ammo"))
                        .with_tag(VALIDATE)
                        .with_meta(EDIT_CONDITION, "bUsesAmmo"),
                ),
        );
        let melee = Object::new("/Game/Knife.Knife", "Weapon")
            .with_field("bUsesAmmo", Value::Bool(false))
            .with_field("AmmoType", Value::Object(None));
        assert_eq!(engine.validate_object(&content, &melee).verdict, Verdict::Valid);

        let rifle = melee.clone().with_field("bUsesAmmo", Value::Bool(true));
        assert_eq!(engine.validate_object(&content, &rifle).verdict, Verdict::Invalid);
        assert_eq!(engine.cached_condition_count(), 1);
    }

    #[test]
    fn test_edit_condition_failure_policy() {
        let property = Property::new("AmmoType", PropertyKind::object("Ammo"))
            .with_tag(VALIDATE)
            .with_meta(EDIT_CONDITION, "RenamedFlag == true");
        let content = content(TypeDef::new("Weapon", "/Game/Weapon").with_property(property));
        let object = Object::new("/Game/Knife.Knife", "Weapon").with_field("AmmoType", Value::Object(None));

        let closed = ValidationEngine::new(settings());
        assert_eq!(closed.validate_object(&content, &object).verdict, Verdict::Valid);

        let open = ValidationEngine::new(ValidationSettings {
            fail_open_on_condition_error: true,
            ..settings()
        });
        assert_eq!(open.validate_object(&content, &object).verdict, Verdict::Invalid);
    }

    #[test]
    fn test_validate_object_property() {
        let engine = ValidationEngine::new(settings());
        let content = content(
            TypeDef::new("Pickup", "/Game/Pickup")
                .with_property(Property::new("Mesh", PropertyKind::object("StaticMesh")).with_tag(VALIDATE))
                .with_property(Property::new("Label", PropertyKind::Str).with_tag(VALIDATE)),
        );
        let object = Object::new("/Game/Pickup.Pickup", "Pickup")
            .with_field("Mesh", Value::Object(None))
            .with_field("Label", Value::Str("Health".into()));

        let result = engine.validate_object_property(&content, &object, "Label");
        assert_eq!(result.verdict, Verdict::Valid);
        let result = engine.validate_object_property(&content, &object, "Mesh");
        assert_eq!(result.errors.len(), 1);
        let result = engine.validate_object_property(&content, &object, "Missing");
        assert_eq!(result.verdict, Verdict::Valid);
    }

    #[test]
    fn test_object_recursion_terminates_on_cycles() {
        let engine = ValidationEngine::new(settings());
        let mut types = TypeRegistry::with_builtins();
        types
            .add_class(
                TypeDef::new("Node", "/Game/Node")
                    .with_property(
                        Property::new("Next", PropertyKind::object("Node"))
                            .with_tag(VALIDATE)
                            .with_tag(VALIDATE_RECURSIVE),
                    )
                    .with_property(Property::new("Label", PropertyKind::Name).with_tag(VALIDATE)),
            )
            .unwrap();
        let mut content = Content::new(types);
        content
            .add_object(
                Object::new("/Game/A.A", "Node")
                    .with_field("Next", Value::Object(Some("/Game/B.B".into())))
                    .with_field("Label", Value::Str("A".into())),
            )
            .unwrap();
        content
            .add_object(
                Object::new("/Game/B.B", "Node")
                    .with_field("Next", Value::Object(Some("/Game/A.A".into())))
                    .with_field("Label", Value::Str("None".into())),
            )
            .unwrap();

        let a = content.object("/Game/A.A").unwrap();
        let result = engine.validate_object(&content, a);
        assert_eq!(result.errors, vec!["Next.Label: Name property not set".to_string()]);
    }
}
