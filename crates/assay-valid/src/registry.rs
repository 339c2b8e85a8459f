use indexmap::IndexMap;
use log::debug;

use assay_model::{KindTag, Property};

use crate::validator::{ContainerValidator, PropertyValidator};
use crate::validators;

/// Every validator instance, indexed by the kind of property it claims.
///
/// Lookup order is registration order. Property validators are first-match;
/// container validators all run.
#[derive(Default)]
pub struct ValidatorRegistry {
    property_validators: Vec<Box<dyn PropertyValidator>>,
    container_validators: Vec<Box<dyn ContainerValidator>>,
    property_index: IndexMap<KindTag, Vec<usize>>,
    container_index: IndexMap<KindTag, Vec<usize>>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field(
                "property_validators",
                &self.property_validators.iter().map(|v| v.name()).collect::<Vec<_>>(),
            )
            .field(
                "container_validators",
                &self.container_validators.iter().map(|v| v.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ValidatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in validator, in declaration order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        validators::register_builtins(&mut registry);
        registry
    }

    pub fn register_property(&mut self, validator: Box<dyn PropertyValidator>) {
        let descriptor = validator.descriptor();
        let shadowed = self.property_validators.iter().any(|v| v.descriptor() == descriptor);
        if shadowed {
            debug!(
                "property validator '{}' shadowed by an earlier validator for {descriptor}",
                validator.name()
            );
        }
        self.property_index
            .entry(descriptor.kind)
            .or_default()
            .push(self.property_validators.len());
        self.property_validators.push(validator);
    }

    pub fn register_container(&mut self, validator: Box<dyn ContainerValidator>) {
        let descriptor = validator.descriptor();
        self.container_index
            .entry(descriptor.kind)
            .or_default()
            .push(self.container_validators.len());
        // Soft references resolve through the same object walk.
        if descriptor.kind == KindTag::Object && descriptor.type_name.is_none() {
            self.container_index
                .entry(KindTag::SoftObject)
                .or_default()
                .push(self.container_validators.len());
        }
        self.container_validators.push(validator);
    }

    /// Property validators whose descriptor matches, in registration order.
    pub fn property_validators<'r>(
        &'r self,
        property: &'r Property,
    ) -> impl Iterator<Item = &'r dyn PropertyValidator> + 'r {
        self.property_index
            .get(&property.tag())
            .into_iter()
            .flatten()
            .map(|&i| self.property_validators[i].as_ref())
            .filter(move |v| v.descriptor().matches(property))
    }

    /// Container validators indexed under the property's kind, in registration order.
    pub fn container_validators<'r>(
        &'r self,
        property: &'r Property,
    ) -> impl Iterator<Item = &'r dyn ContainerValidator> + 'r {
        self.container_index
            .get(&property.tag())
            .into_iter()
            .flatten()
            .map(|&i| self.container_validators[i].as_ref())
    }

    /// Whether anything can check values of this property's type.
    ///
    /// A property validator is enough; otherwise only containers count, since
    /// a struct without a value validator has no value to check.
    pub fn has_validator_for(&self, property: &Property) -> bool {
        if self.property_validators(property).next().is_some() {
            return true;
        }
        property.is_container() && self.container_validators(property).next().is_some()
    }

    pub fn property_validator_count(&self) -> usize {
        self.property_validators.len()
    }

    pub fn container_validator_count(&self) -> usize {
        self.container_validators.len()
    }

    /// Names of every registered validator, property validators first.
    pub fn names(&self) -> Vec<&'static str> {
        self.property_validators
            .iter()
            .map(|v| v.name())
            .chain(self.container_validators.iter().map(|v| v.name()))
            .collect()
    }
}
