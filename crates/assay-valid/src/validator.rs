use assay_model::{Property, Value};

use crate::context::ValidationContext;
use crate::descriptor::PropertyValidatorDescriptor;
use crate::metadata::{MetaDataSource, ValidateMode};

/// One property value presented to a validator.
#[derive(Debug, Clone, Copy)]
pub struct ValidationTarget<'t> {
    pub property: &'t Property,
    pub value: &'t Value,
    /// Metadata of the property, or of the owning container for elements.
    pub meta: &'t MetaDataSource<'t>,
    pub mode: ValidateMode,
    /// The value is an element of an array, set or map.
    pub element: bool,
}

impl<'t> ValidationTarget<'t> {
    pub fn new(property: &'t Property, value: &'t Value, meta: &'t MetaDataSource<'t>) -> Self {
        Self {
            property,
            value,
            meta,
            mode: meta.validate_mode(),
            element: false,
        }
    }

    /// An element of this target's container, checked under `mode`.
    pub fn element(&self, property: &'t Property, value: &'t Value, mode: ValidateMode) -> Self {
        Self {
            property,
            value,
            meta: self.meta,
            mode,
            element: true,
        }
    }
}

/// Checks a single value: scalars and struct values of one exact type.
///
/// Implementations hold no mutable state, so one instance serves every
/// validation run.
pub trait PropertyValidator: Send + Sync {
    fn name(&self) -> &'static str;

    fn descriptor(&self) -> PropertyValidatorDescriptor;

    /// Value validators only fire when the value itself was asked to be checked.
    fn can_validate(&self, target: &ValidationTarget<'_>) -> bool {
        self.descriptor().matches(target.property) && target.mode == ValidateMode::ValidateAll
    }

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>);
}

/// Walks into a value that holds other properties: arrays, sets, maps,
/// structs and referenced objects.
pub trait ContainerValidator: Send + Sync {
    fn name(&self) -> &'static str;

    fn descriptor(&self) -> PropertyValidatorDescriptor;

    fn can_validate(&self, target: &ValidationTarget<'_>, context: &ValidationContext<'_>) -> bool;

    fn validate(&self, target: &ValidationTarget<'_>, context: &mut ValidationContext<'_>);
}
