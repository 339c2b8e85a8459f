//! Built-in validators.

pub mod containers;
pub mod scalar;
pub mod structs;

use crate::registry::ValidatorRegistry;

use containers::{
    ArrayContainerValidator, MapContainerValidator, ObjectContainerValidator, SetContainerValidator,
    StructContainerValidator,
};
use scalar::{
    ByteValidator, EnumValidator, NameValidator, ObjectValidator, SoftObjectValidator, StringValidator,
    TextValidator,
};
use structs::{
    DataTableRowHandleValidator, GameplayAttributeValidator, GameplayTagContainerValidator, GameplayTagValidator,
    InstancedStructValidator, SoftObjectPathValidator,
};

/// Register every built-in validator. Registration order is lookup order.
pub fn register_builtins(registry: &mut ValidatorRegistry) {
    registry.register_property(Box::new(ByteValidator));
    registry.register_property(Box::new(EnumValidator));
    registry.register_property(Box::new(NameValidator));
    registry.register_property(Box::new(StringValidator));
    registry.register_property(Box::new(TextValidator));
    registry.register_property(Box::new(ObjectValidator));
    registry.register_property(Box::new(SoftObjectValidator));
    registry.register_property(Box::new(GameplayTagValidator));
    registry.register_property(Box::new(GameplayTagContainerValidator));
    registry.register_property(Box::new(GameplayAttributeValidator));
    registry.register_property(Box::new(DataTableRowHandleValidator));
    registry.register_property(Box::new(SoftObjectPathValidator));
    registry.register_property(Box::new(InstancedStructValidator));

    registry.register_container(Box::new(ArrayContainerValidator));
    registry.register_container(Box::new(SetContainerValidator));
    registry.register_container(Box::new(MapContainerValidator));
    registry.register_container(Box::new(StructContainerValidator));
    registry.register_container(Box::new(ObjectContainerValidator));
}
