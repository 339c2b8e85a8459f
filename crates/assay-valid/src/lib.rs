pub mod context;
pub mod descriptor;
pub mod engine;
pub mod metadata;
pub mod registry;
pub mod validator;
pub mod validators;

pub use context::{ScopedPrefix, ValidationContext};
pub use descriptor::PropertyValidatorDescriptor;
pub use engine::ValidationEngine;
pub use metadata::{MetaDataSource, ValidateMode};
pub use registry::ValidatorRegistry;
pub use validator::{ContainerValidator, PropertyValidator, ValidationTarget};
