pub mod asset;
pub mod content;
pub mod decode;
pub mod error;
pub mod external;
pub mod loader;
pub mod names;
pub mod parser;
pub mod property;
pub mod registry;
pub mod report;
pub mod settings;
pub mod value;

pub use asset::AssetRecord;
pub use content::{Content, Object, ObjectFlags};
pub use error::ReflectError;
pub use external::{ExternalValidationData, PropertyExternalData};
pub use loader::{load_project, LoadError, LoadedProject};
pub use property::{KindTag, Property, PropertyFlags, PropertyKind};
pub use registry::{EnumDef, TypeCategory, TypeDef, TypeRegistry};
pub use report::{Issue, PropertyValidationResult, Severity, ValidationReport, Verdict};
pub use settings::{ProjectConfig, SizeRestrictionSettings, ValidationSettings};
pub use value::{StructValue, Value};
