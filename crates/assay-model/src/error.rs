use thiserror::Error;

use crate::property::KindTag;

/// Errors raised while building or decoding reflection data.
#[derive(Debug, Error)]
pub enum ReflectError {
    #[error("type '{0}' is defined more than once")]
    DuplicateType(String),

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("unknown struct '{0}'")]
    UnknownStruct(String),

    #[error("unknown enum '{0}'")]
    UnknownEnum(String),

    #[error("enum '{enum_type}' has no member '{member}'")]
    UnknownEnumMember { enum_type: String, member: String },

    #[error("'{owner}' has no property '{field}'")]
    UnknownField { owner: String, field: String },

    #[error("property '{property}' expects a {expected:?} value, found {found}")]
    TypeMismatch {
        property: String,
        expected: KindTag,
        found: String,
    },

    #[error("object '{0}' is defined more than once")]
    DuplicateObject(String),
}
