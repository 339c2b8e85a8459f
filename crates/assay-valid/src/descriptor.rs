use std::fmt;

use assay_model::{KindTag, Property};

/// The property type a validator claims: a kind plus, optionally, the exact
/// concrete type name (struct type for struct validators).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyValidatorDescriptor {
    pub kind: KindTag,
    pub type_name: Option<String>,
}

impl PropertyValidatorDescriptor {
    pub fn kind(kind: KindTag) -> Self {
        Self {
            kind,
            type_name: None,
        }
    }

    /// Struct validator for exactly one struct type.
    pub fn structure(struct_type: impl Into<String>) -> Self {
        Self {
            kind: KindTag::Struct,
            type_name: Some(struct_type.into()),
        }
    }

    pub fn matches(&self, property: &Property) -> bool {
        if property.tag() != self.kind {
            return false;
        }
        match &self.type_name {
            None => true,
            Some(type_name) => property.type_name() == Some(type_name.as_str()),
        }
    }
}

impl fmt::Display for PropertyValidatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_name {
            Some(type_name) => write!(f, "{:?}<{type_name}>", self.kind),
            None => write!(f, "{:?}", self.kind),
        }
    }
}
