use std::borrow::Cow;

use assay_model::external::ExternalValidationData;
use assay_model::names::{VALIDATE, VALIDATE_KEY, VALIDATE_VALUE, VALIDATE_WARNING};
use assay_model::{Property, PropertyExternalData};

/// Where a property's validation metadata comes from.
///
/// Writes go to a private copy (`Cow`), so synthesized tags never leak back
/// into the type registry or the external side-table.
#[derive(Debug, Clone, Default)]
pub enum MetaDataSource<'a> {
    #[default]
    Unset,
    Property(Cow<'a, Property>),
    External(Cow<'a, PropertyExternalData>),
}

impl<'a> MetaDataSource<'a> {
    /// External record for (owner, property) when one exists, the property itself otherwise.
    pub fn resolve(external: &'a ExternalValidationData, owner: &str, property: &'a Property) -> Self {
        match external.find(owner, &property.name) {
            Some(data) => MetaDataSource::External(Cow::Borrowed(data)),
            None => MetaDataSource::Property(Cow::Borrowed(property)),
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, MetaDataSource::Unset)
    }

    pub fn is_external(&self) -> bool {
        matches!(self, MetaDataSource::External(_))
    }

    pub fn has_meta(&self, key: &str) -> bool {
        match self {
            MetaDataSource::Property(property) => property.has_meta(key),
            MetaDataSource::External(data) => data.has_meta(key),
            MetaDataSource::Unset => {
                debug_assert!(false, "metadata queried on an unset source");
                false
            }
        }
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        match self {
            MetaDataSource::Property(property) => property.meta(key),
            MetaDataSource::External(data) => data.meta(key),
            MetaDataSource::Unset => {
                debug_assert!(false, "metadata queried on an unset source");
                None
            }
        }
    }

    pub fn set_meta(&mut self, key: &str, value: &str) {
        match self {
            MetaDataSource::Property(property) => {
                property.to_mut().meta.insert(key.to_string(), value.to_string());
            }
            MetaDataSource::External(data) => data.to_mut().set_meta(key, value),
            MetaDataSource::Unset => debug_assert!(false, "metadata written on an unset source"),
        }
    }

    pub fn remove_meta(&mut self, key: &str) {
        match self {
            MetaDataSource::Property(property) => {
                if property.has_meta(key) {
                    property.to_mut().meta.shift_remove(key);
                }
            }
            MetaDataSource::External(data) => {
                if data.has_meta(key) {
                    data.to_mut().remove_meta(key);
                }
            }
            MetaDataSource::Unset => debug_assert!(false, "metadata removed on an unset source"),
        }
    }

    /// Validation intent expressed by the tags on this source.
    pub fn validate_mode(&self) -> ValidateMode {
        if self.has_meta(VALIDATE) || self.has_meta(VALIDATE_WARNING) {
            return ValidateMode::ValidateAll;
        }
        match (self.has_meta(VALIDATE_KEY), self.has_meta(VALIDATE_VALUE)) {
            (true, true) => ValidateMode::ValidateAll,
            (true, false) => ValidateMode::ValidateKeyOnly,
            (false, true) => ValidateMode::ValidateValueOnly,
            (false, false) => ValidateMode::None,
        }
    }

    /// Whether failures raised under this source are errors rather than warnings.
    pub fn is_error_source(&self) -> bool {
        if self.has_meta(VALIDATE) || self.has_meta(VALIDATE_KEY) || self.has_meta(VALIDATE_VALUE) {
            return true;
        }
        !self.has_meta(VALIDATE_WARNING)
    }
}

/// Which parts of a value the current dispatch is asked to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidateMode {
    #[default]
    None,
    ValidateAll,
    ValidateKeyOnly,
    ValidateValueOnly,
}

impl ValidateMode {
    pub fn is_none(self) -> bool {
        self == ValidateMode::None
    }

    pub fn validates_key(self) -> bool {
        matches!(self, ValidateMode::ValidateAll | ValidateMode::ValidateKeyOnly)
    }

    pub fn validates_value(self) -> bool {
        matches!(self, ValidateMode::ValidateAll | ValidateMode::ValidateValueOnly)
    }
}
