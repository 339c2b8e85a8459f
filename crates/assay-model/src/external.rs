use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Validation metadata for one property of a type that cannot be annotated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyExternalData {
    pub property: String,
    #[serde(default)]
    pub meta: IndexMap<String, String>,
}

impl PropertyExternalData {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            meta: IndexMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn has_meta(&self, key: &str) -> bool {
        self.meta.contains_key(key)
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.insert(key.into(), value.into());
    }

    pub fn remove_meta(&mut self, key: &str) {
        self.meta.shift_remove(key);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassExternalData {
    pub class: String,
    #[serde(default)]
    pub properties: Vec<PropertyExternalData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructExternalData {
    #[serde(rename = "struct")]
    pub struct_type: String,
    #[serde(default)]
    pub properties: Vec<PropertyExternalData>,
}

/// Side-table of validation metadata keyed by (owning type, property).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalValidationData {
    #[serde(default)]
    pub classes: Vec<ClassExternalData>,
    #[serde(default)]
    pub structs: Vec<StructExternalData>,
}

impl ExternalValidationData {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.structs.is_empty()
    }

    /// Record for `property` declared on the class or struct named `owner`.
    pub fn find(&self, owner: &str, property: &str) -> Option<&PropertyExternalData> {
        let class = self
            .classes
            .iter()
            .filter(|c| c.class == owner)
            .flat_map(|c| c.properties.iter());
        let structs = self
            .structs
            .iter()
            .filter(|s| s.struct_type == owner)
            .flat_map(|s| s.properties.iter());
        class.chain(structs).find(|p| p.property == property)
    }

    pub fn find_mut(&mut self, owner: &str, property: &str) -> Option<&mut PropertyExternalData> {
        let class = self
            .classes
            .iter_mut()
            .filter(|c| c.class == owner)
            .flat_map(|c| c.properties.iter_mut());
        let structs = self
            .structs
            .iter_mut()
            .filter(|s| s.struct_type == owner)
            .flat_map(|s| s.properties.iter_mut());
        class.chain(structs).find(|p| p.property == property)
    }

    /// Record for a struct property, created empty when missing.
    pub fn struct_property_mut(&mut self, struct_type: &str, property: &str) -> &mut PropertyExternalData {
        let index = match self.structs.iter().position(|s| s.struct_type == struct_type) {
            Some(index) => index,
            None => {
                self.structs.push(StructExternalData {
                    struct_type: struct_type.to_string(),
                    properties: Vec::new(),
                });
                self.structs.len() - 1
            }
        };
        property_entry(&mut self.structs[index].properties, property)
    }

    /// Record for a class property, created empty when missing.
    pub fn class_property_mut(&mut self, class: &str, property: &str) -> &mut PropertyExternalData {
        let index = match self.classes.iter().position(|c| c.class == class) {
            Some(index) => index,
            None => {
                self.classes.push(ClassExternalData {
                    class: class.to_string(),
                    properties: Vec::new(),
                });
                self.classes.len() - 1
            }
        };
        property_entry(&mut self.classes[index].properties, property)
    }
}

fn property_entry<'a>(
    properties: &'a mut Vec<PropertyExternalData>,
    property: &str,
) -> &'a mut PropertyExternalData {
    let position = match properties.iter().position(|p| p.property == property) {
        Some(position) => position,
        None => {
            properties.push(PropertyExternalData::new(property));
            properties.len() - 1
        }
    };
    &mut properties[position]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_by_owner_and_property() {
        let mut data = ExternalValidationData::default();
        data.struct_property_mut("Vector", "X").set_meta("Validate", "");
        data.class_property_mut("Actor", "Owner").set_meta("ValidateRecursive", "");

        assert!(data.find("Vector", "X").unwrap().has_meta("Validate"));
        assert!(data.find("Actor", "Owner").unwrap().has_meta("ValidateRecursive"));
        assert!(data.find("Vector", "Y").is_none());
        assert!(data.find("Actor", "X").is_none());
    }

    #[test]
    fn test_property_mut_reuses_existing_record() {
        let mut data = ExternalValidationData::default();
        data.struct_property_mut("Vector", "X").set_meta("Validate", "");
        data.struct_property_mut("Vector", "X").set_meta("FailureMessage", "X must be set");

        assert_eq!(data.structs.len(), 1);
        assert_eq!(data.structs[0].properties.len(), 1);
        let record = data.find("Vector", "X").unwrap();
        assert_eq!(record.meta("FailureMessage"), Some("X must be set"));
    }

    #[test]
    fn test_remove_meta() {
        let mut data = ExternalValidationData::default();
        data.class_property_mut("Actor", "Owner").set_meta("Validate", "");
        data.find_mut("Actor", "Owner").unwrap().remove_meta("Validate");
        assert!(!data.find("Actor", "Owner").unwrap().has_meta("Validate"));
    }

    #[test]
    fn test_json_format() {
        let json = serde_json::json!({
            "structs": [
                { "struct": "Vector", "properties": [{ "property": "X", "meta": { "Validate": "" } }] }
            ]
        });
        let data: ExternalValidationData = serde_json::from_value(json).unwrap();
        assert!(data.classes.is_empty());
        assert!(data.find("Vector", "X").unwrap().has_meta("Validate"));
    }
}
