use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ReflectError;
use crate::registry::{TypeCategory, TypeRegistry};
use crate::value::Value;

/// How an object participates in the content pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFlags {
    /// Top-level asset saved in its own package.
    #[serde(default = "default_true")]
    pub asset: bool,
    /// Class default object or archetype.
    #[serde(default)]
    pub template: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ObjectFlags {
    fn default() -> Self {
        Self {
            asset: true,
            template: false,
        }
    }
}

impl ObjectFlags {
    /// A placed instance: neither asset nor template.
    pub fn instance() -> Self {
        Self {
            asset: false,
            template: false,
        }
    }

    pub fn template() -> Self {
        Self {
            asset: false,
            template: true,
        }
    }
}

/// A live object instance: a class plus field values.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Object path, e.g. `/Game/Items/Sword.Sword`.
    pub path: String,
    pub class: String,
    pub flags: ObjectFlags,
    pub fields: IndexMap<String, Value>,
}

impl Object {
    pub fn new(path: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            class: class.into(),
            flags: ObjectFlags::default(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Package name: the object path up to the first `.`.
    pub fn package(&self) -> &str {
        self.path.split('.').next().unwrap_or(&self.path)
    }

    /// Short object name: the last path segment without the package.
    pub fn name(&self) -> &str {
        match self.path.rsplit_once('.') {
            Some((_, name)) => name,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Types plus object instances: everything the engine reads during a pass.
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub types: TypeRegistry,
    objects: IndexMap<String, Object>,
}

impl Content {
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            objects: IndexMap::new(),
        }
    }

    /// Add an object, filling fields it does not set with defaults.
    pub fn add_object(&mut self, mut object: Object) -> Result<(), ReflectError> {
        if self.types.class(&object.class).is_none() {
            return Err(ReflectError::UnknownClass(object.class));
        }
        if self.objects.contains_key(&object.path) {
            return Err(ReflectError::DuplicateObject(object.path));
        }
        self.types
            .complete_fields(TypeCategory::Class, &object.class, &mut object.fields);
        self.objects.insert(object.path.clone(), object);
        Ok(())
    }

    pub fn object(&self, path: &str) -> Option<&Object> {
        self.objects.get(path)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
