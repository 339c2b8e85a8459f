use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;

use assay_model::names::FAILURE_MESSAGE;
use assay_model::report::{E_PROPERTY_INVALID, W_PROPERTY_INVALID};
use assay_model::{Content, Issue, Object, PropertyValidationResult, TypeCategory, Value};

use crate::engine::ValidationEngine;
use crate::validator::ValidationTarget;

/// State of one top-level validation call: the breadcrumb prefix stack, the
/// issues raised so far and the object currently being walked.
pub struct ValidationContext<'a> {
    engine: &'a ValidationEngine,
    content: &'a Content,
    /// Source objects, innermost last. Never empty.
    sources: Vec<&'a Object>,
    prefixes: Vec<String>,
    /// Prefixes joined with `.`, with a trailing `.` when non-empty.
    context_string: String,
    issues: Vec<Issue>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(engine: &'a ValidationEngine, content: &'a Content, source: &'a Object) -> Self {
        Self {
            engine,
            content,
            sources: vec![source],
            prefixes: Vec::new(),
            context_string: String::new(),
            issues: Vec::new(),
        }
    }

    pub fn engine(&self) -> &'a ValidationEngine {
        self.engine
    }

    pub fn content(&self) -> &'a Content {
        self.content
    }

    /// The object whose properties are being walked.
    pub fn source_object(&self) -> &'a Object {
        // `sources` starts with the root object and pops never go below it.
        self.sources[self.sources.len() - 1]
    }

    /// Whether `object` is already being walked further up the stack.
    pub fn is_visiting(&self, object: &Object) -> bool {
        self.sources.iter().any(|o| o.path == object.path)
    }

    pub fn push_prefix(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        self.context_string.push_str(&prefix);
        self.context_string.push('.');
        self.prefixes.push(prefix);
    }

    pub fn pop_prefix(&mut self) {
        if let Some(prefix) = self.prefixes.pop() {
            let len = self.context_string.len() - prefix.len() - 1;
            self.context_string.truncate(len);
        } else {
            debug_assert!(false, "unbalanced prefix stack");
        }
    }

    /// Push a prefix that is popped when the returned guard drops.
    pub fn scoped_prefix(&mut self, prefix: impl Into<String>) -> ScopedPrefix<'_, 'a> {
        self.push_prefix(prefix);
        ScopedPrefix {
            context: self,
            pushed: true,
        }
    }

    /// Like [`scoped_prefix`](Self::scoped_prefix), pushing only when `condition` holds.
    pub fn conditional_prefix(&mut self, prefix: impl Into<String>, condition: bool) -> ScopedPrefix<'_, 'a> {
        if condition {
            self.push_prefix(prefix);
        }
        ScopedPrefix {
            context: self,
            pushed: condition,
        }
    }

    pub fn prefix_depth(&self) -> usize {
        self.prefixes.len()
    }

    pub fn context_string(&self) -> &str {
        &self.context_string
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Record a failure for the target.
    ///
    /// A `FailureMessage` on the metadata source replaces `default_message`.
    /// Elements are reported under the container's breadcrumb without their
    /// own display name.
    pub fn property_fails(&mut self, target: &ValidationTarget<'_>, default_message: &str) {
        let message = target.meta.meta(FAILURE_MESSAGE).unwrap_or(default_message);

        let location = if target.element {
            self.context_string
                .strip_suffix('.')
                .unwrap_or(&self.context_string)
                .to_string()
        } else {
            format!("{}{}", self.context_string, target.property.display_name())
        };

        let issue = if target.meta.is_error_source() {
            Issue::error(E_PROPERTY_INVALID, format!("{location}: {message}"))
        } else {
            Issue::warning(W_PROPERTY_INVALID, format!("{location}: {message}"))
        };
        self.issues.push(issue.with_property(target.property.name.clone()));
    }

    /// [`property_fails`](Self::property_fails) when `condition` holds.
    pub fn fail_on_condition(&mut self, condition: bool, target: &ValidationTarget<'_>, default_message: &str) {
        if condition {
            self.property_fails(target, default_message);
        }
    }

    /// Errors and warnings raised so far, with the verdict they imply.
    pub fn make_validation_result(&self) -> PropertyValidationResult {
        PropertyValidationResult::from_issues(&self.issues)
    }

    // ── Re-entry into the engine ──

    /// Validate every property of a class or struct instance.
    pub fn is_property_container_valid(
        &mut self,
        category: TypeCategory,
        type_name: &str,
        fields: &IndexMap<String, Value>,
    ) {
        let engine = self.engine;
        engine.validate_container_with_context(self, category, type_name, fields);
    }

    /// Validate one value with the validators of its property type.
    pub fn is_property_value_valid(&mut self, target: &ValidationTarget<'_>) {
        let engine = self.engine;
        engine.validate_value_with_context(self, target);
    }

    /// Walk a referenced object's properties with that object as the source.
    pub fn is_object_valid(&mut self, object: &'a Object) {
        if self.is_visiting(object) {
            return;
        }
        self.sources.push(object);
        self.is_property_container_valid(TypeCategory::Class, &object.class, &object.fields);
        self.sources.pop();
    }
}

/// Pops its prefix on drop, so early returns keep the stack balanced.
pub struct ScopedPrefix<'c, 'a> {
    context: &'c mut ValidationContext<'a>,
    pushed: bool,
}

impl<'a> Deref for ScopedPrefix<'_, 'a> {
    type Target = ValidationContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopedPrefix<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ScopedPrefix<'_, '_> {
    fn drop(&mut self) {
        if self.pushed {
            self.context.pop_prefix();
        }
    }
}
