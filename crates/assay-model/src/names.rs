//! Metadata keys understood by the validation engine.

/// Validate the property value (or the container contents). Failures are errors.
pub const VALIDATE: &str = "Validate";
/// Validate only the keys of a map property.
pub const VALIDATE_KEY: &str = "ValidateKey";
/// Validate only the values of a map property.
pub const VALIDATE_VALUE: &str = "ValidateValue";
/// Like [`VALIDATE`], but failures are reported as warnings.
pub const VALIDATE_WARNING: &str = "ValidateWarning";
/// Recurse into the properties of a referenced object or nested struct.
pub const VALIDATE_RECURSIVE: &str = "ValidateRecursive";
/// Replaces the validator's default failure message.
pub const FAILURE_MESSAGE: &str = "FailureMessage";
/// Boolean expression gating whether the property is active.
pub const EDIT_CONDITION: &str = "EditCondition";

/// Every key the engine reads, in the order editors usually present them.
pub const ALL: [&str; 7] = [
    VALIDATE,
    VALIDATE_KEY,
    VALIDATE_VALUE,
    VALIDATE_WARNING,
    VALIDATE_RECURSIVE,
    FAILURE_MESSAGE,
    EDIT_CONDITION,
];

/// Whether `key` is one of the keys the engine interprets.
pub fn is_known(key: &str) -> bool {
    ALL.contains(&key)
}
