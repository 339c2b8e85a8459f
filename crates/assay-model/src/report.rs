use serde::{Deserialize, Serialize};

// ── Issue code constants ──

pub const E_PROPERTY_INVALID: &str = "E_PROPERTY_INVALID";
pub const W_PROPERTY_INVALID: &str = "W_PROPERTY_INVALID";
pub const E_AUDIT_FAILED: &str = "E_AUDIT_FAILED";
pub const E_MEMORY_SIZE_EXCEEDED: &str = "E_MEMORY_SIZE_EXCEEDED";
pub const E_DISK_SIZE_EXCEEDED: &str = "E_DISK_SIZE_EXCEEDED";
pub const I_SIZE_EXCEPTION: &str = "I_SIZE_EXCEPTION";
pub const E_PARSE_ERROR: &str = "E_PARSE_ERROR";
pub const E_UNKNOWN_TYPE: &str = "E_UNKNOWN_TYPE";
pub const E_INVALID_VALUE: &str = "E_INVALID_VALUE";
pub const E_DUPLICATE_DEFINITION: &str = "E_DUPLICATE_DEFINITION";
pub const W_UNKNOWN_META: &str = "W_UNKNOWN_META";

/// Severity level for issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single validation, loading or audit finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Machine-readable stable code
    pub code: String,
    pub severity: Severity,
    /// Human-readable message, already prefixed with its location
    pub message: String,
    /// Property path the issue was raised for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Relative file path, for loading issues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Issue {
    fn new(code: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message: message.into(),
            property: None,
            file: None,
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn info(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Overall outcome of validating one object, struct or property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    Valid,
    Invalid,
    /// Nothing applicable was found to check.
    NotValidated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValidationResult {
    pub verdict: Verdict,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for PropertyValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl PropertyValidationResult {
    pub fn valid() -> Self {
        Self {
            verdict: Verdict::Valid,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn not_validated() -> Self {
        Self {
            verdict: Verdict::NotValidated,
            ..Self::valid()
        }
    }

    /// Partition issues into errors and warnings. Info issues are dropped.
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut result = Self::valid();
        for issue in issues {
            match issue.severity {
                Severity::Error => result.errors.push(issue.message.clone()),
                Severity::Warning => result.warnings.push(issue.message.clone()),
                Severity::Info => {}
            }
        }
        if !result.errors.is_empty() {
            result.verdict = Verdict::Invalid;
        }
        result
    }

    pub fn has_errors(&self) -> bool {
        self.verdict == Verdict::Invalid
    }

    /// Combine with another result. Invalid wins over Valid, which wins over NotValidated.
    pub fn merge(&mut self, other: PropertyValidationResult) {
        self.verdict = match (self.verdict, other.verdict) {
            (Verdict::Invalid, _) | (_, Verdict::Invalid) => Verdict::Invalid,
            (Verdict::Valid, _) | (_, Verdict::Valid) => Verdict::Valid,
            _ => Verdict::NotValidated,
        };
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Result of validating one object in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectResult {
    pub object: String,
    #[serde(flatten)]
    pub result: PropertyValidationResult,
}

/// Aggregated report for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// No error issues and no invalid objects (warnings are ok)
    pub ok: bool,
    /// Loading, audit and restriction issues
    pub issues: Vec<Issue>,
    /// Per-object validation results
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectResult>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::success()
    }
}

impl ValidationReport {
    pub fn success() -> Self {
        Self {
            ok: true,
            issues: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let ok = !issues.iter().any(|i| i.severity == Severity::Error);
        Self {
            ok,
            issues,
            objects: Vec::new(),
        }
    }

    /// Add an issue and update the ok flag
    pub fn push(&mut self, issue: Issue) {
        if issue.severity == Severity::Error {
            self.ok = false;
        }
        self.issues.push(issue);
    }

    /// Record an object's result; an invalid object fails the report
    pub fn push_object(&mut self, object: impl Into<String>, result: PropertyValidationResult) {
        if result.has_errors() {
            self.ok = false;
        }
        self.objects.push(ObjectResult {
            object: object.into(),
            result,
        });
    }

    pub fn merge(&mut self, other: ValidationReport) {
        for issue in other.issues {
            self.push(issue);
        }
        for object in other.objects {
            self.push_object(object.object, object.result);
        }
    }

    /// Count issues of a specific severity
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Objects with the given verdict
    pub fn count_verdict(&self, verdict: Verdict) -> usize {
        self.objects
            .iter()
            .filter(|o| o.result.verdict == verdict)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        !self.ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_issue_json_format() {
        let issue = Issue::error(E_PROPERTY_INVALID, "Hero.Weapon: Object property not set")
            .with_property("Hero.Weapon");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["code"], "E_PROPERTY_INVALID");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["property"], "Hero.Weapon");
        assert!(json.get("file").is_none());
    }

    #[test]
    fn test_result_from_issues() {
        let issues = vec![
            Issue::warning(W_PROPERTY_INVALID, "a"),
            Issue::info(I_SIZE_EXCEPTION, "b"),
        ];
        let result = PropertyValidationResult::from_issues(&issues);
        assert_eq!(result.verdict, Verdict::Valid);
        assert_eq!(result.warnings, vec!["a".to_string()]);

        let issues = vec![Issue::error(E_PROPERTY_INVALID, "c")];
        let result = PropertyValidationResult::from_issues(&issues);
        assert_eq!(result.verdict, Verdict::Invalid);
        assert_eq!(result.errors, vec!["c".to_string()]);
    }

    #[test]
    fn test_result_merge_verdicts() {
        let mut result = PropertyValidationResult::not_validated();
        result.merge(PropertyValidationResult::valid());
        assert_eq!(result.verdict, Verdict::Valid);

        result.merge(PropertyValidationResult::from_issues(&[Issue::error(
            E_PROPERTY_INVALID,
            "x",
        )]));
        assert_eq!(result.verdict, Verdict::Invalid);

        result.merge(PropertyValidationResult::valid());
        assert!(result.has_errors());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_report_from_issues() {
        let report = ValidationReport::from_issues(vec![Issue::warning(W_UNKNOWN_META, "w")]);
        assert!(report.ok);

        let report = ValidationReport::from_issues(vec![Issue::error(E_PARSE_ERROR, "e")]);
        assert!(!report.ok);
    }

    #[test]
    fn test_report_invalid_object_fails() {
        let mut report = ValidationReport::success();
        report.push_object("/Game/A.A", PropertyValidationResult::valid());
        assert!(report.ok);

        let mut other = ValidationReport::success();
        other.push_object(
            "/Game/B.B",
            PropertyValidationResult::from_issues(&[Issue::error(E_PROPERTY_INVALID, "x")]),
        );
        report.merge(other);
        assert!(report.has_errors());
        assert_eq!(report.count_verdict(Verdict::Invalid), 1);
        assert_eq!(report.count_verdict(Verdict::Valid), 1);
    }

    #[test]
    fn test_object_result_json_is_flat() {
        let mut report = ValidationReport::success();
        report.push_object("/Game/A.A", PropertyValidationResult::not_validated());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["objects"][0]["object"], "/Game/A.A");
        assert_eq!(json["objects"][0]["verdict"], "notValidated");
    }
}
