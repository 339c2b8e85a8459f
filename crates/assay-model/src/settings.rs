use serde::{Deserialize, Serialize};

use crate::external::ExternalValidationData;

/// Script packages start with this prefix; everything else is content.
pub const SCRIPT_PREFIX: &str = "/Script";

/// Project configuration (assay.config.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Project name; `/Script/<name>` packages are always validated
    pub name: String,

    #[serde(default)]
    pub validation: ValidationSettings,

    #[serde(default, skip_serializing_if = "ExternalValidationData::is_empty")]
    pub external_data: ExternalValidationData,

    #[serde(default)]
    pub size_restrictions: SizeRestrictionSettings,
}

impl ProjectConfig {
    /// Validation settings with the project name filled in when unset.
    pub fn effective_validation(&self) -> ValidationSettings {
        let mut settings = self.validation.clone();
        if settings.project_name.is_empty() {
            settings.project_name = self.name.clone();
        }
        settings
    }
}

/// Switches that shape a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSettings {
    #[serde(default)]
    pub project_name: String,

    /// Extra package prefixes allowed for validation.
    #[serde(default)]
    pub packages_to_validate: Vec<String>,

    /// Skip properties declared on blueprint-generated classes.
    #[serde(default)]
    pub skip_blueprint_generated_classes: bool,

    /// Recurse into struct values and struct container elements without a tag.
    #[serde(default = "default_true")]
    pub auto_validate_struct_inner_properties: bool,

    /// Treat an edit condition that fails to parse or evaluate as satisfied.
    #[serde(default)]
    pub fail_open_on_condition_error: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            packages_to_validate: Vec::new(),
            skip_blueprint_generated_classes: false,
            auto_validate_struct_inner_properties: true,
            fail_open_on_condition_error: false,
        }
    }
}

impl ValidationSettings {
    /// Whether types declared in `package` are validated at all.
    pub fn can_validate_package(&self, package: &str) -> bool {
        if is_blueprint_generated(package) {
            return true;
        }
        if !self.project_name.is_empty() {
            let project_package = format!("{SCRIPT_PREFIX}/{}", self.project_name);
            if package.starts_with(&project_package) {
                return true;
            }
        }
        self.packages_to_validate
            .iter()
            .any(|prefix| !prefix.is_empty() && package.starts_with(prefix.as_str()))
    }
}

/// Content packages live under `/Game/` or outside `/Script` (plugin content).
pub fn is_blueprint_generated(package: &str) -> bool {
    package.starts_with("/Game/") || !package.starts_with(SCRIPT_PREFIX)
}

/// Size limit for every asset of a class (and its subclasses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTypeSizeRestriction {
    pub class: String,
    #[serde(default)]
    pub max_memory_size_mb: u32,
    #[serde(default)]
    pub max_disk_size_mb: u32,
}

/// Size limit for one specific asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSizeRestriction {
    pub asset: String,
    #[serde(default)]
    pub max_memory_size_mb: u32,
    #[serde(default)]
    pub max_disk_size_mb: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeRestrictionSettings {
    #[serde(default)]
    pub asset_types: Vec<AssetTypeSizeRestriction>,
    #[serde(default)]
    pub assets: Vec<AssetSizeRestriction>,
    /// Packages skipped entirely.
    #[serde(default)]
    pub exceptions: Vec<String>,
}

impl SizeRestrictionSettings {
    /// Restrictions apply only when at least one class limit is configured.
    pub fn is_enabled(&self) -> bool {
        !self.asset_types.is_empty()
    }
}
