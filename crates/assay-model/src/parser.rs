use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::asset::AssetRecord;
use crate::decode::RawObject;
use crate::registry::{EnumDef, TypeDef};
use crate::report::{Issue, E_PARSE_ERROR};
use crate::settings::ProjectConfig;

pub const CONFIG_FILE: &str = "assay.config.json";

/// Contents of a `*.types.json` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypesFile {
    #[serde(default)]
    pub classes: Vec<TypeDef>,
    #[serde(default)]
    pub structs: Vec<TypeDef>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
}

/// Contents of a `*.objects.json` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectsFile {
    #[serde(default)]
    pub objects: Vec<RawObject>,
}

/// Contents of a `*.assets.json` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetsFile {
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
}

/// Parse an assay.config.json file
pub fn parse_config(content: &str, file_path: &str) -> Result<ProjectConfig, Issue> {
    serde_json::from_str(content).map_err(|e| serde_error_to_issue(e, file_path))
}

/// Parse a *.types.json file
pub fn parse_types(content: &str, file_path: &str) -> Result<TypesFile, Issue> {
    serde_json::from_str(content).map_err(|e| serde_error_to_issue(e, file_path))
}

/// Parse a *.objects.json file
pub fn parse_objects(content: &str, file_path: &str) -> Result<ObjectsFile, Issue> {
    serde_json::from_str(content).map_err(|e| serde_error_to_issue(e, file_path))
}

/// Parse a *.assets.json file
pub fn parse_assets(content: &str, file_path: &str) -> Result<AssetsFile, Issue> {
    serde_json::from_str(content).map_err(|e| serde_error_to_issue(e, file_path))
}

/// Detect content file type from file name
pub fn detect_file_type(file_path: &Path) -> Option<ContentFileType> {
    let name = file_path.file_name()?.to_str()?;
    if name == CONFIG_FILE {
        Some(ContentFileType::Config)
    } else if name.ends_with(".types.json") {
        Some(ContentFileType::Types)
    } else if name.ends_with(".objects.json") {
        Some(ContentFileType::Objects)
    } else if name.ends_with(".assets.json") {
        Some(ContentFileType::Assets)
    } else {
        None
    }
}

/// Content file types, in load order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContentFileType {
    Config,
    Types,
    Objects,
    Assets,
}

/// Convert a serde_json error into a structured Issue
fn serde_error_to_issue(err: serde_json::Error, file_path: &str) -> Issue {
    Issue::error(
        E_PARSE_ERROR,
        format!(
            "JSON parse error at line {}, column {}: {err}",
            err.line(),
            err.column()
        ),
    )
    .with_file(file_path)
}
