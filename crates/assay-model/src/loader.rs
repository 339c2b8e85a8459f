use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::asset::AssetRecord;
use crate::content::Content;
use crate::error::ReflectError;
use crate::names;
use crate::parser::{self, ContentFileType, CONFIG_FILE};
use crate::property::{Property, PropertyKind};
use crate::registry::{TypeDef, TypeRegistry};
use crate::report::{
    Issue, ValidationReport, E_DUPLICATE_DEFINITION, E_INVALID_VALUE, E_PARSE_ERROR,
    E_UNKNOWN_TYPE, W_UNKNOWN_META,
};
use crate::settings::ProjectConfig;

/// A loaded content project
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// Project root directory
    pub root: PathBuf,
    pub config: ProjectConfig,
    /// Reflection data and decoded objects
    pub content: Content,
    /// Asset registry records, in file order
    pub assets: Vec<AssetRecord>,
}

/// Load a content project directory.
/// Accumulates per-file errors instead of failing on the first one.
pub fn load_project(project_dir: &Path) -> Result<(LoadedProject, ValidationReport), LoadError> {
    let mut report = ValidationReport::success();

    if !project_dir.is_dir() {
        return Err(LoadError::ProjectNotFound(
            project_dir.to_string_lossy().into_owned(),
        ));
    }

    let config_path = project_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Err(LoadError::ConfigNotFound(
            config_path.to_string_lossy().into_owned(),
        ));
    }

    let config_content = std::fs::read_to_string(&config_path)
        .map_err(|e| LoadError::IoError(config_path.to_string_lossy().into_owned(), e))?;
    let config = parser::parse_config(&config_content, CONFIG_FILE)
        .map_err(|issue| LoadError::ConfigParseError(Box::new(issue)))?;

    // Types must be registered before any object can be decoded.
    let mut files = Vec::new();
    for entry in WalkDir::new(project_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let Some(file_type) = parser::detect_file_type(path) else {
            continue;
        };
        if file_type == ContentFileType::Config {
            continue;
        }
        let rel_path = path
            .strip_prefix(project_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        files.push((file_type, rel_path, path.to_path_buf()));
    }
    files.sort();

    let mut types = TypeRegistry::with_builtins();
    let mut raw_objects = Vec::new();
    let mut assets = Vec::new();
    let mut seen_packages = HashSet::new();

    for (file_type, rel_path, path) in files {
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                report.push(
                    Issue::error(E_PARSE_ERROR, format!("Failed to read file: {e}")).with_file(&rel_path),
                );
                continue;
            }
        };
        debug!("loading {rel_path}");

        match file_type {
            ContentFileType::Config => {}
            ContentFileType::Types => match parser::parse_types(&content, &rel_path) {
                Ok(file) => {
                    for def in file.classes {
                        check_meta_keys(&def, &rel_path, &mut report);
                        if let Err(e) = types.add_class(def) {
                            report.push(reflect_issue(e, &rel_path));
                        }
                    }
                    for def in file.structs {
                        check_meta_keys(&def, &rel_path, &mut report);
                        if let Err(e) = types.add_struct(def) {
                            report.push(reflect_issue(e, &rel_path));
                        }
                    }
                    for def in file.enums {
                        if let Err(e) = types.add_enum(def) {
                            report.push(reflect_issue(e, &rel_path));
                        }
                    }
                }
                Err(issue) => report.push(issue),
            },
            ContentFileType::Objects => match parser::parse_objects(&content, &rel_path) {
                Ok(file) => raw_objects.extend(file.objects.into_iter().map(|o| (rel_path.clone(), o))),
                Err(issue) => report.push(issue),
            },
            ContentFileType::Assets => match parser::parse_assets(&content, &rel_path) {
                Ok(file) => {
                    for record in file.assets {
                        if !seen_packages.insert(record.package.clone()) {
                            report.push(
                                Issue::error(
                                    E_DUPLICATE_DEFINITION,
                                    format!("asset '{}' is listed more than once", record.package),
                                )
                                .with_file(&rel_path),
                            );
                            continue;
                        }
                        assets.push(record);
                    }
                }
                Err(issue) => report.push(issue),
            },
        }
    }

    let mut content = Content::new(types);
    for (rel_path, raw) in raw_objects {
        let result = raw
            .decode(&content.types)
            .and_then(|object| content.add_object(object));
        if let Err(e) = result {
            report.push(reflect_issue(e, &rel_path));
        }
    }

    debug!(
        "loaded {} objects and {} assets from {}",
        content.object_count(),
        assets.len(),
        project_dir.display()
    );

    let project = LoadedProject {
        root: project_dir.to_path_buf(),
        config,
        content,
        assets,
    };

    Ok((project, report))
}

/// Warn about `Validate*` keys the engine will ignore (usually typos).
fn check_meta_keys(def: &TypeDef, file: &str, report: &mut ValidationReport) {
    fn visit(owner: &str, property: &Property, file: &str, report: &mut ValidationReport) {
        for key in property.meta.keys() {
            if key.starts_with("Validate") && !names::is_known(key) {
                warn!("{owner}.{}: unknown metadata key '{key}'", property.name);
                report.push(
                    Issue::warning(
                        W_UNKNOWN_META,
                        format!("{owner}.{}: unknown metadata key '{key}'", property.name),
                    )
                    .with_property(format!("{owner}.{}", property.name))
                    .with_file(file),
                );
            }
        }
        match &property.kind {
            PropertyKind::Array { element } | PropertyKind::Set { element } => {
                visit(owner, element, file, report)
            }
            PropertyKind::Map { key, value } => {
                visit(owner, key, file, report);
                visit(owner, value, file, report);
            }
            _ => {}
        }
    }

    for property in &def.properties {
        visit(&def.name, property, file, report);
    }
}

fn reflect_issue(err: ReflectError, file: &str) -> Issue {
    let code = match &err {
        ReflectError::DuplicateType(_) | ReflectError::DuplicateObject(_) => E_DUPLICATE_DEFINITION,
        ReflectError::UnknownClass(_)
        | ReflectError::UnknownStruct(_)
        | ReflectError::UnknownEnum(_)
        | ReflectError::UnknownField { .. } => E_UNKNOWN_TYPE,
        ReflectError::UnknownEnumMember { .. } | ReflectError::TypeMismatch { .. } => E_INVALID_VALUE,
    };
    Issue::error(code, err.to_string()).with_file(file)
}

/// Errors that prevent project loading entirely
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Project directory not found: {0}")]
    ProjectNotFound(String),

    #[error("assay.config.json not found: {0}")]
    ConfigNotFound(String),

    #[error("Failed to parse assay.config.json: {}", .0.message)]
    ConfigParseError(Box<Issue>),

    #[error("I/O error reading {0}: {1}")]
    IoError(String, std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_minimal_project(dir: &Path) {
        std::fs::write(dir.join(CONFIG_FILE), r#"{ "name": "Shooter" }"#).unwrap();
    }

    fn write_types(dir: &Path) {
        std::fs::write(
            dir.join("core.types.json"),
            r#"{
                "classes": [{
                    "name": "Hero",
                    "package": "/Game/Heroes",
                    "properties": [
                        { "name": "Weapon", "kind": "object", "class": "Weapon", "meta": { "Validate": "" } },
                        { "name": "Role", "kind": "enum", "enum": "ERole" }
                    ]
                }],
                "enums": [{ "name": "ERole", "members": { "None": 0, "Tank": 1 } }]
            }"#,
        )
        .unwrap();
    }

    #[test]
    fn test_load_minimal_project() {
        let tmp = TempDir::new().unwrap();
        create_minimal_project(tmp.path());

        let (project, report) = load_project(tmp.path()).unwrap();
        assert!(report.ok);
        assert_eq!(project.config.name, "Shooter");
        assert_eq!(project.content.object_count(), 0);
        assert!(project.assets.is_empty());
    }

    #[test]
    fn test_objects_decode_after_types_regardless_of_path_order() {
        let tmp = TempDir::new().unwrap();
        create_minimal_project(tmp.path());
        // "a" sorts before "core", but types still load first
        std::fs::write(
            tmp.path().join("a.objects.json"),
            r#"{ "objects": [{ "path": "/Game/Heroes/Tank.Tank", "class": "Hero", "fields": { "Role": "Tank" } }] }"#,
        )
        .unwrap();
        write_types(tmp.path());

        let (project, report) = load_project(tmp.path()).unwrap();
        assert!(report.ok, "{:?}", report.issues);
        let hero = project.content.object("/Game/Heroes/Tank.Tank").unwrap();
        assert_eq!(hero.field("Role"), Some(&Value::Enum(1)));
        assert_eq!(hero.field("Weapon"), Some(&Value::Object(None)));
    }

    #[test]
    fn test_load_project_accumulates_errors() {
        let tmp = TempDir::new().unwrap();
        create_minimal_project(tmp.path());
        write_types(tmp.path());

        let dir = tmp.path().join("content");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("good.objects.json"),
            r#"{ "objects": [{ "path": "/Game/A.A", "class": "Hero" }] }"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("typed.objects.json"),
            r#"{ "objects": [{ "path": "/Game/B.B", "class": "Villain" }] }"#,
        )
        .unwrap();
        std::fs::write(dir.join("bad.assets.json"), "{ invalid json }").unwrap();

        let (project, report) = load_project(tmp.path()).unwrap();
        assert!(!report.ok);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues.iter().any(|i| i.code == E_PARSE_ERROR));
        assert!(report.issues.iter().any(|i| i.code == E_UNKNOWN_TYPE));
        assert_eq!(project.content.object_count(), 1);
    }

    #[test]
    fn test_unknown_validate_key_warns() {
        let tmp = TempDir::new().unwrap();
        create_minimal_project(tmp.path());
        std::fs::write(
            tmp.path().join("core.types.json"),
            r#"{ "classes": [{ "name": "Hero", "properties": [
                { "name": "Weapon", "kind": "object", "class": "Weapon", "meta": { "ValidateRecursiv": "" } }
            ] }] }"#,
        )
        .unwrap();

        let (_, report) = load_project(tmp.path()).unwrap();
        assert!(report.ok);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].code, W_UNKNOWN_META);
    }

    #[test]
    fn test_duplicate_asset_records() {
        let tmp = TempDir::new().unwrap();
        create_minimal_project(tmp.path());
        std::fs::write(
            tmp.path().join("registry.assets.json"),
            r#"{ "assets": [
                { "package": "/Game/A", "class": "Blueprint" },
                { "package": "/Game/A", "class": "Blueprint" }
            ] }"#,
        )
        .unwrap();

        let (project, report) = load_project(tmp.path()).unwrap();
        assert_eq!(project.assets.len(), 1);
        assert_eq!(report.count(crate::report::Severity::Error), 1);
        assert_eq!(report.issues[0].code, E_DUPLICATE_DEFINITION);
    }

    #[test]
    fn test_load_nonexistent_directory() {
        let err = load_project(Path::new("/nonexistent/path")).unwrap_err();
        assert!(matches!(err, LoadError::ProjectNotFound(_)));
    }

    #[test]
    fn test_load_missing_config() {
        let tmp = TempDir::new().unwrap();
        let err = load_project(tmp.path()).unwrap_err();
        assert!(matches!(err, LoadError::ConfigNotFound(_)));
    }

    #[test]
    fn test_load_invalid_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "not json").unwrap();
        let err = load_project(tmp.path()).unwrap_err();
        assert!(matches!(err, LoadError::ConfigParseError(_)));
    }
}
