use serde::{Deserialize, Serialize};

/// On-disk metadata of one asset package, as listed in `*.assets.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub package: String,
    pub class: String,
    /// Bytes on disk
    #[serde(default)]
    pub disk_size: u64,
    /// Bytes once loaded
    #[serde(default)]
    pub memory_size: u64,
    /// Hard package dependencies, in load order
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl AssetRecord {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
            disk_size: 0,
            memory_size: 0,
            dependencies: Vec::new(),
        }
    }

    pub fn with_sizes(mut self, disk_size: u64, memory_size: u64) -> Self {
        self.disk_size = disk_size;
        self.memory_size = memory_size;
        self
    }

    pub fn with_dependency(mut self, package: impl Into<String>) -> Self {
        self.dependencies.push(package.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_record_json_format() {
        let json = serde_json::json!({
            "package": "/Game/Hero",
            "class": "Blueprint",
            "diskSize": 2048,
            "memorySize": 4096,
            "dependencies": ["/Game/Sword", "/Script/Engine"]
        });
        let record: AssetRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.disk_size, 2048);
        assert_eq!(record.dependencies.len(), 2);
    }
}
