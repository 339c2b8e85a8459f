use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use assay_model::AssetRecord;

/// Engine code packages carry no content worth auditing.
pub const SCRIPT_PACKAGE_PREFIX: &str = "/Script/";

pub fn is_script_package(package: &str) -> bool {
    package.starts_with(SCRIPT_PACKAGE_PREFIX)
}

/// Resolved asset package with its own (non-aggregate) sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetData {
    pub package: String,
    pub class: String,
    pub disk_size: u64,
    pub memory_size: u64,
}

/// Source of asset metadata and hard package dependencies.
pub trait AssetRegistry {
    /// Hard package dependencies of `package`, in declaration order.
    fn hard_dependencies(&self, package: &str) -> Vec<String>;

    fn resolve(&self, package: &str) -> Option<AssetData>;
}

/// In-memory registry built from loaded asset records.
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    records: IndexMap<String, AssetRecord>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later records for the same package replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = AssetRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.insert(record);
        }
        table
    }

    pub fn insert(&mut self, record: AssetRecord) {
        if let Some(previous) = self.records.insert(record.package.clone(), record) {
            warn!("asset '{}' is listed more than once, keeping the last record", previous.package);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every listed package, in insertion order.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn record(&self, package: &str) -> Option<&AssetRecord> {
        self.records.get(package)
    }
}

impl AssetRegistry for AssetTable {
    fn hard_dependencies(&self, package: &str) -> Vec<String> {
        self.records
            .get(package)
            .map(|record| record.dependencies.clone())
            .unwrap_or_default()
    }

    fn resolve(&self, package: &str) -> Option<AssetData> {
        self.records.get(package).map(|record| AssetData {
            package: record.package.clone(),
            class: record.class.clone(),
            disk_size: record.disk_size,
            memory_size: record.memory_size,
        })
    }
}
