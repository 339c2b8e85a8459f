//! Hard memory and disk size limits for assets, checked against the
//! aggregate size of an asset and everything it hard-depends on.

use std::collections::{HashMap, HashSet};

use log::debug;

use assay_model::report::{E_AUDIT_FAILED, E_DISK_SIZE_EXCEEDED, E_MEMORY_SIZE_EXCEEDED, I_SIZE_EXCEPTION};
use assay_model::{Issue, SizeRestrictionSettings, TypeCategory, TypeRegistry, ValidationReport};

use crate::registry::{AssetRegistry, AssetTable};
use crate::tree::AssetDependencyTree;

/// Name the restriction issues are reported under.
pub const SIZE_RESTRICTIONS_VALIDATOR: &str = "AssetValidator_AssetSizeRestrictions";

const MEGABYTE: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimit {
    pub max_memory_mb: u32,
    pub max_disk_mb: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SizeRestrictions {
    assets: HashMap<String, SizeLimit>,
    asset_types: HashMap<String, SizeLimit>,
    exceptions: HashSet<String>,
}

impl SizeRestrictions {
    pub fn from_settings(settings: &SizeRestrictionSettings) -> Self {
        let assets = settings
            .assets
            .iter()
            .map(|r| {
                let limit = SizeLimit {
                    max_memory_mb: r.max_memory_size_mb,
                    max_disk_mb: r.max_disk_size_mb,
                };
                (r.asset.clone(), limit)
            })
            .collect();
        let asset_types = settings
            .asset_types
            .iter()
            .map(|r| {
                let limit = SizeLimit {
                    max_memory_mb: r.max_memory_size_mb,
                    max_disk_mb: r.max_disk_size_mb,
                };
                (r.class.clone(), limit)
            })
            .collect();
        Self {
            assets,
            asset_types,
            exceptions: settings.exceptions.iter().cloned().collect(),
        }
    }

    /// Restrictions only run once a class limit is configured.
    pub fn is_enabled(&self) -> bool {
        !self.asset_types.is_empty()
    }

    pub fn is_exception(&self, package: &str) -> bool {
        self.exceptions.contains(package)
    }

    /// Limit of a specific asset, or else of its class or nearest restricted ancestor.
    pub fn limit_for(&self, types: &TypeRegistry, package: &str, class: &str) -> Option<SizeLimit> {
        if let Some(limit) = self.assets.get(package) {
            return Some(*limit);
        }
        if let Some(limit) = self.asset_types.get(class) {
            return Some(*limit);
        }
        types
            .chain(TypeCategory::Class, class)
            .into_iter()
            .find_map(|def| self.asset_types.get(&def.name).copied())
    }

    /// Check one asset. Assets without a limit yield no issues.
    pub fn check_asset(&self, registry: &dyn AssetRegistry, types: &TypeRegistry, package: &str) -> Vec<Issue> {
        let Some(asset) = registry.resolve(package) else {
            debug!("'{package}' is not in the asset registry; no size limits apply");
            return Vec::new();
        };
        let Some(limit) = self.limit_for(types, package, &asset.class) else {
            return Vec::new();
        };

        if self.is_exception(package) {
            let message = format!("{SIZE_RESTRICTIONS_VALIDATOR}: Asset is listed as an exception and will be skipped.");
            return vec![Issue::info(I_SIZE_EXCEPTION, message).with_file(package)];
        }

        let result = match AssetDependencyTree::new().audit_asset(registry, package) {
            Ok(result) => result,
            Err(e) => {
                debug!("size audit of '{package}' failed: {e}");
                return vec![Issue::error(E_AUDIT_FAILED, "Failed to audit asset. Unknown error.").with_file(package)];
            }
        };

        let memory = result.total_memory_size_bytes as f64 / MEGABYTE;
        let disk = result.total_disk_size_bytes as f64 / MEGABYTE;
        let mut issues = Vec::new();

        if memory > f64::from(limit.max_memory_mb) {
            let message = format!(
                "{SIZE_RESTRICTIONS_VALIDATOR}: Asset memory size exceeds a hard set limit: {memory:.2}MB > {}MB. \
                 To fix the issue, remove hard dependencies to other blueprints (most likely caused by blueprint casts), \
                 store asset resources by soft pointers  or consult a programming team.",
                limit.max_memory_mb
            );
            issues.push(Issue::error(E_MEMORY_SIZE_EXCEEDED, message).with_file(package));
        }
        if disk > f64::from(limit.max_disk_mb) {
            let message = format!(
                "{SIZE_RESTRICTIONS_VALIDATOR}: Asset disk size exceeds a hard set limit: {disk:.2}MB > {}MB. \
                 To fix the issue, remove hard dependencies to other assets (most likely caused by blueprint casts), \
                 store asset resources by soft pointers or consult a programming team.",
                limit.max_disk_mb
            );
            issues.push(Issue::error(E_DISK_SIZE_EXCEEDED, message).with_file(package));
        }
        issues
    }

    /// Check every asset in the table, in table order.
    pub fn check_assets(&self, table: &AssetTable, types: &TypeRegistry) -> ValidationReport {
        let mut report = ValidationReport::success();
        if !self.is_enabled() {
            debug!("size restrictions are disabled: no asset type limits configured");
            return report;
        }
        for package in table.packages() {
            for issue in self.check_asset(table, types, package) {
                report.push(issue);
            }
        }
        report
    }
}
