use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::registry::AssetRegistry;
use crate::tree::{AssetDependencyTree, AuditResult};

const KILOBYTE: f64 = 1024.0;
const GIGABYTE: f64 = 1024.0 * 1024.0 * 1024.0;

fn exceeds_gigabyte(bytes: u64) -> bool {
    bytes as f64 / GIGABYTE > 1.0
}

/// An asset that could not be audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFailure {
    pub package: String,
    pub reason: String,
}

/// Audit results of a batch, smallest asset first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub results: Vec<AuditResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<AuditFailure>,
}

impl AuditReport {
    /// Audit every package on one shared dependency tree.
    pub fn audit_assets<'p>(registry: &dyn AssetRegistry, packages: impl IntoIterator<Item = &'p str>) -> Self {
        let mut tree = AssetDependencyTree::new();
        let mut report = Self::default();
        for package in packages {
            match tree.audit_asset(registry, package) {
                Ok(result) => report.results.push(result),
                Err(e) => report.push_failure(package, e),
            }
        }
        report.sort();
        info!(
            "audited {} assets ({} failed, {} tree nodes)",
            report.results.len(),
            report.failures.len(),
            tree.len()
        );
        report
    }

    fn push_failure(&mut self, package: &str, error: AuditError) {
        warn!("failed to audit '{package}': {error}");
        self.failures.push(AuditFailure {
            package: package.to_string(),
            reason: error.to_string(),
        });
    }

    /// Ascending by memory size, then disk size, then dependency count.
    pub fn sort(&mut self) {
        self.results.sort_by(|a, b| {
            a.total_memory_size_bytes
                .cmp(&b.total_memory_size_bytes)
                .then(a.total_disk_size_bytes.cmp(&b.total_disk_size_bytes))
                .then(a.total_dependency_count.cmp(&b.total_dependency_count))
        });
    }

    /// The `max_count` largest results, still in ascending order.
    pub fn largest(&self, max_count: Option<usize>) -> &[AuditResult] {
        let count = max_count.unwrap_or(self.results.len()).min(self.results.len());
        &self.results[self.results.len() - count..]
    }

    /// Medians and outlier counts; `None` when nothing was audited.
    pub fn summary(&self) -> Option<AuditSummary> {
        if self.results.is_empty() {
            return None;
        }
        let median = &self.results[self.results.len() / 2];
        Some(AuditSummary {
            processed: self.results.len(),
            median_dependency_count: median.total_dependency_count,
            median_memory_kb: median.total_memory_size_bytes as f64 / KILOBYTE,
            median_disk_kb: median.total_disk_size_bytes as f64 / KILOBYTE,
            median_depth: median.dependency_depth,
            median_breadth: median.max_dependency_breadth,
            over_gigabyte_memory: self
                .results
                .iter()
                .filter(|r| exceeds_gigabyte(r.total_memory_size_bytes))
                .count(),
            over_gigabyte_disk: self
                .results
                .iter()
                .filter(|r| exceeds_gigabyte(r.total_disk_size_bytes))
                .count(),
        })
    }
}

/// Batch statistics, each median taken from the same middle result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub processed: usize,
    pub median_dependency_count: u64,
    pub median_memory_kb: f64,
    pub median_disk_kb: f64,
    pub median_depth: usize,
    pub median_breadth: usize,
    pub over_gigabyte_memory: usize,
    pub over_gigabyte_disk: usize,
}

impl fmt::Display for AuditSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed {} assets.", self.processed)?;
        writeln!(f, "Median Dependency Count: {}", self.median_dependency_count)?;
        writeln!(f, "Median Memory Size: {:.2}KB", self.median_memory_kb)?;
        writeln!(f, "Median Disk Size: {:.2}KB", self.median_disk_kb)?;
        writeln!(f, "Median Depth: {}", self.median_depth)?;
        writeln!(f, "Median Breadth: {}", self.median_breadth)?;
        writeln!(f, "Num assets > 1 GB in memory size: {}", self.over_gigabyte_memory)?;
        write!(f, "Num assets > 1 GB in disk size: {}", self.over_gigabyte_disk)
    }
}
