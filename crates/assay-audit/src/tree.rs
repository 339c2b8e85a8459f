//! Hard-dependency tree of asset packages and the per-asset audit walk.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::registry::{is_script_package, AssetData, AssetRegistry};

/// One asset package and the packages it hard-depends on.
///
/// Nodes are shared between every parent that depends on them.
#[derive(Debug)]
pub struct AssetTreeNode {
    pub asset: AssetData,
    pub children: Vec<Rc<AssetTreeNode>>,
}

impl AssetTreeNode {
    pub fn package(&self) -> &str {
        &self.asset.package
    }

    /// A zero size means the registry has no size data for the package.
    pub fn is_valid(&self) -> bool {
        !self.asset.package.is_empty() && self.asset.disk_size > 0 && self.asset.memory_size > 0
    }
}

/// Aggregate statistics of one audited asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub package: String,
    pub class: String,
    /// Own size plus every unique dependency's, counted once each
    pub total_disk_size_bytes: u64,
    pub total_memory_size_bytes: u64,
    /// Dependency edges along every path from the root
    pub total_dependency_count: u64,
    pub max_dependency_breadth: usize,
    /// Longest root-to-leaf path, counted in nodes
    pub dependency_depth: usize,
}

impl AuditResult {
    /// Walk the tree under `root`.
    pub fn from_node(root: &AssetTreeNode) -> Self {
        let mut walk = Walk {
            result: AuditResult {
                package: root.asset.package.clone(),
                class: root.asset.class.clone(),
                ..AuditResult::default()
            },
            visited: HashMap::new(),
        };
        let (edges, depth) = walk.visit(root);
        walk.result.total_dependency_count = edges;
        walk.result.dependency_depth = depth;
        walk.result
    }
}

/// Depth-first accumulation. Sizes and breadth are taken once per unique
/// node; edge counts and depth are memoized per node so shared sub-trees
/// contribute along every path without being walked again.
struct Walk<'n> {
    result: AuditResult,
    visited: HashMap<&'n str, (u64, usize)>,
}

impl<'n> Walk<'n> {
    fn visit(&mut self, node: &'n AssetTreeNode) -> (u64, usize) {
        if let Some(&stats) = self.visited.get(node.package()) {
            return stats;
        }

        let result = &mut self.result;
        result.total_disk_size_bytes = result.total_disk_size_bytes.saturating_add(node.asset.disk_size);
        result.total_memory_size_bytes = result.total_memory_size_bytes.saturating_add(node.asset.memory_size);
        result.max_dependency_breadth = result.max_dependency_breadth.max(node.children.len());

        let mut edges = node.children.len() as u64;
        let mut depth = 0;
        for child in &node.children {
            let (child_edges, child_depth) = self.visit(child);
            edges = edges.saturating_add(child_edges);
            depth = depth.max(child_depth);
        }

        let stats = (edges, depth + 1);
        self.visited.insert(node.package(), stats);
        stats
    }
}

/// Memoized dependency tree. Audits of different roots on one tree reuse
/// the sub-trees built so far.
///
/// Only complete sub-trees are memoized. A dependency that closes a cycle is
/// dropped from the node that would close it; that node and every node above
/// it on the path depend on which root the walk started from, so they live
/// only for the current build.
#[derive(Debug, Default)]
pub struct AssetDependencyTree {
    nodes: HashMap<String, Rc<AssetTreeNode>>,
}

/// Per-root build state.
#[derive(Default)]
struct Build {
    /// Packages on the current root-to-node path
    path: HashSet<String>,
    /// Nodes with a cycle edge cut somewhere below them
    pruned: HashMap<String, Rc<AssetTreeNode>>,
}

impl AssetDependencyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build (or reuse) the tree rooted at `package` and audit it.
    ///
    /// Fails only when the root itself cannot be resolved or has no size
    /// data; missing dependencies are dropped.
    pub fn audit_asset(&mut self, registry: &dyn AssetRegistry, package: &str) -> Result<AuditResult, AuditError> {
        let root = self.node_for(registry, package)?;
        if !root.is_valid() {
            return Err(AuditError::InvalidRoot(package.to_string()));
        }
        Ok(AuditResult::from_node(&root))
    }

    /// The tree node for `package`, built on first use.
    pub fn node_for(&mut self, registry: &dyn AssetRegistry, package: &str) -> Result<Rc<AssetTreeNode>, AuditError> {
        if let Some(node) = self.nodes.get(package) {
            return Ok(Rc::clone(node));
        }
        let asset = registry
            .resolve(package)
            .ok_or_else(|| AuditError::RootNotFound(package.to_string()))?;
        let (node, _) = self.build_node(registry, asset, &mut Build::default());
        Ok(node)
    }

    /// Memoized node of `package`. Nodes cut by a cycle are never memoized.
    pub fn node(&self, package: &str) -> Option<&Rc<AssetTreeNode>> {
        self.nodes.get(package)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    /// Returns the node and whether a cycle edge was cut in its sub-tree.
    fn build_node(
        &mut self,
        registry: &dyn AssetRegistry,
        asset: AssetData,
        build: &mut Build,
    ) -> (Rc<AssetTreeNode>, bool) {
        if let Some(node) = self.nodes.get(&asset.package) {
            return (Rc::clone(node), false);
        }
        build.path.insert(asset.package.clone());

        let mut children = Vec::new();
        let mut pruned = false;
        for dependency in registry.hard_dependencies(&asset.package) {
            if is_script_package(&dependency) {
                continue;
            }
            if build.path.contains(&dependency) {
                debug!("'{}' -> '{dependency}' closes a dependency cycle", asset.package);
                pruned = true;
                continue;
            }
            let (child, child_pruned) = if let Some(node) = self.nodes.get(&dependency) {
                (Rc::clone(node), false)
            } else if let Some(node) = build.pruned.get(&dependency) {
                (Rc::clone(node), true)
            } else {
                match registry.resolve(&dependency) {
                    Some(data) => self.build_node(registry, data, build),
                    None => {
                        warn!(
                            "dropping dependency '{dependency}' of '{}': not in the asset registry",
                            asset.package
                        );
                        continue;
                    }
                }
            };
            pruned |= child_pruned;
            children.push(child);
        }

        build.path.remove(&asset.package);
        let node = Rc::new(AssetTreeNode { asset, children });
        let package = node.asset.package.clone();
        if pruned {
            build.pruned.insert(package, Rc::clone(&node));
        } else {
            self.nodes.insert(package, Rc::clone(&node));
        }
        (node, pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AssetTable;
    use assay_model::AssetRecord;
    use pretty_assertions::assert_eq;

    fn asset(package: &str, size: u64, dependencies: &[&str]) -> AssetRecord {
        dependencies.iter().fold(
            AssetRecord::new(package, "Blueprint").with_sizes(size, size * 2),
            |record, dependency| record.with_dependency(*dependency),
        )
    }

    #[test]
    fn test_lone_root() {
        let registry = AssetTable::from_records([asset("/Game/A", 10, &[])]);
        let result = AssetDependencyTree::new().audit_asset(&registry, "/Game/A").unwrap();
        assert_eq!(result.total_disk_size_bytes, 10);
        assert_eq!(result.total_memory_size_bytes, 20);
        assert_eq!(result.total_dependency_count, 0);
        assert_eq!(result.max_dependency_breadth, 0);
        assert_eq!(result.dependency_depth, 1);
    }

    #[test]
    fn test_cycle_terminates() {
        let registry = AssetTable::from_records([asset("/Game/A", 1, &["/Game/B"]), asset("/Game/B", 2, &["/Game/A"])]);
        let result = AssetDependencyTree::new().audit_asset(&registry, "/Game/A").unwrap();
        assert_eq!(result.total_dependency_count, 1);
        assert_eq!(result.total_disk_size_bytes, 3);
        assert_eq!(result.dependency_depth, 2);
    }

    #[test]
    fn test_diamond_counts_edges_but_sizes_once() {
        let registry = AssetTable::from_records([
            asset("/Game/A", 1, &["/Game/B", "/Game/C"]),
            asset("/Game/B", 10, &["/Game/D"]),
            asset("/Game/C", 100, &["/Game/D"]),
            asset("/Game/D", 1000, &[]),
        ]);
        let mut tree = AssetDependencyTree::new();
        let result = tree.audit_asset(&registry, "/Game/A").unwrap();
        assert_eq!(result.total_disk_size_bytes, 1111);
        assert_eq!(result.total_memory_size_bytes, 2222);
        assert_eq!(result.total_dependency_count, 4);
        assert_eq!(result.max_dependency_breadth, 2);
        assert_eq!(result.dependency_depth, 3);

        let b = tree.node("/Game/B").unwrap();
        let c = tree.node("/Game/C").unwrap();
        assert!(Rc::ptr_eq(&b.children[0], &c.children[0]));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_script_and_missing_dependencies_are_dropped() {
        let registry = AssetTable::from_records([asset(
            "/Game/A",
            5,
            &["/Script/Engine", "/Game/Missing", "/Game/B"],
        ), asset("/Game/B", 5, &[])]);
        let result = AssetDependencyTree::new().audit_asset(&registry, "/Game/A").unwrap();
        assert_eq!(result.total_dependency_count, 1);
        assert_eq!(result.total_disk_size_bytes, 10);
    }

    #[test]
    fn test_root_failures() {
        let registry = AssetTable::from_records([asset("/Game/Empty", 0, &[])]);
        let mut tree = AssetDependencyTree::new();
        assert_eq!(
            tree.audit_asset(&registry, "/Game/Missing"),
            Err(AuditError::RootNotFound("/Game/Missing".to_string()))
        );
        assert_eq!(
            tree.audit_asset(&registry, "/Game/Empty"),
            Err(AuditError::InvalidRoot("/Game/Empty".to_string()))
        );
    }

    #[test]
    fn test_cycle_members_audit_the_same_on_a_shared_tree() {
        let registry = AssetTable::from_records([asset("/Game/A", 1, &["/Game/B"]), asset("/Game/B", 10, &["/Game/A"])]);
        let mut tree = AssetDependencyTree::new();
        let a = tree.audit_asset(&registry, "/Game/A").unwrap();
        let b = tree.audit_asset(&registry, "/Game/B").unwrap();

        assert_eq!(a, AssetDependencyTree::new().audit_asset(&registry, "/Game/A").unwrap());
        assert_eq!(b, AssetDependencyTree::new().audit_asset(&registry, "/Game/B").unwrap());
        assert_eq!(b.total_disk_size_bytes, 11);
        assert_eq!(b.total_dependency_count, 1);
        assert_eq!(b.dependency_depth, 2);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_complete_subtree_below_a_cycle_is_memoized() {
        let registry = AssetTable::from_records([
            asset("/Game/A", 1, &["/Game/B"]),
            asset("/Game/B", 2, &["/Game/A", "/Game/C"]),
            asset("/Game/C", 4, &[]),
        ]);
        let mut tree = AssetDependencyTree::new();
        let result = tree.audit_asset(&registry, "/Game/A").unwrap();
        assert_eq!(result.total_disk_size_bytes, 7);
        assert!(tree.node("/Game/C").is_some());
        assert!(tree.node("/Game/A").is_none());
        assert!(tree.node("/Game/B").is_none());
    }

    #[test]
    fn test_reuse_and_reset() {
        let registry = AssetTable::from_records([asset("/Game/A", 1, &["/Game/B"]), asset("/Game/B", 2, &[])]);
        let mut tree = AssetDependencyTree::new();
        let first = tree.audit_asset(&registry, "/Game/A").unwrap();
        let b = tree.audit_asset(&registry, "/Game/B").unwrap();
        assert_eq!(b.total_disk_size_bytes, 2);
        assert_eq!(tree.audit_asset(&registry, "/Game/A").unwrap(), first);

        tree.reset();
        assert!(tree.is_empty());
    }
}
