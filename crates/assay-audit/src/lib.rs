pub mod error;
pub mod registry;
pub mod report;
pub mod restrictions;
pub mod tree;

pub use error::AuditError;
pub use registry::{AssetData, AssetRegistry, AssetTable};
pub use report::{AuditFailure, AuditReport, AuditSummary};
pub use restrictions::{SizeLimit, SizeRestrictions};
pub use tree::{AssetDependencyTree, AssetTreeNode, AuditResult};
