use thiserror::Error;

/// Why an asset could not be audited.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("asset '{0}' is not in the asset registry")]
    RootNotFound(String),

    #[error("asset '{0}' has no disk or memory size data")]
    InvalidRoot(String),
}
