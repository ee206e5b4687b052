use thiserror::Error;

/// Errors raised while validating a task catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog declares no sections")]
    NoSections,

    #[error("section '{0}' declares no tasks")]
    EmptySection(String),

    #[error("duplicate section id '{0}'")]
    DuplicateSection(String),

    #[error("duplicate task id '{task}' in section '{section}'")]
    DuplicateTask { section: String, task: String },

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("unknown task '{task}' in section '{section}'")]
    UnknownTask { section: String, task: String },
}

/// Errors from a key-value byte store (used by the persistence port in launchpad-core).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("quota exceeded writing '{key}' ({bytes} bytes)")]
    QuotaExceeded { key: String, bytes: usize },

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}
