use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PoolChemError {
    #[error("{0}")]
    Validation(String),

    #[error("pool '{id}' not found. Refresh the pool list and try again")]
    PoolNotFound { id: String },

    #[error("store operation failed: {0}")]
    Store(String),

    #[error("failed to load pool document from {path}: {reason}")]
    DocumentLoad { path: PathBuf, reason: String },

    #[error("invalid pool document: {0}")]
    DocumentInvalid(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PoolChemError {
    /// Errors the user can act on directly. Everything else is reported as
    /// unexpected, with the raw message attached.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            PoolChemError::Validation(_)
                | PoolChemError::PoolNotFound { .. }
                | PoolChemError::Store(_)
        )
    }
}
