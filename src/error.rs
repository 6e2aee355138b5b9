//! Error taxonomy for a sync run
//!
//! Fatal variants abort the batch; `Registration` and `Relation` are folded
//! into the per-resource result by the orchestrator.

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid or missing configuration, detected before any network call
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Cloud resource enumeration failed
    #[error("Resource discovery failed: {0}")]
    Discovery(String),

    /// Token exchange failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Search against the catalog failed (transport or non-2xx)
    #[error("Catalog query failed: {0}")]
    CatalogQuery(String),

    #[error("Application '{0}' not found in LeanIX")]
    ApplicationNotFound(String),

    /// IT Component creation failed for one resource
    #[error("Failed to create IT Component: {0}")]
    Registration(String),

    /// Relation creation failed; the IT Component itself still exists
    #[error("Failed to create relation: {0}")]
    Relation(String),
}

impl SyncError {
    /// Whether this error aborts the whole batch
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Registration(_) | Self::Relation(_))
    }
}
