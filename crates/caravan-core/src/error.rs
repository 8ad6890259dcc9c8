//! Error types for caravan-core

use crate::store::StoreError;

/// Result type for caravan-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or running a migration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A tribe's migration action failed; carries the cause's description.
    #[error("tribe migration failed: {0}")]
    TribeMigrationFailed(String),

    /// A target, declared or read back from the checkpoint store, is
    /// not SemVer compliant.
    #[error(transparent)]
    Target(#[from] caravan_target::Error),

    /// The checkpoint store failed to read or persist a value.
    #[error("checkpoint store failed: {0}")]
    Store(StoreError),
}
