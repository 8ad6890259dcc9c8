/// Result type for caravan-target operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when validating or comparing targets
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A literal target's string is not a semantic version.
    #[error("tribe targets must be SemVer compliant, '{target}' is not: {source}")]
    InvalidTarget {
        target: String,
        source: semver::Error,
    },
}
