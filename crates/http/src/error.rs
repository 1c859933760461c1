use thiserror::Error;

/// Raised when an accessor needs a transport metadata variable that the host
/// did not supply.
///
/// Its absence points at a malformed or non-HTTP execution context, so unlike
/// parameter lookups it is surfaced to the caller instead of being defaulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing request meta variable: {key}")]
pub struct MissingMetadataError {
    key: String,
}

impl MissingMetadataError {
    pub fn new<S: ToString>(key: S) -> Self {
        Self { key: key.to_string() }
    }

    /// The metadata key that was looked up.
    pub fn key(&self) -> &str {
        &self.key
    }
}
