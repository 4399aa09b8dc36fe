use thiserror::Error;

/// Caller-facing failures that abort the pipeline instead of being folded
/// into the report's error sets.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// The byte buffer cannot be decoded under any supported encoding.
    #[error("unable to decode file: {0}")]
    Encoding(String),
    /// The requested profile code is not in the configured catalog.
    #[error("unknown profile code '{0}'")]
    UnknownProfile(String),
    /// Autofix input could not be parsed; no partial output is produced.
    #[error("file is not repairable: {0}")]
    NotRepairable(String),
}
