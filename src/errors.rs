//! Error types for gradekey.
//!
//! Derivation failures are kept in their own small enum so callers of the
//! core never have to match on configuration or I/O variants.

use std::io;

/// Failures of the activation code derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    /// The SHA-256 primitive is not available in this environment.
    #[error("SHA-256 primitive is not available in this environment")]
    PrimitiveUnavailable,

    /// The digest computation failed after the primitive was confirmed available.
    #[error("digest computation failed: {0}")]
    DigestFailure(String),
}

impl DerivationError {
    /// Returns true if retrying the same call might succeed.
    ///
    /// A missing primitive only goes away by changing the environment.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DerivationError::DigestFailure(_))
    }
}

/// Error raised by a hash provider while computing a digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{provider}: {reason}")]
pub struct DigestError {
    pub provider: String,
    pub reason: String,
}

impl DigestError {
    pub fn new(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

impl From<DigestError> for DerivationError {
    fn from(err: DigestError) -> Self {
        DerivationError::DigestFailure(err.to_string())
    }
}

/// Failures of the operator generate flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("Please enter the Customer's Device ID.")]
    MissingDeviceId,

    #[error("Please select the Grade purchased.")]
    MissingGrade,

    #[error("Unknown grade '{0}'.")]
    UnknownGrade(String),

    #[error(transparent)]
    Derivation(#[from] DerivationError),
}

/// Failures of a clipboard writer.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// The strategy cannot be used in this environment.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// The strategy was usable but writing failed.
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

impl From<io::Error> for ClipboardError {
    fn from(err: io::Error) -> Self {
        ClipboardError::WriteFailed(err.to_string())
    }
}

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum GradekeyError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

pub type GradekeyResult<T> = Result<T, GradekeyError>;
