//! Operator-facing generation flow.
//!
//! Wraps the pure [`CodeDeriver`] with the checks an operator tool needs:
//! non-empty inputs, optional grade catalogue membership, status messages
//! and event logging.

use crate::activation_code::ActivationCode;
use crate::clipboard::CopyOutcome;
use crate::config::GradekeyConfig;
use crate::deriver::CodeDeriver;
use crate::digest::provider_by_name;
use crate::errors::{DerivationError, GenerateError, GradekeyResult};
use crate::grades::GradeCatalogue;
use crate::logging::{log_code_event, CodeEvent};

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// A one-line message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }

    /// Status for a generation result.
    pub fn for_generation(result: &Result<ActivationCode, GenerateError>) -> Self {
        match result {
            Ok(_) => Status::success("Code generated successfully!"),
            Err(GenerateError::Derivation(DerivationError::PrimitiveUnavailable)) => Status::error(
                "Cannot generate code: SHA-256 is not available in this environment.",
            ),
            Err(GenerateError::Derivation(DerivationError::DigestFailure(_))) => {
                Status::error("Cannot generate code: hashing failed, please try again.")
            }
            Err(other) => Status::error(other.to_string()),
        }
    }

    /// Status for a clipboard copy.
    pub fn for_copy(outcome: &CopyOutcome) -> Self {
        match outcome {
            CopyOutcome::Primary => Status::success("Code copied to clipboard!"),
            CopyOutcome::Fallback => Status::success("Code copied (fallback method)!"),
            CopyOutcome::Failed(_) => Status::error("Could not copy code. Please copy manually."),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of checking a presented code against a fresh derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch { expected: ActivationCode },
}

/// Validates operator input and derives codes.
#[derive(Debug, Clone)]
pub struct Generator {
    deriver: CodeDeriver,
    catalogue: GradeCatalogue,
    require_known_grade: bool,
}

impl Generator {
    pub fn new(deriver: CodeDeriver) -> Self {
        Self {
            deriver,
            catalogue: GradeCatalogue::default(),
            require_known_grade: false,
        }
    }

    /// Only accept grades present in `catalogue` (an empty catalogue accepts all).
    pub fn with_catalogue(mut self, catalogue: GradeCatalogue) -> Self {
        self.catalogue = catalogue;
        self.require_known_grade = true;
        self
    }

    /// Build a generator from configuration.
    ///
    /// The hash provider is resolved here, once, so an unsupported
    /// environment shows up as `PrimitiveUnavailable` on the first call.
    pub fn from_config(config: &GradekeyConfig) -> GradekeyResult<Self> {
        let provider = provider_by_name(&config.generator.hash_provider)?;
        let generator = Self::new(CodeDeriver::new(provider));

        if config.generator.require_known_grade {
            Ok(generator.with_catalogue(GradeCatalogue::new(config.grades.clone())))
        } else {
            Ok(generator)
        }
    }

    pub fn deriver(&self) -> &CodeDeriver {
        &self.deriver
    }

    /// Validate inputs and derive the activation code.
    ///
    /// The device id is trimmed; the grade is passed through untouched.
    pub async fn generate(
        &self,
        device_id: &str,
        grade: &str,
    ) -> Result<ActivationCode, GenerateError> {
        let device_id = device_id.trim();
        let result = self.checked_derive(device_id, grade).await;
        log_outcome(device_id, grade, &result);
        result
    }

    /// Re-derive the code for `(device_id, grade)` and compare it to `presented`.
    ///
    /// The comparison is case-sensitive; codes are always upper-case.
    pub async fn verify(
        &self,
        device_id: &str,
        grade: &str,
        presented: &str,
    ) -> Result<Verification, GenerateError> {
        let device_id = device_id.trim();
        let expected = self.checked_derive(device_id, grade).await;
        if expected.is_err() {
            log_outcome(device_id, grade, &expected);
        }
        let expected = expected?;

        if expected == presented.trim() {
            log_code_event(CodeEvent::Verified, device_id, Some(expected.as_str()));
            Ok(Verification::Match)
        } else {
            log_code_event(CodeEvent::VerifyMismatch, device_id, Some(presented));
            Ok(Verification::Mismatch { expected })
        }
    }

    async fn checked_derive(
        &self,
        device_id: &str,
        grade: &str,
    ) -> Result<ActivationCode, GenerateError> {
        if device_id.is_empty() {
            return Err(GenerateError::MissingDeviceId);
        }
        if grade.is_empty() {
            return Err(GenerateError::MissingGrade);
        }
        if self.require_known_grade && !self.catalogue.accepts(grade) {
            return Err(GenerateError::UnknownGrade(grade.to_string()));
        }

        Ok(self.deriver.derive(device_id, grade).await?)
    }
}

fn log_outcome(device_id: &str, grade: &str, result: &Result<ActivationCode, GenerateError>) {
    match result {
        Ok(code) => log_code_event(CodeEvent::Generated, device_id, Some(code.as_str())),
        Err(GenerateError::Derivation(DerivationError::PrimitiveUnavailable)) => {
            log_code_event(CodeEvent::PrimitiveUnavailable, device_id, Some(grade))
        }
        Err(GenerateError::Derivation(DerivationError::DigestFailure(reason))) => {
            tracing::error!(device_id = %device_id, grade = %grade, reason = %reason, "Hashing failed");
            log_code_event(CodeEvent::DigestFailed, device_id, Some(reason.as_str()))
        }
        Err(other) => {
            log_code_event(CodeEvent::Rejected, device_id, Some(other.to_string().as_str()))
        }
    }
}
