//! Deterministic activation code derivation.
//!
//! ```text
//! code = "CODE-" + upper(grade) + "-" + upper(hex(sha256(device_id + ":" + grade))[..10])
//! ```
//!
//! The derivation is pure: no salt, no clock, no logging. Identical inputs
//! always give identical codes, which is what lets operators re-issue a code
//! for a customer without any stored state.
//!
//! A `device_id` that contains `:` can collide with another split of the
//! same concatenated string (`("a:b", "c")` and `("a", "b:c")`). Escaping
//! would change every code already issued, so the separator stays as is.

use std::sync::Arc;

use crate::activation_code::ActivationCode;
use crate::digest::{default_provider, HashProvider};
use crate::errors::DerivationError;

/// Separator placed between the device id and the grade before hashing.
pub const INPUT_SEPARATOR: char = ':';

/// Derives activation codes with an injected hash provider.
#[derive(Clone)]
pub struct CodeDeriver {
    provider: Arc<dyn HashProvider>,
}

impl CodeDeriver {
    pub fn new(provider: Arc<dyn HashProvider>) -> Self {
        Self { provider }
    }

    /// Deriver backed by the default SHA-256 provider.
    pub fn sha256() -> Self {
        Self::new(default_provider())
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Derive the activation code for `(device_id, grade)`.
    ///
    /// Empty strings are accepted; rejecting them is the caller's job.
    ///
    /// # Errors
    ///
    /// - [`DerivationError::PrimitiveUnavailable`] if the provider reports the
    ///   primitive as absent. No hashing is attempted in that case.
    /// - [`DerivationError::DigestFailure`] if hashing itself fails.
    pub async fn derive(
        &self,
        device_id: &str,
        grade: &str,
    ) -> Result<ActivationCode, DerivationError> {
        if !self.provider.is_available() {
            return Err(DerivationError::PrimitiveUnavailable);
        }

        let input = derivation_input(device_id, grade);
        let provider = Arc::clone(&self.provider);

        let digest = tokio::task::spawn_blocking(move || provider.sha256(input.as_bytes()))
            .await
            .map_err(|e| DerivationError::DigestFailure(format!("hash task failed: {e}")))??;

        Ok(ActivationCode::from_digest(grade, &digest))
    }
}

impl Default for CodeDeriver {
    fn default() -> Self {
        Self::sha256()
    }
}

impl std::fmt::Debug for CodeDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeDeriver")
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// The exact string that gets hashed.
pub fn derivation_input(device_id: &str, grade: &str) -> String {
    format!("{device_id}{INPUT_SEPARATOR}{grade}")
}

/// Derive a code with the default provider.
pub async fn derive_code(device_id: &str, grade: &str) -> Result<ActivationCode, DerivationError> {
    CodeDeriver::sha256().derive(device_id, grade).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{RingProvider, UnavailableProvider, DIGEST_SIZE};
    use crate::errors::DigestError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts digest calls and can be told to fail or panic.
    struct ScriptedProvider {
        available: bool,
        mode: ScriptedMode,
        calls: AtomicUsize,
    }

    #[derive(Clone, Copy)]
    enum ScriptedMode {
        Fail,
        Panic,
    }

    impl ScriptedProvider {
        fn new(available: bool, mode: ScriptedMode) -> Arc<Self> {
            Arc::new(Self {
                available,
                mode,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl HashProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn sha256(&self, _data: &[u8]) -> Result<[u8; DIGEST_SIZE], DigestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                ScriptedMode::Fail => Err(DigestError::new("scripted", "internal fault")),
                ScriptedMode::Panic => panic!("scripted provider panicked"),
            }
        }
    }

    #[test]
    fn input_uses_colon_separator() {
        assert_eq!(derivation_input("dev123", "gold"), "dev123:gold");
        assert_eq!(derivation_input("", ""), ":");
    }

    #[tokio::test]
    async fn known_vector() {
        let code = derive_code("TEST-DEVICE", "basic").await.unwrap();
        assert_eq!(code.as_str(), "CODE-BASIC-081DF5E684");
    }

    #[tokio::test]
    async fn ring_provider_gives_same_code() {
        let deriver = CodeDeriver::new(Arc::new(RingProvider));
        let code = deriver.derive("TEST-DEVICE", "basic").await.unwrap();
        assert_eq!(code.as_str(), "CODE-BASIC-081DF5E684");
    }

    #[tokio::test]
    async fn unavailable_primitive_is_detected_before_hashing() {
        let provider = ScriptedProvider::new(false, ScriptedMode::Fail);
        let deriver = CodeDeriver::new(provider.clone());

        let err = deriver.derive("dev123", "gold").await.unwrap_err();
        assert_eq!(err, DerivationError::PrimitiveUnavailable);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let err = CodeDeriver::new(Arc::new(UnavailableProvider))
            .derive("dev123", "gold")
            .await
            .unwrap_err();
        assert_eq!(err, DerivationError::PrimitiveUnavailable);
    }

    #[tokio::test]
    async fn provider_error_is_digest_failure() {
        let provider = ScriptedProvider::new(true, ScriptedMode::Fail);
        let deriver = CodeDeriver::new(provider.clone());

        let err = deriver.derive("dev123", "gold").await.unwrap_err();
        assert!(matches!(err, DerivationError::DigestFailure(ref m) if m.contains("internal fault")));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_panic_is_digest_failure() {
        let deriver = CodeDeriver::new(ScriptedProvider::new(true, ScriptedMode::Panic));
        let err = deriver.derive("dev123", "gold").await.unwrap_err();
        assert!(matches!(err, DerivationError::DigestFailure(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn debug_shows_provider_name() {
        let deriver = CodeDeriver::default();
        assert_eq!(format!("{deriver:?}"), "CodeDeriver { provider: \"sha2\" }");
    }
}
