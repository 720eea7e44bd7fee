//! SHA-256 hash providers.
//!
//! The derivation never probes the environment itself. A host picks a
//! [`HashProvider`] at startup and hands it to the deriver; a provider that
//! reports itself unavailable makes every derivation fail with
//! `PrimitiveUnavailable` before any hashing is attempted.
//!
//! All providers must produce byte-identical SHA-256 output. Swapping the
//! hash function would change every code ever issued.

use std::sync::Arc;

use ring::digest::{digest, SHA256};
use sha2::{Digest, Sha256};

use crate::errors::{DigestError, GradekeyError, GradekeyResult};

/// SHA-256 digest size in bytes.
pub const DIGEST_SIZE: usize = 32;

/// A source of SHA-256 digests.
pub trait HashProvider: Send + Sync {
    /// Short identifier used in config and logs.
    fn name(&self) -> &'static str;

    /// Whether the primitive can be used in the current environment.
    fn is_available(&self) -> bool;

    /// Compute the SHA-256 digest of `data`.
    fn sha256(&self, data: &[u8]) -> Result<[u8; DIGEST_SIZE], DigestError>;
}

/// RustCrypto `sha2` backed provider. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha2Provider;

impl HashProvider for Sha2Provider {
    fn name(&self) -> &'static str {
        "sha2"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn sha256(&self, data: &[u8]) -> Result<[u8; DIGEST_SIZE], DigestError> {
        Ok(Sha256::digest(data).into())
    }
}

/// `ring` backed provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct RingProvider;

impl HashProvider for RingProvider {
    fn name(&self) -> &'static str {
        "ring"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn sha256(&self, data: &[u8]) -> Result<[u8; DIGEST_SIZE], DigestError> {
        let hash = digest(&SHA256, data);
        let bytes = hash.as_ref();
        if bytes.len() != DIGEST_SIZE {
            return Err(DigestError::new(
                self.name(),
                format!("unexpected digest length {}", bytes.len()),
            ));
        }

        let mut out = [0u8; DIGEST_SIZE];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

/// Stand-in for a host that has no SHA-256 capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProvider;

impl HashProvider for UnavailableProvider {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn sha256(&self, _data: &[u8]) -> Result<[u8; DIGEST_SIZE], DigestError> {
        Err(DigestError::new(self.name(), "no SHA-256 primitive"))
    }
}

/// Names accepted by [`provider_by_name`].
pub const PROVIDER_NAMES: &[&str] = &["sha2", "ring", "none"];

/// Resolve a provider from its configured name.
pub fn provider_by_name(name: &str) -> GradekeyResult<Arc<dyn HashProvider>> {
    match name.to_lowercase().as_str() {
        "sha2" => Ok(Arc::new(Sha2Provider)),
        "ring" => Ok(Arc::new(RingProvider)),
        "none" => Ok(Arc::new(UnavailableProvider)),
        other => Err(GradekeyError::ConfigError(format!(
            "unknown hash provider '{other}', expected one of: {}",
            PROVIDER_NAMES.join(", ")
        ))),
    }
}

/// The provider used when nothing is configured.
pub fn default_provider() -> Arc<dyn HashProvider> {
    Arc::new(Sha2Provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha2_and_ring_agree() {
        let inputs: [&[u8]; 3] = [b"", b"TEST-DEVICE:basic", "gerät-7:gold".as_bytes()];
        for input in inputs {
            assert_eq!(
                Sha2Provider.sha256(input).unwrap(),
                RingProvider.sha256(input).unwrap()
            );
        }
    }

    #[test]
    fn sha2_matches_known_digest() {
        let hash = Sha2Provider.sha256(b"TEST-DEVICE:basic").unwrap();
        assert_eq!(
            hex::encode(hash),
            "081df5e6845fb72eba961fbf0af86e3c3ddbb7d768486634404f0b12f40dcc18"
        );
    }

    #[test]
    fn unavailable_provider_reports_absent() {
        assert!(!UnavailableProvider.is_available());
        assert!(UnavailableProvider.sha256(b"x").is_err());
    }

    #[test]
    fn resolves_providers_by_name() {
        assert_eq!(provider_by_name("sha2").unwrap().name(), "sha2");
        assert_eq!(provider_by_name("RING").unwrap().name(), "ring");
        assert!(!provider_by_name("none").unwrap().is_available());
        assert!(matches!(
            provider_by_name("md5"),
            Err(GradekeyError::ConfigError(_))
        ));
    }
}
