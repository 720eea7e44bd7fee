//! The activation code value type.
//!
//! Codes have the shape `CODE-<GRADE>-<DIGEST10>`:
//!
//! - `<GRADE>` is the grade upper-cased verbatim. It is not validated and may
//!   be empty or contain hyphens and other punctuation.
//! - `<DIGEST10>` is the first 10 hex characters (5 bytes) of the SHA-256
//!   digest of `"{device_id}:{grade}"`, upper-cased.
//!
//! # Example
//!
//! ```rust,ignore
//! use gradekey::activation_code::ActivationCode;
//!
//! let code = ActivationCode::parse("CODE-BASIC-081DF5E684").unwrap();
//! assert_eq!(code.grade(), "BASIC");
//! assert_eq!(code.digest(), "081DF5E684");
//! ```

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::DIGEST_SIZE;

/// Literal prefix of every activation code.
pub const CODE_PREFIX: &str = "CODE";

/// Number of hex characters kept from the digest.
pub const DIGEST_HEX_LEN: usize = 10;

lazy_static! {
    /// Greedy grade group so the split happens on the last hyphen.
    /// `(?s)` because a grade is opaque and may contain newlines.
    static ref CODE_PATTERN: Regex =
        Regex::new(r"(?s)^CODE-(.*)-([0-9A-F]{10})$").expect("activation code pattern is valid");
}

/// A derived activation code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivationCode {
    value: String,
    grade_len: usize,
}

impl ActivationCode {
    /// Build a code from a raw grade and a full SHA-256 digest.
    pub(crate) fn from_digest(grade: &str, digest: &[u8; DIGEST_SIZE]) -> Self {
        let grade = grade.to_uppercase();
        let hex = hex::encode(digest);
        let digest10 = hex[..DIGEST_HEX_LEN].to_uppercase();

        Self {
            grade_len: grade.len(),
            value: format!("{CODE_PREFIX}-{grade}-{digest10}"),
        }
    }

    /// Parse a string that is expected to be an activation code.
    ///
    /// Returns `None` if the string does not have the code shape. Only the
    /// shape is checked; nothing is known about who issued it.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = CODE_PATTERN.captures(s)?;
        let grade = caps.get(1)?;
        Some(Self {
            value: s.to_string(),
            grade_len: grade.as_str().len(),
        })
    }

    /// Whether `s` has the activation code shape.
    pub fn is_well_formed(s: &str) -> bool {
        CODE_PATTERN.is_match(s)
    }

    /// The upper-cased grade portion.
    pub fn grade(&self) -> &str {
        let start = CODE_PREFIX.len() + 1;
        &self.value[start..start + self.grade_len]
    }

    /// The 10 character uppercase hex digest portion.
    pub fn digest(&self) -> &str {
        &self.value[self.value.len() - DIGEST_HEX_LEN..]
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for ActivationCode {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl PartialEq<str> for ActivationCode {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for ActivationCode {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl Serialize for ActivationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for ActivationCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ActivationCode::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("not an activation code: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_with_leading_bytes(bytes: &[u8]) -> [u8; DIGEST_SIZE] {
        let mut d = [0u8; DIGEST_SIZE];
        d[..bytes.len()].copy_from_slice(bytes);
        d
    }

    #[test]
    fn small_bytes_are_zero_padded() {
        let d = digest_with_leading_bytes(&[0x0a, 0x00, 0x01, 0xff, 0x10]);
        let code = ActivationCode::from_digest("gold", &d);
        assert_eq!(code.as_str(), "CODE-GOLD-0A0001FF10");
    }

    #[test]
    fn grade_is_uppercased_verbatim() {
        let d = digest_with_leading_bytes(&[0xab; 5]);
        let code = ActivationCode::from_digest(" pro plus ", &d);
        assert_eq!(code.grade(), " PRO PLUS ");
        assert_eq!(code.digest(), "ABABABABAB");
    }

    #[test]
    fn empty_grade_yields_double_hyphen() {
        let d = digest_with_leading_bytes(&[0x12, 0x34, 0x56, 0x78, 0x9a]);
        let code = ActivationCode::from_digest("", &d);
        assert_eq!(code.as_str(), "CODE--123456789A");
        assert_eq!(code.grade(), "");
    }

    #[test]
    fn parse_splits_on_last_hyphen() {
        let code = ActivationCode::parse("CODE-TIER-2-0123456789").unwrap();
        assert_eq!(code.grade(), "TIER-2");
        assert_eq!(code.digest(), "0123456789");
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        assert!(ActivationCode::parse("CODE-GOLD-0123456789A").is_none());
        assert!(ActivationCode::parse("CODE-GOLD-012345678").is_none());
        assert!(ActivationCode::parse("CODE-GOLD-abcdef0123").is_none());
        assert!(ActivationCode::parse("KEY-GOLD-0123456789").is_none());
        assert!(ActivationCode::parse("CODE-NOSUBTLECRYPTO").is_none());
    }

    #[test]
    fn parses_grade_containing_newline() {
        let code = ActivationCode::parse("CODE-GOLD\nPLUS-D74B23F965").unwrap();
        assert_eq!(code.grade(), "GOLD\nPLUS");
        assert_eq!(code.digest(), "D74B23F965");
        assert!(!ActivationCode::is_well_formed("CODE-GOLD-D74B23F965\n"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let code = ActivationCode::parse("CODE-BASIC-081DF5E684").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"CODE-BASIC-081DF5E684\"");

        let back: ActivationCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<ActivationCode>("\"nope\"").is_err());
    }
}
