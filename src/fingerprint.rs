//! Change-detection fingerprints for source documents.
//!
//! A fingerprint is a 64-bit xxh3 digest over the document's source path and
//! its bytes. Covering the path keeps two files with identical content from
//! sharing a cache entry, since the entry embeds a URL derived from the path.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use xxhash_rust::xxh3::Xxh3;

/// Order-sensitive change signature of one source document.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Wrap a raw digest value.
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Fingerprint a document by its path and full contents.
    pub fn of_content(source_path: &str, content: &[u8]) -> Self {
        let mut hasher = Xxh3::new();
        hasher.update(source_path.as_bytes());
        // Separator so ("ab", "c") and ("a", "bc") differ
        hasher.update(&[0]);
        hasher.update(content);
        Self(hasher.digest())
    }

    /// Returns the fingerprint as a 16-character lowercase hex string.
    pub fn as_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 16 {
            return Err(ParseFingerprintError::InvalidLength(s.len()));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ParseFingerprintError::InvalidHex)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for fingerprint parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFingerprintError {
    #[error("invalid hexadecimal characters in fingerprint string")]
    InvalidHex,
    #[error("invalid fingerprint length: expected 16 hex characters, got {0}")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[test]
    fn test_content_fingerprint_is_stable() {
        let a = Fingerprint::of_content("intro.md", b"# Intro");
        let b = Fingerprint::of_content("intro.md", b"# Intro");
        check!(a == b);
    }

    #[rstest]
    #[case("intro.md", b"# Intro!".as_slice())]
    #[case("other.md", b"# Intro".as_slice())]
    #[case("intro.m", b"d# Intro".as_slice())]
    fn test_content_fingerprint_changes(#[case] path: &str, #[case] content: &[u8]) {
        let base = Fingerprint::of_content("intro.md", b"# Intro");
        check!(Fingerprint::of_content(path, content) != base);
    }

    #[rstest]
    #[case("123456789abcdef0", 0x1234_5678_9abc_def0)]
    #[case("0000000000000000", 0)]
    #[case("ffffffffffffffff", u64::MAX)]
    fn test_hex_round_trip(#[case] hex: &str, #[case] value: u64) {
        let fingerprint: Fingerprint = hex.parse().unwrap();
        check!(fingerprint == Fingerprint::from_u64(value));
        check!(fingerprint.to_string() == hex);
    }

    #[rstest]
    #[case("zzzzzzzzzzzzzzzz", ParseFingerprintError::InvalidHex)]
    #[case("abc", ParseFingerprintError::InvalidLength(3))]
    #[case("", ParseFingerprintError::InvalidLength(0))]
    fn test_invalid_fingerprint(#[case] input: &str, #[case] expected: ParseFingerprintError) {
        let_assert!(Err(err) = input.parse::<Fingerprint>());
        check!(err == expected);
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let fingerprint = Fingerprint::from_u64(255);
        let json = serde_json::to_string(&fingerprint).unwrap();
        check!(json == "\"00000000000000ff\"");
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        check!(back == fingerprint);
    }
}
