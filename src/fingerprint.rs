//! Corpus and registry fingerprints.
//!
//! A fingerprint is a 64-bit xxh3 digest. Two scans computed under the same
//! corpus fingerprint and registry fingerprint are interchangeable, which is what
//! lets the scan cache hand one result to both the summary and detail entry points.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use xxhash_rust::xxh3::Xxh3;

/// A 64-bit digest of some piece of tracker state.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Wrap a raw digest value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw digest value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the digest as a 16-character lowercase hexadecimal string
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

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 16 {
            return Err(ParseFingerprintError::InvalidLength(s.len()));
        }
        u64::from_str_radix(s, 16)
            .map(Fingerprint)
            .map_err(|_| ParseFingerprintError::InvalidHex)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
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

/// Incremental fingerprint builder.
///
/// Every field is length-prefixed so that `("ab", "c")` and `("a", "bc")` digest
/// differently.
pub struct FingerprintBuilder {
    hasher: Xxh3,
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self {
            hasher: Xxh3::new(),
        }
    }

    /// Feed a byte field.
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
        self
    }

    /// Feed a string field.
    pub fn str(&mut self, value: &str) -> &mut Self {
        self.bytes(value.as_bytes())
    }

    /// Feed an integer field.
    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn finish(&self) -> Fingerprint {
        Fingerprint(self.hasher.digest())
    }
}
