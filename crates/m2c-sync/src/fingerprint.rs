//! Content fingerprints.
//!
//! A fingerprint is `sha-` followed by the first 8 lowercase hex characters
//! of the SHA-256 digest of the document body. The same string is stored as
//! a page label to remember what was last published.

use std::fmt;

use sha2::{Digest, Sha256};

/// Prefix reserved for fingerprint labels.
pub const FINGERPRINT_PREFIX: &str = "sha-";

/// Number of hex digest characters kept.
const FINGERPRINT_HEX_LEN: usize = 8;

/// Fingerprint of a document body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of the exact body bytes.
    #[must_use]
    pub fn of(body: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(body);
        let digest = hex::encode(hasher.finalize());
        Self(format!(
            "{FINGERPRINT_PREFIX}{}",
            &digest[..FINGERPRINT_HEX_LEN]
        ))
    }

    /// Label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a label carries a fingerprint.
#[must_use]
pub fn is_fingerprint_label(label: &str) -> bool {
    label.starts_with(FINGERPRINT_PREFIX)
}
