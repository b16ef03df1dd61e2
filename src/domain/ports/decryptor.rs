//! Decryptor port
//!
//! Turns an encrypted secret document into plaintext. Failures are
//! classified so the secrets resolver can tell an unavailable backend apart
//! from a broken document.

use std::path::Path;

pub trait Decryptor {
    /// Tool name for log messages
    fn name(&self) -> &str;

    /// Whether the decryption tool can be invoked at all
    fn is_available(&self) -> bool;

    /// Decrypt a document and return its plaintext
    fn decrypt(&self, path: &Path) -> Result<String, DecryptError>;
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecryptError {
    #[error("decryption tool unavailable: {0}")]
    Unavailable(String),

    #[error("key-management access denied: {0}")]
    KeyAccess(String),

    #[error("{0}")]
    Failed(String),
}

impl DecryptError {
    /// Failures the fallback chain absorbs instead of aborting
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DecryptError::Unavailable(_) | DecryptError::KeyAccess(_))
    }
}
