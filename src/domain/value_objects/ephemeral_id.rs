//! Ephemeral deployment identifier
//!
//! Review deployments are keyed by an externally supplied identifier
//! (usually a branch or pull-request reference). Everything derived from it
//! must be a lowercase DNS-safe token: `[a-z0-9-]+`, no leading, trailing or
//! doubled hyphens.

use std::fmt;

use serde::Serialize;

use crate::error::{StackplanError, StackplanResult};
use crate::domain::value_objects::ContentHash;

/// Maximum token length; keeps derived names within common 63-char DNS labels
pub const MAX_TOKEN_LEN: usize = 32;

/// Sanitized ephemeral deployment identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EphemeralId {
    token: String,
}

impl EphemeralId {
    /// Sanitize a raw identifier into a DNS-safe token
    pub fn parse(raw: &str) -> StackplanResult<Self> {
        let token = sanitize(raw);
        if token.is_empty() {
            return Err(StackplanError::InvalidEphemeralId {
                raw: raw.to_string(),
            });
        }
        Ok(Self { token })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Environment label used for stack names: `pr-<token>`
    pub fn environment_name(&self) -> String {
        format!("pr-{}", self.token)
    }

    /// Unique service name for the review deployment
    pub fn service_name(&self, project: &str) -> String {
        format!("{}-pr-{}", sanitize(project), self.token)
    }

    /// Deterministic listener-rule priority in `1..=49_999`
    ///
    /// Priority 50_000 is reserved for the standing catch-all rule.
    pub fn rule_priority(&self) -> u32 {
        let hash = ContentHash::from_content(&self.token);
        let prefix = u32::from_str_radix(hash.short(8), 16).unwrap_or(0);
        1 + prefix % 49_999
    }
}

impl fmt::Display for EphemeralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// Hex digits appended to truncated tokens
const TRUNCATION_HASH_LEN: usize = 6;

/// Lowercase, map anything outside `[a-z0-9]` to `-`, collapse runs and trim.
///
/// Tokens longer than [`MAX_TOKEN_LEN`] keep a prefix followed by a short
/// digest of the full token, so identifiers sharing a long prefix stay apart.
pub fn sanitize(raw: &str) -> String {
    let mut token = String::with_capacity(raw.len());
    let mut last_hyphen = true;
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            token.push(c);
            last_hyphen = false;
        } else if !last_hyphen {
            token.push('-');
            last_hyphen = true;
        }
    }
    while token.ends_with('-') {
        token.pop();
    }
    if token.len() <= MAX_TOKEN_LEN {
        return token;
    }

    let digest = ContentHash::from_content(&token);
    token.truncate(MAX_TOKEN_LEN - TRUNCATION_HASH_LEN - 1);
    while token.ends_with('-') {
        token.pop();
    }
    token.push('-');
    token.push_str(digest.short(TRUNCATION_HASH_LEN));
    token
}
