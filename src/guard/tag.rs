//! One-way identifier tags.
//!
//! Sensitive identifiers (email, phone) are hashed before they can appear in
//! any store key. The tag is a truncated SHA-256 prefix: deterministic, not
//! reversible, and short enough that collisions are acceptable for
//! operational visibility.

use sha2::{Digest, Sha256};

/// 12 hex chars, roughly 48 bits of the digest.
const TAG_HEX_LEN: usize = 12;

/// The audit path hashes only the first characters of the identifier,
/// trading identifiability for privacy.
const AUDIT_PREFIX_CHARS: usize = 8;

/// Normalize an identifier so case/whitespace variants collapse to one tag.
fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn tag_of(normalized: &str) -> String {
    let digest = Sha256::digest(normalized.as_bytes());
    let mut tag = hex::encode(digest);
    tag.truncate(TAG_HEX_LEN);
    tag
}

/// Tag used by the lockout and emergency paths.
#[must_use]
pub fn identifier_tag(raw: &str) -> String {
    tag_of(&normalize(raw))
}

/// Tag used by the audit recorder; the identifier is truncated before
/// hashing so audit counters are even less linkable to a full identity.
#[must_use]
pub fn audit_identifier_tag(raw: &str) -> String {
    let normalized = normalize(raw);
    let prefix: String = normalized.chars().take(AUDIT_PREFIX_CHARS).collect();
    tag_of(&prefix)
}
