use hex;
use sha2::{Digest, Sha256};

use crate::identity::IdentityHints;
use crate::models::EnrichedTransaction;

/// Input fingerprints and cache-entry integrity for the score cache.
///
/// Scoring is a pure function of its inputs, so a SHA-256 digest of
/// (user, transactions, consent, identity hints) keys the idempotence
/// cache: identical inputs within the TTL return the identical record.
/// Entries carry their own checksum and are validated on retrieval;
/// corrupted entries are dropped and the score recomputed.

/// Deterministic digest of one scoring request's effective inputs.
///
/// Callers pass the transactions that actually enter the aggregates
/// (malformed ones already rejected), so requests that differ only in
/// discarded input share a cache entry.
pub fn scoring_fingerprint(
    user_id: &str,
    transactions: &[&EnrichedTransaction],
    include_alternative_data: bool,
    identity: &IdentityHints,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update([include_alternative_data as u8]);
    // Struct field order makes serde_json output deterministic here.
    if let Ok(tx_json) = serde_json::to_vec(transactions) {
        hasher.update(&tx_json);
    }
    if let Ok(id_json) = serde_json::to_vec(identity) {
        hasher.update(&id_json);
    }
    hex::encode(hasher.finalize())
}

/// Wrapper for cached data with integrity validation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidatedCacheEntry {
    /// The actual cached data (JSON string).
    pub data: String,
    /// SHA-256 checksum of the data (hex encoded).
    pub checksum: String,
}

impl ValidatedCacheEntry {
    /// Creates a new validated cache entry with computed checksum.
    pub fn new(data: String) -> Self {
        let checksum = Self::compute_checksum(&data);
        Self { data, checksum }
    }

    fn compute_checksum(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Validates the integrity of the cached data.
    pub fn is_valid(&self) -> bool {
        let computed = Self::compute_checksum(&self.data);
        computed == self.checksum
    }

    /// Serializes the entry for storage in cache.
    pub fn serialize(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Deserializes and validates a cache entry.
    ///
    /// Returns Some(data) if valid, None if corrupted or invalid JSON.
    pub fn deserialize_and_validate(serialized: &str) -> Option<String> {
        let entry: ValidatedCacheEntry = serde_json::from_str(serialized).ok()?;

        if entry.is_valid() {
            Some(entry.data)
        } else {
            tracing::warn!(
                "Cache validation failed: checksum mismatch. Expected: {}, Data length: {}",
                entry.checksum,
                entry.data.len()
            );
            None
        }
    }
}
