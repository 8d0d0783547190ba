//! API key generation and hashing.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

/// API key prefix.
pub const KEY_PREFIX: &str = "mfs_";
/// Length of random part of the key.
const KEY_RANDOM_LENGTH: usize = 32;

/// Generate a new random API key.
///
/// Returns the full key (to be handed to the user once) and its hash for the
/// records file.
pub fn generate_key() -> (String, String) {
    let random_part: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(KEY_RANDOM_LENGTH)
        .map(char::from)
        .collect();

    let full_key = format!("{}{}", KEY_PREFIX, random_part);
    let key_hash = hash_key(&full_key);

    (full_key, key_hash)
}

/// Hash an API key using SHA-256.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Resolve a lifetime such as "90d", "12w", "6m" or "1y" to an expiry time.
///
/// A bare number counts days. Returns `None` for anything unparseable.
pub fn expires_after(lifetime: &str) -> Option<DateTime<Utc>> {
    let lifetime = lifetime.trim().to_lowercase();
    let (count, unit_days) = match lifetime.char_indices().last()? {
        (i, 'd') => (&lifetime[..i], 1),
        (i, 'w') => (&lifetime[..i], 7),
        (i, 'm') => (&lifetime[..i], 30),
        (i, 'y') => (&lifetime[..i], 365),
        _ => (lifetime.as_str(), 1),
    };

    let days = count.parse::<i64>().ok()?.checked_mul(unit_days)?;
    if days <= 0 {
        return None;
    }
    Duration::try_days(days).map(|d| Utc::now() + d)
}
