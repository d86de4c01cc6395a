//! Hash-based ID generation for boards, sprints and tickets.
//!
//! Every id is `{prefix}-{hash}` where `hash` is 128 bits of a SHA256 digest
//! rendered as 25 base36 characters. The digest covers a per-generator random
//! salt, the entity kind, a monotonic sequence number, the current time and a
//! retry nonce, so two imports of the same document never share an id.
//!
//! # Example
//!
//! ```
//! use trackline::id_generation::{IdGenerator, IdGeneratorConfig, IdKind, IdSource};
//!
//! let mut generator = IdGenerator::new(IdGeneratorConfig {
//!     prefix: "trk".to_string(),
//! });
//! generator.register_id("trk-existing".to_string());
//!
//! let id = generator.next_id(IdKind::Ticket).unwrap();
//! assert!(trackline::id_generation::validate_id(&id, "trk"));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

/// Number of base36 digits needed to hold 128 bits
pub const HASH_LENGTH: usize = 25;

/// Default prefix for generated ids
pub const DEFAULT_PREFIX: &str = "trk";

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried
        attempts: u32,
    },
}

/// Kind of entity an id is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// A board
    Board,
    /// A sprint
    Sprint,
    /// A ticket
    Ticket,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board => write!(f, "board"),
            Self::Sprint => write!(f, "sprint"),
            Self::Ticket => write!(f, "ticket"),
        }
    }
}

/// A source of globally unique, opaque identifiers.
///
/// The import reconciler draws every id it emits from an `IdSource`, which lets
/// callers register the ids already present in their store.
pub trait IdSource {
    /// Produce a fresh id for an entity of the given kind.
    ///
    /// # Errors
    ///
    /// Returns an error if no unused id could be produced.
    fn next_id(&mut self, kind: IdKind) -> Result<String, IdGenerationError>;
}

/// Configuration for ID generation
#[derive(Debug, Clone)]
pub struct IdGeneratorConfig {
    /// Prefix for all IDs (e.g., "trk")
    pub prefix: String,
}

impl Default for IdGeneratorConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Hash-based ID generator with collision detection
///
/// `existing_ids` grows with every generated or registered id. Create one
/// generator per import and register the store's ids up front.
pub struct IdGenerator {
    config: IdGeneratorConfig,
    salt: [u8; 16],
    sequence: u64,
    existing_ids: HashSet<String>,
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("prefix", &self.config.prefix)
            .field("sequence", &self.sequence)
            .field("known_ids", &self.existing_ids.len())
            .finish_non_exhaustive()
    }
}

impl IdGenerator {
    /// Create a new ID generator with the given configuration
    pub fn new(config: IdGeneratorConfig) -> Self {
        Self {
            config,
            salt: rand::random(),
            sequence: 0,
            existing_ids: HashSet::new(),
        }
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: String) {
        self.existing_ids.insert(id);
    }

    /// Register many existing IDs at once
    pub fn register_ids<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.existing_ids.extend(ids);
    }

    /// Number of ids this generator will refuse to produce
    pub fn known_ids(&self) -> usize {
        self.existing_ids.len()
    }

    /// The configured prefix
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Generate a new unique ID
    ///
    /// # Errors
    ///
    /// Returns an error if unable to generate a unique ID after trying all nonces.
    pub fn generate(&mut self, kind: IdKind) -> Result<String, IdGenerationError> {
        self.sequence += 1;

        for nonce in 0..MAX_NONCE {
            let id = self.generate_hash_id(kind, nonce);

            if !self.existing_ids.contains(&id) {
                if nonce > 0 {
                    debug!(nonce, %kind, "Generated unique ID after {} collision retries", nonce);
                }
                self.existing_ids.insert(id.clone());
                return Ok(id);
            }
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }

    /// Generate a hash-based ID with the given parameters
    fn generate_hash_id(&self, kind: IdKind, nonce: u32) -> String {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(self.salt);
        hasher.update(kind.to_string().as_bytes());
        hasher.update(self.sequence.to_le_bytes());
        hasher.update(timestamp.to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        let hash_bytes = hasher.finalize();

        let mut head = [0u8; 16];
        head.copy_from_slice(&hash_bytes[..16]);
        let hash_str = encode_base36(u128::from_be_bytes(head), HASH_LENGTH);

        format!("{}-{}", self.config.prefix, hash_str)
    }
}

impl IdSource for IdGenerator {
    fn next_id(&mut self, kind: IdKind) -> Result<String, IdGenerationError> {
        self.generate(kind)
    }
}

/// Encode a 128-bit value as a zero-padded base36 string of `length` digits.
///
/// Digits beyond `length` are dropped, so `length` should be at least
/// [`HASH_LENGTH`] for a full 128-bit value.
fn encode_base36(value: u128, length: usize) -> String {
    let mut digits = Vec::with_capacity(length);
    let mut n = value;

    while digits.len() < length {
        // Remainder is always < 36
        #[allow(clippy::cast_possible_truncation)]
        let remainder = (n % 36) as usize;
        digits.push(char::from(BASE36_CHARS[remainder]));
        n /= 36;
    }

    digits.iter().rev().collect()
}

/// Validate ID format: `{prefix}-{25 base36 chars}`
pub fn validate_id(id: &str, prefix: &str) -> bool {
    let Some(hash) = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    hash.len() == HASH_LENGTH
        && hash
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(prefix: &str) -> IdGenerator {
        IdGenerator::new(IdGeneratorConfig {
            prefix: prefix.to_string(),
        })
    }

    #[test]
    fn test_base36_encoding() {
        assert_eq!(encode_base36(0, 4), "0000");
        assert_eq!(encode_base36(35, 2), "0z");
        assert_eq!(encode_base36(36, 2), "10");
    }

    #[test]
    fn test_base36_max_value_fits() {
        let encoded = encode_base36(u128::MAX, HASH_LENGTH);
        assert_eq!(encoded.len(), HASH_LENGTH);
        assert_ne!(encoded.as_bytes()[0], b'0');
    }

    #[test]
    fn test_base36_zero_length_is_empty() {
        assert_eq!(encode_base36(1, 0), "");
    }

    #[test]
    fn test_id_generation() {
        let mut generator = generator("trk");
        let id = generator.generate(IdKind::Board).unwrap();

        assert!(id.starts_with("trk-"));
        assert!(validate_id(&id, "trk"));
    }

    #[test]
    fn test_ids_are_unique_within_generator() {
        let mut generator = generator("trk");
        let ids: HashSet<String> = (0..5_000)
            .map(|_| generator.generate(IdKind::Ticket).unwrap())
            .collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn test_ids_differ_across_generators() {
        let mut first = generator("trk");
        let mut second = generator("trk");
        let a: HashSet<String> = (0..100)
            .map(|_| first.generate(IdKind::Sprint).unwrap())
            .collect();
        let b: HashSet<String> = (0..100)
            .map(|_| second.generate(IdKind::Sprint).unwrap())
            .collect();
        assert!(a.is_disjoint(&b));
    }

    #[test]
    fn test_register_existing_ids() {
        let mut generator = generator("trk");
        generator.register_ids(["trk-a".to_string(), "trk-b".to_string()]);
        assert_eq!(generator.known_ids(), 2);

        let new_id = generator.next_id(IdKind::Ticket).unwrap();
        assert_ne!(new_id, "trk-a");
        assert_ne!(new_id, "trk-b");
        assert_eq!(generator.known_ids(), 3);
    }

    #[test]
    fn test_id_validation() {
        let hash = "0".repeat(HASH_LENGTH);
        assert!(validate_id(&format!("trk-{hash}"), "trk"));

        assert!(!validate_id("invalid", "trk"));
        assert!(!validate_id("trk-", "trk"));
        assert!(!validate_id("trk-abc", "trk")); // Too short
        assert!(!validate_id(&format!("trk-{hash}0"), "trk")); // Too long
        assert!(!validate_id(&format!("trk-{}", "A".repeat(HASH_LENGTH)), "trk")); // Uppercase
        assert!(!validate_id(&format!("web-{hash}"), "trk")); // Wrong prefix
    }
}
