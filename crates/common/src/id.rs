//! ID and token generation utilities.

use rand::RngCore;
use rand::rngs::OsRng;
use ulid::Ulid;
use uuid::Uuid;

/// Number of random bytes in a channel token.
///
/// The channel token is the only thing gating which tenant a public
/// subscribe link attributes to, so it must not be guessable.
const CHANNEL_TOKEN_BYTES: usize = 24;

/// ID generator for entities and tokens.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based entity ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a per-recipient tracking token.
    ///
    /// Tracking tokens carry no privilege, only click attribution, so the
    /// ULID's timestamp + 80 random bits are enough to keep them unique and
    /// non-sequential.
    #[must_use]
    pub fn generate_tracking_token(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an opaque channel token for a tenant.
    ///
    /// Uses the OS CSPRNG; 24 bytes of entropy, hex encoded. Uniqueness is
    /// enforced at the persistence layer with a retry on collision.
    #[must_use]
    pub fn generate_channel_token(&self) -> String {
        let mut bytes = [0u8; CHANNEL_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Generate a bearer authentication token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // UUID v4 for tokens (no time component)
        Uuid::new_v4().simple().to_string()
    }
}
