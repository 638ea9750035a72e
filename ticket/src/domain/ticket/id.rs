use chrono::DateTime;
use chrono::Utc;
use md5::Digest as Md5Digest;
use md5::Md5;
use sha1::Digest as Sha1Digest;
use sha1::Sha1;
use uuid::Uuid;

use crate::domain::ticket::models::ExpiryMode;
use crate::domain::ticket::models::TicketId;
use crate::domain::ticket::models::Username;

/// A single digest strategy: pure bytes-to-bytes, infallible.
type DigestFn = fn(&[u8]) -> Vec<u8>;

fn sha1_digest(data: &[u8]) -> Vec<u8> {
    Sha1::digest(data).to_vec()
}

fn md5_digest(data: &[u8]) -> Vec<u8> {
    Md5::digest(data).to_vec()
}

fn crc32_digest(data: &[u8]) -> Vec<u8> {
    crc32fast::hash(data).to_be_bytes().to_vec()
}

/// Derives collision-resistant ticket identifiers.
///
/// The canonical input mixes the expiry policy tag, the deadline (or the
/// current time when there is none), the owner, and a random UUID nonce,
/// so repeated calls with identical inputs yield distinct ids. Uniqueness,
/// not reproducibility, is the guarantee.
///
/// Digest preference order: SHA-1 (40 hex chars), then MD5 (32), then a
/// CRC32 checksum expanded to 4 bytes (8). The chain is fixed at
/// construction and generation never fails outward: an exhausted chain
/// still falls back to the checksum.
#[derive(Debug, Clone)]
pub struct TicketIdGenerator {
    chain: Vec<(&'static str, DigestFn)>,
}

impl TicketIdGenerator {
    /// Create a generator with the full digest preference chain.
    ///
    /// # Returns
    /// Generator preferring SHA-1, falling back to MD5, then CRC32
    pub fn new() -> Self {
        Self {
            chain: vec![
                ("sha1", sha1_digest as DigestFn),
                ("md5", md5_digest as DigestFn),
                ("crc32", crc32_digest as DigestFn),
            ],
        }
    }

    #[cfg(test)]
    fn with_chain(chain: Vec<(&'static str, DigestFn)>) -> Self {
        Self { chain }
    }

    /// Derive a fresh ticket identifier.
    ///
    /// # Arguments
    /// * `expiry` - Expiry policy, mixed into the canonical string
    /// * `deadline` - Expiry deadline; the current time is used when absent
    /// * `owner` - Ticket owner
    ///
    /// # Returns
    /// Lowercase hex TicketId from the first digest in the chain
    pub fn generate(
        &self,
        expiry: ExpiryMode,
        deadline: Option<DateTime<Utc>>,
        owner: &Username,
    ) -> TicketId {
        let nonce = Uuid::new_v4();
        let stamp = deadline.unwrap_or_else(Utc::now);
        let encoded = format!("{}{}{}{}", expiry, stamp.to_rfc3339(), owner, nonce);

        let (name, digest) = self
            .chain
            .first()
            .copied()
            .unwrap_or(("crc32", crc32_digest as DigestFn));
        tracing::trace!(algorithm = name, owner = %owner, "Deriving ticket id");

        TicketId::new(hex::encode(digest(encoded.as_bytes())))
    }
}

impl Default for TicketIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Username {
        Username::new("alice".to_string()).unwrap()
    }

    #[test]
    fn test_generates_forty_hex_chars_with_full_chain() {
        let generator = TicketIdGenerator::new();
        let id = generator.generate(ExpiryMode::AfterInactivity, Some(Utc::now()), &owner());

        assert_eq!(id.as_str().len(), 40);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id.as_str(), id.as_str().to_lowercase());
    }

    #[test]
    fn test_md5_fallback_yields_thirty_two_hex_chars() {
        let generator = TicketIdGenerator::with_chain(vec![("md5", md5_digest as DigestFn)]);
        let id = generator.generate(ExpiryMode::AfterFixedTime, Some(Utc::now()), &owner());

        assert_eq!(id.as_str().len(), 32);
    }

    #[test]
    fn test_crc32_fallback_yields_eight_hex_chars() {
        let generator = TicketIdGenerator::with_chain(vec![("crc32", crc32_digest as DigestFn)]);
        let id = generator.generate(ExpiryMode::DoNotExpire, None, &owner());

        assert_eq!(id.as_str().len(), 8);
    }

    #[test]
    fn test_exhausted_chain_still_yields_an_id() {
        let generator = TicketIdGenerator::with_chain(Vec::new());
        let id = generator.generate(ExpiryMode::DoNotExpire, None, &owner());

        assert_eq!(id.as_str().len(), 8);
    }

    #[test]
    fn test_same_inputs_yield_different_ids() {
        // Each call mixes a fresh nonce, so identical inputs must not
        // reproduce the same identifier.
        let generator = TicketIdGenerator::new();
        let deadline = Some(Utc::now());

        let first = generator.generate(ExpiryMode::AfterInactivity, deadline, &owner());
        let second = generator.generate(ExpiryMode::AfterInactivity, deadline, &owner());

        assert_ne!(first, second);
    }
}
