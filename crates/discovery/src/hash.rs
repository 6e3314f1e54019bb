//! Hash functions used to place nodes and keys on the ring.

use sha2::{Digest, Sha256};

/// Maps a string onto the 32-bit ring.
///
/// Only uniform spread matters. Implementations need not agree with each
/// other, but one ring must use the same function for building and lookup.
pub trait HashFunction: Send + Sync {
    fn hash(&self, key: &str) -> u32;
}

/// First four bytes of a SHA-256 digest, read big-endian.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestHash;

impl HashFunction for DigestHash {
    fn hash(&self, key: &str) -> u32 {
        let digest = Sha256::digest(key.as_bytes());
        u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}
