//! Hashing used to derive contract addresses.

use crate::types::{Address, Hash, ADDRESS_LENGTH, HASH_LENGTH};

/// Derive the address of a contract created by `creator`.
///
/// The address is the first 20 bytes of `BLAKE3(creator ++ nonce)`.
pub fn new_contract_address(creator: &Address, nonce: &[u8]) -> Address {
    let mut hasher = blake3::Hasher::new();
    hasher.update(creator);
    hasher.update(nonce);
    let digest = hasher.finalize();
    let mut address = [0u8; ADDRESS_LENGTH];
    address.copy_from_slice(&digest.as_bytes()[..ADDRESS_LENGTH]);
    address
}

/// Build the creation nonce: the 32-byte per-transaction seed followed by
/// the big-endian sequence counter.
pub fn creation_nonce(seed: &Hash, sequence: u64) -> [u8; HASH_LENGTH + 8] {
    let mut nonce = [0u8; HASH_LENGTH + 8];
    nonce[..HASH_LENGTH].copy_from_slice(seed);
    nonce[HASH_LENGTH..].copy_from_slice(&sequence.to_be_bytes());
    nonce
}
