//! Core type aliases and constants for the ewasm host interface.
//!
//! These types are shared by the host API traits and the sandbox. Their
//! widths are fixed by the ewasm EEI and must not change.

/// 20-byte account address.
pub type Address = [u8; 20];

/// 32-byte word used for storage keys, storage values and log topics.
pub type Word256 = [u8; 32];

/// 32-byte hash (block hashes, creation nonces).
pub type Hash = [u8; 32];

/// Block height (monotonically increasing).
pub type BlockHeight = u64;

/// Length of an address on the wire.
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a storage word or log topic on the wire.
pub const WORD256_LENGTH: usize = 32;

/// Length of a hash.
pub const HASH_LENGTH: usize = 32;

/// Length of a call value or balance on the wire (unsigned 128-bit, little-endian).
pub const VALUE_BYTE_SIZE: usize = 16;

/// Maximum number of topics a single `log` call may carry.
pub const MAX_LOG_TOPICS: usize = 4;

/// The zero address. Returned as the block coinbase.
pub const ZERO_ADDRESS: Address = [0u8; ADDRESS_LENGTH];

/// The zero word. Value of any storage slot that was never written.
pub const ZERO_WORD: Word256 = [0u8; WORD256_LENGTH];

/// A zero-valued hash.
pub const ZERO_HASH: Hash = [0u8; HASH_LENGTH];

/// Render an address as `0x`-prefixed lowercase hex for display.
pub fn address_to_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}
