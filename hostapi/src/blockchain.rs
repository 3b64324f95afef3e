//! Blockchain metadata provider.

use std::collections::BTreeMap;

use ewasm_primitives::{BlockHeight, ErrorCode, Hash};

use crate::error::HostError;

/// Read-only view of chain metadata available to contracts.
pub trait Blockchain: Send + Sync {
    /// Height of the last committed block.
    fn last_block_height(&self) -> BlockHeight;

    /// Time of the last committed block, in unix seconds.
    fn last_block_time(&self) -> u64;

    /// Hash of a historical block.
    fn block_hash(&self, height: BlockHeight) -> Result<Hash, HostError>;
}

/// Fixed chain metadata, for tests and offline execution.
#[derive(Debug, Clone, Default)]
pub struct StaticBlockchain {
    height: BlockHeight,
    time: u64,
    hashes: BTreeMap<BlockHeight, Hash>,
}

impl StaticBlockchain {
    pub fn new(height: BlockHeight, time: u64) -> Self {
        Self {
            height,
            time,
            hashes: BTreeMap::new(),
        }
    }

    /// Record the hash of a historical block.
    pub fn with_block_hash(mut self, height: BlockHeight, hash: Hash) -> Self {
        self.hashes.insert(height, hash);
        self
    }
}

impl Blockchain for StaticBlockchain {
    fn last_block_height(&self) -> BlockHeight {
        self.height
    }

    fn last_block_time(&self) -> u64 {
        self.time
    }

    fn block_hash(&self, height: BlockHeight) -> Result<Hash, HostError> {
        self.hashes.get(&height).copied().ok_or_else(|| {
            HostError::new(ErrorCode::Internal, format!("no hash recorded for block {}", height))
        })
    }
}
