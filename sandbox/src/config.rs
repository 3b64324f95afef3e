//! Sandbox configuration.

use ewasm_primitives::{Hash, ZERO_HASH};
use serde::{Deserialize, Serialize};

use crate::error::SandboxError;

/// Largest page count a 32-bit linear memory can address.
const MAX_WASM_PAGES: u32 = 65_536;

/// Configuration for the contract host.
///
/// Controls interpreter limits, the entry point and which import
/// namespaces are available to contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Maximum linear memory pages (1 page = 64 KiB).
    /// Default: 256 pages = 16 MiB.
    pub max_memory_pages: u32,

    /// Wasmtime fuel per invocation (instruction metering).
    /// Nested invocations receive their own allowance.
    pub fuel_limit: u64,

    /// Name of the exported `() -> ()` function run on every call.
    pub entry_point: String,

    /// How many blocks back `getBlockHash` may look.
    pub max_block_lookback: u64,

    /// Whether the `debug` import namespace resolves.
    pub enable_debug_imports: bool,

    /// How deep `call*` and `create` may nest. The outermost invocation
    /// is depth 1.
    pub max_call_depth: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_memory_pages: 256,       // 16 MiB
            fuel_limit: 100_000_000,
            entry_point: "main".into(),
            max_block_lookback: 256,
            enable_debug_imports: true,
            max_call_depth: 64,
        }
    }
}

impl SandboxConfig {
    pub fn validate(&self) -> Result<(), SandboxError> {
        if self.max_memory_pages == 0 || self.max_memory_pages > MAX_WASM_PAGES {
            return Err(SandboxError::InvalidConfig(format!(
                "max_memory_pages must be in 1..={}, got {}",
                MAX_WASM_PAGES, self.max_memory_pages
            )));
        }
        if self.max_call_depth == 0 {
            return Err(SandboxError::InvalidConfig("max_call_depth must be at least 1".into()));
        }
        if self.entry_point.is_empty() {
            return Err(SandboxError::InvalidConfig("entry_point is empty".into()));
        }
        Ok(())
    }

    /// Memory cap in bytes.
    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_pages as usize * 65_536
    }
}

/// Per-transaction options shared by every invocation on one VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmOptions {
    /// Seed mixed into contract address derivation by `create`.
    pub nonce: Hash,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self { nonce: ZERO_HASH }
    }
}
