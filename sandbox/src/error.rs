//! Sandbox error types.
//!
//! `SandboxError` covers failures while building the VM. Failures while
//! running a contract are reported as [`CallError`](ewasm_primitives::CallError)
//! instead, so nested calls can propagate them unchanged.

/// Top-level error type for the sandbox crate.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Wasmtime engine construction error.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),

    /// Configuration rejected before the engine was built.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
