//! `ewasm-hostapi`: state interfaces consumed by the ewasm host.
//!
//! This crate defines what the sandbox needs from the outside world when
//! running a contract:
//!
//! - `Ledger` / `EventSink`: account, storage and event backends
//! - `Blockchain`: chain metadata (height, time, historical hashes)
//! - `PermissionChecker`: capability checks
//! - `CallFrame`: transactional buffering layer over a ledger
//! - `State`: the handle each invocation receives
//! - `MemLedger`, `EventCollector`, `StaticBlockchain`, `PermissionTable`:
//!   in-memory implementations for tests and embedders
//! - `HostError`: host-side error type carrying an `ErrorCode`

pub mod error;
pub mod ledger;
pub mod blockchain;
pub mod permission;
pub mod frame;
pub mod state;
pub mod mem_store;

// Re-export commonly used types at the crate root.
pub use error::HostError;
pub use ledger::{EventSink, Ledger};
pub use blockchain::{Blockchain, StaticBlockchain};
pub use permission::{AllowAll, PermissionChecker, PermissionTable};
pub use frame::CallFrame;
pub use state::State;
pub use mem_store::{EventCollector, MemLedger};
