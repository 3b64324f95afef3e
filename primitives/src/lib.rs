//! `ewasm-primitives`: foundational types for the ewasm host.
//!
//! This crate provides the wire-level ABI types (addresses, 32-byte words,
//! 128-bit values), their fixed-width codecs, accounts, permissions,
//! events, call parameters, error codes and contract address derivation
//! shared by the host API and the sandbox.

pub mod types;
pub mod codec;
pub mod error;
pub mod account;
pub mod permission;
pub mod event;
pub mod call;
pub mod crypto;

// Re-export commonly used types at the crate root for convenience.
pub use types::{Address, Word256, Hash, BlockHeight, ZERO_ADDRESS, ZERO_WORD, ZERO_HASH};
pub use error::{ReturnCode, ErrorCode, CallError, CallResult};
pub use account::Account;
pub use permission::Permission;
pub use event::{Event, PrintEvent, LogEvent};
pub use call::{CallParams, CallType};
