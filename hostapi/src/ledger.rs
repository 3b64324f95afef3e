//! Ledger and event sink abstractions consumed by the ewasm host.
//!
//! `Ledger` is the account/storage store. Every method takes `&self`:
//! implementations use interior mutability so a single handle can be
//! shared between a call frame and the nested frames it opens.
//!
//! Implementations:
//! - `MemLedger` (this crate): in-memory BTreeMaps for tests and embedders
//! - `CallFrame` (this crate): a buffering layer over another `Ledger`

use ewasm_primitives::{Account, Address, LogEvent, PrintEvent, Word256};

use crate::error::HostError;

/// Account and storage access.
///
/// Mutations must be all-or-nothing per call: a failed method leaves no
/// partial change observable.
pub trait Ledger: Send + Sync {
    /// Get an account. Returns `Ok(None)` if it does not exist.
    fn get_account(&self, address: &Address) -> Result<Option<Account>, HostError>;

    /// Insert or replace an account.
    fn update_account(&self, account: Account) -> Result<(), HostError>;

    /// Remove an account. Removing an absent account is not an error.
    fn remove_account(&self, address: &Address) -> Result<(), HostError>;

    /// Read a storage word. Slots never written read as the zero word.
    fn get_storage(&self, address: &Address, key: &Word256) -> Result<Word256, HostError>;

    /// Write a storage word.
    fn set_storage(&self, address: &Address, key: &Word256, value: Word256)
        -> Result<(), HostError>;
}

/// Destination for contract events.
pub trait EventSink: Send + Sync {
    fn print(&self, event: PrintEvent) -> Result<(), HostError>;

    fn log(&self, event: LogEvent) -> Result<(), HostError>;
}
