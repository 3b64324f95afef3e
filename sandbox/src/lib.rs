//! `ewasm-sandbox`: Wasmtime-based host for ewasm contracts.
//!
//! This crate runs contract bytecode under the Ethereum-flavored host
//! interface. It provides:
//!
//! - **Boundary scanning:** constructor arguments appended after the last
//!   module section are stripped before compilation
//! - **Import resolution:** only the `ethereum` and `debug` catalogs link;
//!   anything else fails with `UnresolvedSymbols`
//! - **Host functions:** bounds-checked linear memory access, ledger
//!   reads and writes, nested calls and contract creation
//! - **Outcome classification:** success, revert (with output) or abort
//! - **Determinism:** no SIMD, no threads, NaN canonicalization, fuel
//!   metering and bounded memory growth
//!
//! The primary entry point is [`Contract::call`].

pub mod error;
pub mod config;
pub mod boundary;
pub mod memory;
pub mod outcome;
pub mod imports;
pub mod context;
pub mod host;
pub mod linker;
pub mod dispatch;
pub mod contract;
pub mod vm;

#[cfg(test)]
pub(crate) mod testing;

pub use error::SandboxError;
pub use config::{SandboxConfig, VmOptions};
pub use boundary::scan_boundary;
pub use outcome::{AbortCause, HostResult, Outcome};
pub use imports::HostFunction;
pub use context::ExecutionContext;
pub use dispatch::{call_from_site, CallRequest, Callable, Dispatcher};
pub use contract::Contract;
pub use vm::WasmVm;
