//! Events emitted by contracts through the host.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Word256};

/// Diagnostic output from the `debug` namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintEvent {
    pub address: Address,
    pub data: Vec<u8>,
}

/// A contract log entry emitted by `ethereum.log`.
///
/// Carries at most four topics, each exactly 32 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub address: Address,
    pub topics: Vec<Word256>,
    pub data: Vec<u8>,
}

/// Either kind of event, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Print(PrintEvent),
    Log(LogEvent),
}
