//! Call frames passed into a contract invocation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Address, ZERO_ADDRESS};

/// How a nested call binds its caller, callee and storage context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CallType {
    /// Run the target's code against the target's storage.
    #[default]
    Call,
    /// Run the target's code against the calling contract's storage.
    Code,
    /// Like `Code`, additionally keeping the original caller and value.
    Delegate,
    /// Run the target's code with no state mutation allowed.
    Static,
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Call => "call",
            Self::Code => "callCode",
            Self::Delegate => "callDelegate",
            Self::Static => "callStatic",
        };
        f.write_str(name)
    }
}

/// One invocation's call frame.
///
/// `gas` is the only field mutated during a call: the invoking layer
/// deducts from it and nested calls credit it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallParams {
    pub origin: Address,
    pub caller: Address,
    pub callee: Address,
    pub input: Vec<u8>,
    pub value: u128,
    pub gas: u64,
    pub call_type: CallType,
}

impl Default for CallParams {
    fn default() -> Self {
        Self {
            origin: ZERO_ADDRESS,
            caller: ZERO_ADDRESS,
            callee: ZERO_ADDRESS,
            input: Vec::new(),
            value: 0,
            gas: 0,
            call_type: CallType::Call,
        }
    }
}
