//! Error codes and call results for the ewasm host.
//!
//! Two families live here:
//!
//! - [`ReturnCode`]: the integer a host function hands back to bytecode
//!   (`create`, `call*`, `getBlockHash`). Part of the wire ABI.
//! - [`ErrorCode`] / [`CallError`]: what an invocation returns to the engine
//!   that called it. A revert is reported as an error that still carries the
//!   reverted output; callers tell it apart from fatal failures by its code.

use std::fmt;

/// Integer result codes visible to contract bytecode.
///
/// These repr values are fixed by the ewasm EEI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ReturnCode {
    Success = 0,
    Error = 1,
    Revert = 2,
}

impl ReturnCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Engine-level error codes for a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Contract-initiated rollback. Output is carried alongside.
    ExecutionReverted,
    /// Fatal failure during execution. No output is trusted.
    ExecutionAborted,
    /// Module could not be compiled or instantiated.
    InvalidContract,
    /// An import or the entry point could not be resolved.
    UnresolvedSymbols,
    PermissionDenied,
    InsufficientBalance,
    NonExistentAccount,
    DuplicateAddress,
    /// State write attempted from a read-only (static) frame.
    IllegalWrite,
    IntegerOverflow,
    /// Nested invocations went deeper than the configured limit.
    CallStackOverflow,
    /// Failure inside a ledger backend.
    Internal,
}

impl ErrorCode {
    /// Returns true if this is the revert code.
    pub fn is_revert(self) -> bool {
        matches!(self, Self::ExecutionReverted)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ExecutionReverted => "ERR_EXECUTION_REVERTED",
            Self::ExecutionAborted => "ERR_EXECUTION_ABORTED",
            Self::InvalidContract => "ERR_INVALID_CONTRACT",
            Self::UnresolvedSymbols => "ERR_UNRESOLVED_SYMBOLS",
            Self::PermissionDenied => "ERR_PERMISSION_DENIED",
            Self::InsufficientBalance => "ERR_INSUFFICIENT_BALANCE",
            Self::NonExistentAccount => "ERR_NON_EXISTENT_ACCOUNT",
            Self::DuplicateAddress => "ERR_DUPLICATE_ADDRESS",
            Self::IllegalWrite => "ERR_ILLEGAL_WRITE",
            Self::IntegerOverflow => "ERR_INTEGER_OVERFLOW",
            Self::CallStackOverflow => "ERR_CALL_STACK_OVERFLOW",
            Self::Internal => "ERR_INTERNAL",
        };
        f.write_str(name)
    }
}

/// Error returned by a contract invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// The contract reverted; `output` is the data it passed to `revert`.
    #[error("execution reverted ({} bytes of output)", output.len())]
    Reverted { output: Vec<u8> },

    /// Any other failure, with a diagnostic message.
    #[error("{code}: {message}")]
    Failed { code: ErrorCode, message: String },
}

impl CallError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Failed {
            code,
            message: message.into(),
        }
    }

    pub fn reverted(output: Vec<u8>) -> Self {
        Self::Reverted { output }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Reverted { .. } => ErrorCode::ExecutionReverted,
            Self::Failed { code, .. } => *code,
        }
    }

    pub fn is_revert(&self) -> bool {
        self.code().is_revert()
    }

    /// Output carried by a revert. Fatal errors carry none.
    pub fn output(&self) -> Option<&[u8]> {
        match self {
            Self::Reverted { output } => Some(output),
            Self::Failed { .. } => None,
        }
    }
}

/// Result of a contract invocation.
pub type CallResult = Result<Vec<u8>, CallError>;
