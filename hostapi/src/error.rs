//! Host-side error types for the ewasm sandbox.
//!
//! `HostError` is returned by every ledger, event, blockchain and permission
//! accessor. It carries an [`ErrorCode`] so the sandbox can decide whether
//! the failure is surfaced to bytecode (`create` permission denial) or is
//! fatal to the invocation.

use ewasm_primitives::{Address, CallError, ErrorCode, Permission};
use ewasm_primitives::types::address_to_hex;

/// Host-side error type returned by state handle accessors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// A coded error with a diagnostic message.
    #[error("{code}: {message}")]
    Code { code: ErrorCode, message: String },
    /// A backend failure not mapped to a specific code.
    #[error("internal host error: {0}")]
    Internal(String),
}

impl HostError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Code {
            code,
            message: message.into(),
        }
    }

    /// The engine-level code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Code { code, .. } => *code,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn permission_denied(address: &Address, permission: Permission) -> Self {
        Self::new(
            ErrorCode::PermissionDenied,
            format!("{} lacks permission {}", address_to_hex(address), permission),
        )
    }

    pub fn non_existent_account(address: &Address) -> Self {
        Self::new(
            ErrorCode::NonExistentAccount,
            format!("account {} does not exist", address_to_hex(address)),
        )
    }

    pub fn duplicate_address(address: &Address) -> Self {
        Self::new(
            ErrorCode::DuplicateAddress,
            format!("account {} already exists", address_to_hex(address)),
        )
    }

    pub fn illegal_write() -> Self {
        Self::new(ErrorCode::IllegalWrite, "state mutation in a read-only frame")
    }
}

impl From<CallError> for HostError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Reverted { .. } => {
                Self::new(ErrorCode::ExecutionReverted, "execution reverted")
            }
            CallError::Failed { code, message } => Self::Code { code, message },
        }
    }
}

impl From<HostError> for CallError {
    fn from(err: HostError) -> Self {
        let code = err.code();
        match err {
            HostError::Code { message, .. } => CallError::new(code, message),
            HostError::Internal(message) => CallError::new(code, message),
        }
    }
}
