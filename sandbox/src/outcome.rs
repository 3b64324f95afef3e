//! Terminal outcomes and their classification.
//!
//! Every catalog function returns [`HostResult`]. An `Err` carries the
//! outcome that ends the invocation: `finish` and `selfDestruct` end it
//! normally, `revert` reverts it, and everything else aborts it. The linker
//! adapter records the outcome in the execution context and unwinds the
//! interpreter; [`classify`] then turns the recorded outcome (or the bare
//! interpreter result) into the caller-visible [`CallResult`].

use ewasm_hostapi::HostError;
use ewasm_primitives::{Address, CallError, CallResult, ErrorCode};
use ewasm_primitives::types::address_to_hex;
use tracing::warn;
use wasmtime::Trap;

/// Result type of every host function in the catalog.
pub type HostResult<T> = Result<T, Outcome>;

/// How an invocation terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Normal,
    Revert,
    Abort(AbortCause),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Revert => "revert",
            Self::Abort(_) => "abort",
        }
    }
}

impl From<AbortCause> for Outcome {
    fn from(cause: AbortCause) -> Self {
        Self::Abort(cause)
    }
}

impl From<HostError> for Outcome {
    fn from(err: HostError) -> Self {
        Self::Abort(AbortCause::State(err))
    }
}

/// Why an invocation aborted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbortCause {
    #[error("memory access out of bounds: {len} bytes at {ptr}")]
    MemoryOutOfBounds { ptr: u32, len: u32 },

    #[error("module does not export a memory")]
    MissingMemory,

    #[error("copy of {len} bytes at offset {offset} exceeds source of {size} bytes")]
    SliceOutOfBounds { offset: u32, len: u32, size: usize },

    #[error("log with {0} topics (at most 4 allowed)")]
    TooManyTopics(u32),

    #[error("block {number} is not within lookback of height {height}")]
    InvalidBlockNumber { number: i64, height: u64 },

    #[error("account {} does not exist", address_to_hex(.0))]
    MissingAccount(Address),

    #[error("state access failed: {0}")]
    State(HostError),

    #[error("nested invocation failed: {0}")]
    Nested(CallError),

    #[error("fuel exhausted")]
    FuelExhausted,

    #[error("interpreter trap: {0}")]
    Trap(String),
}

/// Marker error used to unwind the interpreter after an outcome was
/// recorded in the execution context.
#[derive(Debug, thiserror::Error)]
#[error("execution terminated ({0})")]
pub struct Terminated(pub &'static str);

/// Translate how an invocation ended into its result.
///
/// A recorded outcome takes precedence over the interpreter's own result,
/// since raising one always surfaces as an interpreter error.
pub fn classify(
    recorded: Option<Outcome>,
    run: Result<(), anyhow::Error>,
    output: Option<Vec<u8>>,
) -> CallResult {
    let outcome = match (recorded, run) {
        (Some(outcome), _) => outcome,
        (None, Ok(())) => Outcome::Normal,
        (None, Err(err)) => Outcome::Abort(trap_cause(&err)),
    };
    match outcome {
        Outcome::Normal => Ok(output.unwrap_or_default()),
        Outcome::Revert => Err(CallError::reverted(output.unwrap_or_default())),
        Outcome::Abort(cause) => {
            warn!(%cause, "execution aborted");
            Err(CallError::new(ErrorCode::ExecutionAborted, cause.to_string()))
        }
    }
}

fn trap_cause(err: &anyhow::Error) -> AbortCause {
    match err.downcast_ref::<Trap>() {
        Some(Trap::OutOfFuel) => AbortCause::FuelExhausted,
        _ => AbortCause::Trap(format!("{:#}", err)),
    }
}
