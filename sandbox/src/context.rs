//! Per-invocation mutable state held in the Wasmtime `Store`.
//!
//! `ExecutionContext` combines the call parameters, the state handle, the
//! trimmed code and the output buffers into a single struct that lives
//! inside `Store<ExecutionContext>` for the duration of one invocation.

use std::sync::Arc;

use ewasm_hostapi::State;
use ewasm_primitives::CallParams;
use wasmtime::{StoreLimits, StoreLimitsBuilder};

use crate::outcome::Outcome;
use crate::vm::WasmVm;

pub struct ExecutionContext {
    pub(crate) vm: Arc<WasmVm>,
    /// Handle on this invocation's call frame.
    pub state: State,
    /// Call parameters. Only `gas` changes during execution.
    pub params: CallParams,
    /// Module bytes with any trailer stripped.
    pub code: Vec<u8>,
    /// Data passed to `finish` or `revert`.
    pub output: Option<Vec<u8>>,
    /// Output of the most recent nested call.
    pub return_data: Vec<u8>,
    sequence: u64,
    outcome: Option<Outcome>,
    pub(crate) limits: StoreLimits,
}

impl ExecutionContext {
    pub fn new(vm: Arc<WasmVm>, state: State, params: CallParams, code: Vec<u8>) -> Self {
        let limits = StoreLimitsBuilder::new()
            .memory_size(vm.config().max_memory_bytes())
            .memories(1)
            .build();
        Self {
            vm,
            state,
            params,
            code,
            output: None,
            return_data: Vec::new(),
            sequence: 0,
            outcome: None,
            limits,
        }
    }

    pub fn vm(&self) -> &Arc<WasmVm> {
        &self.vm
    }

    /// Advance the creation-nonce sequence and return the new value.
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Record the terminal output. Later calls leave the first value.
    pub fn set_output(&mut self, data: Vec<u8>) {
        if self.output.is_none() {
            self.output = Some(data);
        }
    }

    /// Record how the invocation ends. Only the first outcome counts.
    pub fn record(&mut self, outcome: Outcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Take the output and recorded outcome, consuming the context.
    pub fn finish(self) -> (Option<Outcome>, Option<Vec<u8>>) {
        (self.outcome, self.output)
    }
}
