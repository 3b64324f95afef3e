//! Contract entry.
//!
//! A `Contract` is deployed bytecode bound to a [`WasmVm`]. Each
//! invocation trims the code, compiles it, resolves its imports against the
//! host catalog, instantiates it with a fresh [`ExecutionContext`], runs the
//! entry point and classifies how it ended.

use std::sync::Arc;
use std::time::Instant;

use ewasm_hostapi::State;
use ewasm_primitives::{CallError, CallParams, CallResult, CallType, ErrorCode};
use tracing::debug;
use wasmtime::{Linker, Module, Store};

use crate::boundary;
use crate::context::ExecutionContext;
use crate::dispatch::Callable;
use crate::imports::resolve_imports;
use crate::linker::register_host_functions;
use crate::outcome::classify;
use crate::vm::WasmVm;

pub struct Contract {
    vm: Arc<WasmVm>,
    code: Vec<u8>,
}

impl Contract {
    pub fn new(vm: Arc<WasmVm>, code: Vec<u8>) -> Self {
        Self { vm, code }
    }

    /// Invoke the contract in its own call frame.
    ///
    /// The frame is read-only for static calls. `params.value` moves from
    /// caller to callee before execution, and the frame's writes reach
    /// `state` only if execution ends normally. Fails with
    /// `CallStackOverflow` once frames nest deeper than `max_call_depth`.
    pub fn call(&self, state: &State, params: &mut CallParams) -> CallResult {
        let frame = state.new_frame(params.call_type == CallType::Static);
        let max_depth = self.vm.config().max_call_depth;
        if frame.depth() > max_depth {
            return Err(CallError::new(
                ErrorCode::CallStackOverflow,
                format!("call depth {} exceeds limit {}", frame.depth(), max_depth),
            ));
        }
        transfer_value(&frame, params)?;
        let output = self.execute(&frame, params)?;
        frame.sync().map_err(CallError::from)?;
        Ok(output)
    }

    /// Run the contract directly against `state`, without a frame of its
    /// own or a value transfer.
    pub fn execute(&self, state: &State, params: &mut CallParams) -> CallResult {
        let engine = self.vm.engine();
        let config = self.vm.config();

        let code = boundary::trim(&self.code);
        debug!(
            deployed = self.code.len(),
            trimmed = code.len(),
            "trimmed contract code"
        );

        let module = Module::new(engine, code).map_err(|e| {
            CallError::new(ErrorCode::InvalidContract, format!("compile: {:#}", e))
        })?;
        let imports = resolve_imports(&module, config)?;

        let ctx = ExecutionContext::new(self.vm.clone(), state.clone(), params.clone(), code.to_vec());
        let mut store = Store::new(engine, ctx);
        store.limiter(|ctx| &mut ctx.limits);
        store
            .set_fuel(config.fuel_limit)
            .map_err(|e| CallError::new(ErrorCode::Internal, format!("set fuel: {:#}", e)))?;

        let mut linker = Linker::new(engine);
        register_host_functions(&mut linker, &imports)
            .map_err(|e| CallError::new(ErrorCode::Internal, format!("link: {:#}", e)))?;

        let instance = match linker.instantiate(&mut store, &module) {
            Ok(instance) => instance,
            // a start function may already have terminated the invocation
            Err(e) if store.data().outcome().is_none() => {
                return Err(CallError::new(
                    ErrorCode::InvalidContract,
                    format!("instantiate: {:#}", e),
                ));
            }
            Err(e) => {
                let ctx = store.into_data();
                params.gas = ctx.params.gas;
                let (outcome, output) = ctx.finish();
                return classify(outcome, Err(e), output);
            }
        };

        let entry = instance.get_func(&mut store, &config.entry_point).ok_or_else(|| {
            CallError::new(
                ErrorCode::UnresolvedSymbols,
                format!("entry point '{}' is not exported", config.entry_point),
            )
        })?;
        let entry = entry.typed::<(), ()>(&store).map_err(|e| {
            CallError::new(
                ErrorCode::InvalidContract,
                format!("entry point '{}' is not () -> (): {:#}", config.entry_point, e),
            )
        })?;

        let started = Instant::now();
        let run = entry.call(&mut store, ());
        let fuel_left = store.get_fuel().unwrap_or(0);

        let ctx = store.into_data();
        params.gas = ctx.params.gas;
        let (outcome, output) = ctx.finish();
        debug!(
            elapsed_us = started.elapsed().as_micros() as u64,
            fuel_used = config.fuel_limit.saturating_sub(fuel_left),
            outcome = outcome.as_ref().map_or("returned", |o| o.label()),
            "contract run finished"
        );
        classify(outcome, run, output)
    }
}

impl Callable for Contract {
    fn call(&self, state: &State, params: &mut CallParams) -> CallResult {
        Contract::call(self, state, params)
    }
}

/// Move `params.value` from caller to callee inside `frame`.
///
/// Skipped for zero values and for delegate calls, which reuse the value
/// their parent already received.
pub(crate) fn transfer_value(frame: &State, params: &CallParams) -> Result<(), CallError> {
    if params.value == 0 || params.call_type == CallType::Delegate {
        return Ok(());
    }
    let amount = u64::try_from(params.value).map_err(|_| {
        CallError::new(
            ErrorCode::IntegerOverflow,
            format!("value {} exceeds the balance range", params.value),
        )
    })?;
    frame
        .transfer(&params.caller, &params.callee, amount)
        .map_err(CallError::from)
}
