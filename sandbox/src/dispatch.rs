//! Nested-call dispatch.
//!
//! [`call_from_site`] is how a running contract calls another account:
//! it checks the caller's permission, resolves the target, carves the gas
//! allowance out of the caller's budget, binds the call parameters for the
//! requested call type and runs whatever code the target holds.

use std::sync::Arc;

use ewasm_hostapi::{HostError, State};
use ewasm_primitives::types::address_to_hex;
use ewasm_primitives::{
    Account, Address, CallError, CallParams, CallResult, CallType, Permission,
};
use tracing::debug;

use crate::vm::WasmVm;

/// Something that can be invoked with a state handle and call parameters.
pub trait Callable: Send + Sync {
    /// Run the code. `params.gas` is updated with the gas left afterwards.
    fn call(&self, state: &State, params: &mut CallParams) -> CallResult;
}

/// Resolves accounts that hold no wasm code to a [`Callable`].
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, account: &Account) -> Option<Arc<dyn Callable>>;
}

/// A nested call requested by running code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub call_type: CallType,
    pub target: Address,
    pub input: Vec<u8>,
    pub value: u128,
    /// Gas offered by the caller.
    pub gas: u64,
}

/// Gas actually granted to a nested call: the request, unless it exceeds
/// what remains, in which case all but one 64th of the remainder.
pub fn granted_gas(requested: u64, available: u64) -> u64 {
    if requested > available {
        available - available / 64
    } else {
        requested
    }
}

/// Run a nested call on behalf of the invocation described by `site`.
///
/// The granted gas is deducted from `site.gas` up front and is not
/// returned here; callers settle the budget themselves.
pub fn call_from_site(
    vm: &Arc<WasmVm>,
    state: &State,
    site: &mut CallParams,
    request: CallRequest,
) -> CallResult {
    state.ensure_permission(&site.callee, Permission::Call)?;

    let account = match state.get_account(&request.target)? {
        Some(account) => account,
        None if request.call_type == CallType::Call => {
            state.create_account(&site.callee, &request.target)?;
            state
                .get_account(&request.target)?
                .ok_or_else(|| HostError::non_existent_account(&request.target))?
        }
        None => return Err(HostError::non_existent_account(&request.target).into()),
    };

    let gas = granted_gas(request.gas, site.gas);
    site.gas -= gas;

    let (caller, callee, value) = match request.call_type {
        CallType::Call | CallType::Static => (site.callee, request.target, request.value),
        CallType::Code => (site.callee, site.callee, request.value),
        CallType::Delegate => (site.caller, site.callee, site.value),
    };
    let mut params = CallParams {
        origin: site.origin,
        caller,
        callee,
        input: request.input,
        value: if request.call_type == CallType::Static { 0 } else { value },
        gas,
        call_type: request.call_type,
    };

    debug!(
        call_type = %request.call_type,
        target = %address_to_hex(&request.target),
        gas,
        "dispatching nested call"
    );

    let result = match vm.dispatch(&account) {
        Some(callable) => callable.call(state, &mut params),
        None => transfer_only(state, &params),
    };
    debug!(ok = result.is_ok(), gas_left = params.gas, "nested call returned");
    result
}

/// Value transfer to an account with no code.
fn transfer_only(state: &State, params: &CallParams) -> CallResult {
    let frame = state.new_frame(params.call_type == CallType::Static);
    crate::contract::transfer_value(&frame, params)?;
    frame.sync().map_err(CallError::from)?;
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state, test_vm, ALICE, BOB};
    use ewasm_primitives::ErrorCode;

    #[test]
    fn test_granted_gas() {
        assert_eq!(granted_gas(100, 1000), 100);
        assert_eq!(granted_gas(1000, 1000), 1000);
        assert_eq!(granted_gas(5000, 6400), 5000);
        assert_eq!(granted_gas(10_000, 6400), 6300);
        assert_eq!(granted_gas(1, 0), 0);
    }

    fn site() -> CallParams {
        CallParams {
            origin: ALICE,
            caller: ALICE,
            callee: BOB,
            gas: 6400,
            ..CallParams::default()
        }
    }

    #[test]
    fn test_call_creates_missing_target() {
        let (_, state) = test_state();
        let mut site = site();
        let target = [0x33; 20];
        let request = CallRequest {
            call_type: CallType::Call,
            target,
            input: vec![],
            value: 0,
            gas: 100,
        };
        let output = call_from_site(&test_vm(), &state, &mut site, request).unwrap();
        assert!(output.is_empty());
        assert!(state.get_account(&target).unwrap().is_some());
        assert_eq!(site.gas, 6300);
    }

    #[test]
    fn test_non_call_requires_existing_target() {
        let (_, state) = test_state();
        for call_type in [CallType::Code, CallType::Delegate, CallType::Static] {
            let mut site = site();
            let request = CallRequest {
                call_type,
                target: [0x44; 20],
                input: vec![],
                value: 0,
                gas: 100,
            };
            let err = call_from_site(&test_vm(), &state, &mut site, request).unwrap_err();
            assert_eq!(err.code(), ErrorCode::NonExistentAccount);
        }
    }

    #[test]
    fn test_value_moves_to_codeless_account() {
        let (_, state) = test_state();
        let mut site = site();
        let request = CallRequest {
            call_type: CallType::Call,
            target: ALICE,
            input: vec![],
            value: 25,
            gas: 100,
        };
        call_from_site(&test_vm(), &state, &mut site, request).unwrap();
        assert_eq!(state.get_account(&BOB).unwrap().unwrap().balance, 75);
        assert_eq!(state.get_account(&ALICE).unwrap().unwrap().balance, 1_025);
    }
}
