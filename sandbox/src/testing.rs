//! Fixtures shared by the unit tests of this crate.

use std::sync::Arc;

use ewasm_hostapi::{AllowAll, EventCollector, MemLedger, State, StaticBlockchain};
use ewasm_primitives::{Account, Address, CallParams};

use crate::config::{SandboxConfig, VmOptions};
use crate::context::ExecutionContext;
use crate::vm::WasmVm;

pub(crate) const ALICE: Address = [0xA1; 20];
pub(crate) const BOB: Address = [0xB0; 20];

pub(crate) const HEIGHT: u64 = 1_000;
pub(crate) const BLOCK_TIME: u64 = 1_700_000_000;

pub(crate) fn block_hash(height: u64) -> [u8; 32] {
    let mut hash = [0u8; 32];
    hash[..8].copy_from_slice(&height.to_be_bytes());
    hash
}

pub(crate) fn test_vm() -> Arc<WasmVm> {
    Arc::new(WasmVm::new(SandboxConfig::default(), VmOptions::default()).unwrap())
}

pub(crate) struct Harness {
    pub ledger: Arc<MemLedger>,
    pub sink: Arc<EventCollector>,
    pub state: State,
}

/// ALICE holds 1000, BOB (the usual callee) holds 100.
pub(crate) fn harness() -> Harness {
    let ledger = Arc::new(MemLedger::with_accounts([
        Account::with_balance(ALICE, 1_000),
        Account::with_balance(BOB, 100),
    ]));
    let sink = Arc::new(EventCollector::new());
    let mut chain = StaticBlockchain::new(HEIGHT, BLOCK_TIME);
    for height in HEIGHT - 300..HEIGHT {
        chain = chain.with_block_hash(height, block_hash(height));
    }
    let state = State::new(ledger.clone(), sink.clone(), Arc::new(chain), Arc::new(AllowAll));
    Harness { ledger, sink, state }
}

pub(crate) fn test_state() -> (Arc<MemLedger>, State) {
    let h = harness();
    (h.ledger, h.state)
}

pub(crate) fn test_params() -> CallParams {
    CallParams {
        origin: ALICE,
        caller: ALICE,
        callee: BOB,
        input: b"input".to_vec(),
        value: 7,
        gas: 10_000,
        ..CallParams::default()
    }
}

/// A context for BOB called by ALICE, with a sink to inspect prints.
pub(crate) fn test_context() -> (Arc<EventCollector>, ExecutionContext) {
    let h = harness();
    let ctx = ExecutionContext::new(test_vm(), h.state, test_params(), vec![0xC0; 12]);
    (h.sink, ctx)
}
