//! Shared test helpers for integration tests.
//!
//! Provides stable addresses, WAT compilation, a ledger/state fixture and
//! a few reusable contracts used across all integration test files.

#![allow(dead_code)]

use std::sync::Arc;

use ewasm_hostapi::{
    EventCollector, MemLedger, PermissionChecker, PermissionTable, State, StaticBlockchain,
};
use ewasm_primitives::{Account, Address, CallParams, CallResult, CallType};
use ewasm_sandbox::{Contract, SandboxConfig, VmOptions, WasmVm};

// ── Addresses ──

/// Externally owned account that starts every transaction.
pub const ALICE: Address = [0xA1; 20];
/// Default address contracts are deployed at.
pub const CONTRACT: Address = [0xC0; 20];
/// Second contract, the target of nested calls.
pub const TARGET: Address = [0x7A; 20];

pub const ALICE_BALANCE: u64 = 1_000_000;
pub const GAS: u64 = 1_000_000;

pub const HEIGHT: u64 = 500;
pub const BLOCK_TIME: u64 = 1_700_000_000;

/// Deterministic hash recorded for every historical block.
pub fn block_hash(height: u64) -> [u8; 32] {
    let mut hash = [0xBB; 32];
    hash[24..].copy_from_slice(&height.to_be_bytes());
    hash
}

/// Install a subscriber once so `RUST_LOG` works in tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── WAT ──

/// Compile WAT text to a binary module.
pub fn compile(wat: &str) -> Vec<u8> {
    wat::parse_str(wat).expect("invalid WAT in test")
}

/// Escape raw bytes for a WAT data segment string.
pub fn wat_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("\\{:02x}", b)).collect()
}

// ── Fixture ──

pub struct Fixture {
    pub ledger: Arc<MemLedger>,
    pub sink: Arc<EventCollector>,
    pub state: State,
    pub vm: Arc<WasmVm>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(SandboxConfig::default(), VmOptions::default(), Arc::new(PermissionTable::allow_all()))
    }

    pub fn with_config(config: SandboxConfig) -> Self {
        Self::build(config, VmOptions::default(), Arc::new(PermissionTable::allow_all()))
    }

    pub fn with_permissions(permissions: PermissionTable) -> Self {
        Self::build(SandboxConfig::default(), VmOptions::default(), Arc::new(permissions))
    }

    pub fn with_options(options: VmOptions) -> Self {
        Self::build(SandboxConfig::default(), options, Arc::new(PermissionTable::allow_all()))
    }

    pub fn build(
        config: SandboxConfig,
        options: VmOptions,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        init_tracing();
        let ledger = Arc::new(MemLedger::with_accounts([Account::with_balance(
            ALICE,
            ALICE_BALANCE,
        )]));
        let sink = Arc::new(EventCollector::new());
        let mut chain = StaticBlockchain::new(HEIGHT, BLOCK_TIME);
        for height in 0..HEIGHT {
            chain = chain.with_block_hash(height, block_hash(height));
        }
        let state = State::new(ledger.clone(), sink.clone(), Arc::new(chain), permissions);
        let vm = Arc::new(WasmVm::new(config, options).expect("vm"));
        Self { ledger, sink, state, vm }
    }

    /// Store `code` at `address` as a contract account.
    pub fn deploy(&self, address: Address, code: Vec<u8>) {
        let mut account = Account::new(address);
        account.wasm_code = code;
        self.ledger.insert(account);
    }

    pub fn deploy_wat(&self, address: Address, wat: &str) {
        self.deploy(address, compile(wat));
    }

    pub fn params(&self, callee: Address, input: &[u8], value: u128) -> CallParams {
        CallParams {
            origin: ALICE,
            caller: ALICE,
            callee,
            input: input.to_vec(),
            value,
            gas: GAS,
            call_type: CallType::Call,
        }
    }

    /// Call the contract deployed at `callee` and commit the result.
    pub fn call(&self, callee: Address, input: &[u8]) -> CallResult {
        self.call_with(self.params(callee, input, 0)).0
    }

    /// Call with explicit parameters; returns the result and the
    /// parameters as left by the call.
    pub fn call_with(&self, mut params: CallParams) -> (CallResult, CallParams) {
        let code = self
            .ledger
            .account(&params.callee)
            .map(|a| a.wasm_code)
            .unwrap_or_default();
        let contract = Contract::new(self.vm.clone(), code);
        let result = contract.call(&self.state, &mut params);
        self.state.sync().expect("commit");
        (result, params)
    }

    /// Run raw WAT as the contract at `CONTRACT`.
    pub fn run_wat(&self, wat: &str, input: &[u8]) -> CallResult {
        self.deploy_wat(CONTRACT, wat);
        self.call(CONTRACT, input)
    }
}

// ── Reusable contracts ──

/// Finishes with its call data.
pub const ECHO: &str = r#"
(module
  (import "ethereum" "getCallDataSize" (func $size (result i32)))
  (import "ethereum" "callDataCopy" (func $copy (param i32 i32 i32)))
  (import "ethereum" "finish" (func $finish (param i32 i32)))
  (memory (export "memory") 1)
  (func (export "main")
    (call $copy (i32.const 0) (i32.const 0) (call $size))
    (call $finish (i32.const 0) (call $size))))
"#;

/// Finishes with caller (20 bytes) followed by its own address (20 bytes).
pub const WHOAMI: &str = r#"
(module
  (import "ethereum" "getCaller" (func $caller (param i32)))
  (import "ethereum" "getAddress" (func $address (param i32)))
  (import "ethereum" "finish" (func $finish (param i32 i32)))
  (memory (export "memory") 1)
  (func (export "main")
    (call $caller (i32.const 0))
    (call $address (i32.const 20))
    (call $finish (i32.const 0) (i32.const 40))))
"#;

/// Stores 0xff.. under the zero key, then reverts with "no".
pub const STORE_THEN_REVERT: &str = r#"
(module
  (import "ethereum" "storageStore" (func $store (param i32 i32)))
  (import "ethereum" "revert" (func $revert (param i32 i32)))
  (memory (export "memory") 1)
  (data (i32.const 32) "\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff")
  (data (i32.const 64) "no")
  (func (export "main")
    (call $store (i32.const 0) (i32.const 32))
    (call $revert (i32.const 64) (i32.const 2))))
"#;

/// Stores 0xff.. under the zero key and finishes with nothing.
pub const STORE: &str = r#"
(module
  (import "ethereum" "storageStore" (func $store (param i32 i32)))
  (memory (export "memory") 1)
  (data (i32.const 32) "\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff")
  (func (export "main")
    (call $store (i32.const 0) (i32.const 32))))
"#;
