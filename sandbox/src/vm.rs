//! The wasm virtual machine shared by every invocation.
//!
//! A `WasmVm` owns one deterministic Wasmtime `Engine`, the sandbox
//! configuration and the per-transaction options. Contracts and nested
//! calls all compile and run on the same engine.

use std::sync::Arc;

use ewasm_primitives::Account;
use tracing::debug;
use wasmtime::{Config, Engine};

use crate::config::{SandboxConfig, VmOptions};
use crate::contract::Contract;
use crate::dispatch::{Callable, Dispatcher};
use crate::error::SandboxError;

pub struct WasmVm {
    engine: Engine,
    config: SandboxConfig,
    options: VmOptions,
    external: Option<Arc<dyn Dispatcher>>,
}

impl WasmVm {
    pub fn new(config: SandboxConfig, options: VmOptions) -> Result<Self, SandboxError> {
        config.validate()?;
        let engine = create_engine(&config)?;
        debug!(
            max_memory_pages = config.max_memory_pages,
            fuel_limit = config.fuel_limit,
            entry_point = %config.entry_point,
            "created wasm vm"
        );
        Ok(Self {
            engine,
            config,
            options,
            external: None,
        })
    }

    /// Route accounts without wasm code to `dispatcher`.
    pub fn with_external_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.external = Some(dispatcher);
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn options(&self) -> &VmOptions {
        &self.options
    }

    /// Bind `code` to this VM.
    pub fn contract(self: &Arc<Self>, code: Vec<u8>) -> Contract {
        Contract::new(self.clone(), code)
    }

    /// Find something able to run `account`'s code.
    ///
    /// Wasm code runs on this VM; anything else goes to the external
    /// dispatcher if one is installed.
    pub fn dispatch(self: &Arc<Self>, account: &Account) -> Option<Arc<dyn Callable>> {
        if account.has_code() {
            return Some(Arc::new(self.contract(account.wasm_code.clone())));
        }
        self.external
            .as_ref()
            .and_then(|external| external.dispatch(account))
    }
}

/// Create a Wasmtime engine with deterministic configuration.
fn create_engine(config: &SandboxConfig) -> Result<Engine, SandboxError> {
    let mut wasm_config = Config::new();

    // Fuel metering bounds pure compute
    wasm_config.consume_fuel(true);

    // Determinism enforcement
    wasm_config.wasm_threads(false);
    wasm_config.wasm_simd(false);
    wasm_config.wasm_relaxed_simd(false);
    wasm_config.wasm_multi_memory(false);
    wasm_config.cranelift_nan_canonicalization(true);

    let max_bytes = config.max_memory_bytes() as u64;
    wasm_config.memory_guaranteed_dense_image_size(max_bytes.min(16 * 1024 * 1024));

    Ok(Engine::new(&wasm_config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_vm() {
        let vm = WasmVm::new(SandboxConfig::default(), VmOptions::default()).unwrap();
        assert_eq!(vm.config().entry_point, "main");
        assert_eq!(vm.options().nonce, [0u8; 32]);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SandboxConfig {
            max_memory_pages: 100_000,
            ..SandboxConfig::default()
        };
        assert!(matches!(
            WasmVm::new(config, VmOptions::default()),
            Err(SandboxError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_dispatch_without_code_or_external() {
        let vm = Arc::new(WasmVm::new(SandboxConfig::default(), VmOptions::default()).unwrap());
        assert!(vm.dispatch(&Account::new([1u8; 20])).is_none());

        let mut account = Account::new([2u8; 20]);
        account.wasm_code = vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];
        assert!(vm.dispatch(&account).is_some());
    }
}
