//! Import resolution.
//!
//! The host exposes a fixed set of functions in two namespaces, `ethereum`
//! and `debug`. Before instantiation every import of a module is resolved
//! against that set once; anything outside it (unknown names, globals,
//! memories, tables) fails with `UnresolvedSymbols`.

use std::fmt;

use ewasm_primitives::{CallError, ErrorCode};
use tracing::trace;
use wasmtime::{ExternType, Module};

use crate::config::SandboxConfig;

pub const ETHEREUM_NAMESPACE: &str = "ethereum";
pub const DEBUG_NAMESPACE: &str = "debug";

/// Every host function a contract may import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostFunction {
    // debug
    Print32,
    Print64,
    PrintMem,
    PrintMemHex,
    PrintStorage,
    PrintStorageHex,
    // ethereum
    Create,
    GetBlockDifficulty,
    GetTxGasPrice,
    SelfDestruct,
    Call,
    CallCode,
    CallDelegate,
    CallStatic,
    GetCallDataSize,
    CallDataCopy,
    GetReturnDataSize,
    ReturnDataCopy,
    GetCodeSize,
    CodeCopy,
    StorageStore,
    StorageLoad,
    Finish,
    Revert,
    GetAddress,
    GetCaller,
    GetTxOrigin,
    GetCallValue,
    GetExternalBalance,
    GetBlockTimestamp,
    GetBlockNumber,
    GetBlockGasLimit,
    GetGasLeft,
    GetBlockCoinbase,
    GetBlockHash,
    Log,
}

impl HostFunction {
    pub const ALL: &'static [HostFunction] = &[
        Self::Print32,
        Self::Print64,
        Self::PrintMem,
        Self::PrintMemHex,
        Self::PrintStorage,
        Self::PrintStorageHex,
        Self::Create,
        Self::GetBlockDifficulty,
        Self::GetTxGasPrice,
        Self::SelfDestruct,
        Self::Call,
        Self::CallCode,
        Self::CallDelegate,
        Self::CallStatic,
        Self::GetCallDataSize,
        Self::CallDataCopy,
        Self::GetReturnDataSize,
        Self::ReturnDataCopy,
        Self::GetCodeSize,
        Self::CodeCopy,
        Self::StorageStore,
        Self::StorageLoad,
        Self::Finish,
        Self::Revert,
        Self::GetAddress,
        Self::GetCaller,
        Self::GetTxOrigin,
        Self::GetCallValue,
        Self::GetExternalBalance,
        Self::GetBlockTimestamp,
        Self::GetBlockNumber,
        Self::GetBlockGasLimit,
        Self::GetGasLeft,
        Self::GetBlockCoinbase,
        Self::GetBlockHash,
        Self::Log,
    ];

    pub fn namespace(self) -> &'static str {
        match self {
            Self::Print32
            | Self::Print64
            | Self::PrintMem
            | Self::PrintMemHex
            | Self::PrintStorage
            | Self::PrintStorageHex => DEBUG_NAMESPACE,
            _ => ETHEREUM_NAMESPACE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Print32 => "print32",
            Self::Print64 => "print64",
            Self::PrintMem => "printMem",
            Self::PrintMemHex => "printMemHex",
            Self::PrintStorage => "printStorage",
            Self::PrintStorageHex => "printStorageHex",
            Self::Create => "create",
            Self::GetBlockDifficulty => "getBlockDifficulty",
            Self::GetTxGasPrice => "getTxGasPrice",
            Self::SelfDestruct => "selfDestruct",
            Self::Call => "call",
            Self::CallCode => "callCode",
            Self::CallDelegate => "callDelegate",
            Self::CallStatic => "callStatic",
            Self::GetCallDataSize => "getCallDataSize",
            Self::CallDataCopy => "callDataCopy",
            Self::GetReturnDataSize => "getReturnDataSize",
            Self::ReturnDataCopy => "returnDataCopy",
            Self::GetCodeSize => "getCodeSize",
            Self::CodeCopy => "codeCopy",
            Self::StorageStore => "storageStore",
            Self::StorageLoad => "storageLoad",
            Self::Finish => "finish",
            Self::Revert => "revert",
            Self::GetAddress => "getAddress",
            Self::GetCaller => "getCaller",
            Self::GetTxOrigin => "getTxOrigin",
            Self::GetCallValue => "getCallValue",
            Self::GetExternalBalance => "getExternalBalance",
            Self::GetBlockTimestamp => "getBlockTimestamp",
            Self::GetBlockNumber => "getBlockNumber",
            Self::GetBlockGasLimit => "getBlockGasLimit",
            Self::GetGasLeft => "getGasLeft",
            Self::GetBlockCoinbase => "getBlockCoinbase",
            Self::GetBlockHash => "getBlockHash",
            Self::Log => "log",
        }
    }

    pub fn is_debug(self) -> bool {
        self.namespace() == DEBUG_NAMESPACE
    }

    /// Look up a host function by its import coordinates.
    pub fn lookup(namespace: &str, name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.namespace() == namespace && f.name() == name)
    }
}

impl fmt::Display for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace(), self.name())
    }
}

fn unresolved(namespace: &str, name: &str, reason: &str) -> CallError {
    CallError::new(
        ErrorCode::UnresolvedSymbols,
        format!("cannot resolve import {}.{}: {}", namespace, name, reason),
    )
}

/// Resolve every import of `module`.
///
/// Returns the distinct host functions to link, in a stable order.
pub fn resolve_imports(
    module: &Module,
    config: &SandboxConfig,
) -> Result<Vec<HostFunction>, CallError> {
    let mut resolved = Vec::new();
    for import in module.imports() {
        let (namespace, name) = (import.module(), import.name());
        match import.ty() {
            ExternType::Func(_) => {}
            ExternType::Global(_) => {
                return Err(unresolved(namespace, name, "global imports are not supported"))
            }
            ExternType::Memory(_) => {
                return Err(unresolved(namespace, name, "memory imports are not supported"))
            }
            _ => return Err(unresolved(namespace, name, "only function imports are supported")),
        }
        let function = HostFunction::lookup(namespace, name)
            .ok_or_else(|| unresolved(namespace, name, "unknown host function"))?;
        if function.is_debug() && !config.enable_debug_imports {
            return Err(unresolved(namespace, name, "debug imports are disabled"));
        }
        trace!(%function, "resolved import");
        resolved.push(function);
    }
    resolved.sort();
    resolved.dedup();
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmtime::Engine;

    fn compile(wat: &str) -> Module {
        Module::new(&Engine::default(), wat).unwrap()
    }

    #[test]
    fn test_catalog_names_are_unique() {
        for (i, a) in HostFunction::ALL.iter().enumerate() {
            for b in &HostFunction::ALL[i + 1..] {
                assert!(
                    a.namespace() != b.namespace() || a.name() != b.name(),
                    "{} duplicated",
                    a
                );
            }
            assert_eq!(HostFunction::lookup(a.namespace(), a.name()), Some(*a));
        }
        assert_eq!(HostFunction::ALL.len(), 36);
    }

    #[test]
    fn test_lookup_is_namespace_sensitive() {
        assert_eq!(HostFunction::lookup("ethereum", "finish"), Some(HostFunction::Finish));
        assert_eq!(HostFunction::lookup("debug", "finish"), None);
        assert_eq!(HostFunction::lookup("ethereum", "print32"), None);
        assert_eq!(HostFunction::lookup("ethereum", "useGas"), None);
        assert_eq!(HostFunction::Print64.to_string(), "debug.print64");
    }

    #[test]
    fn test_resolve_known_imports() {
        let module = compile(
            r#"(module
                (import "ethereum" "finish" (func (param i32 i32)))
                (import "ethereum" "getCallDataSize" (func (result i32)))
                (import "debug" "print32" (func (param i32)))
            )"#,
        );
        let resolved = resolve_imports(&module, &SandboxConfig::default()).unwrap();
        assert_eq!(
            resolved,
            vec![HostFunction::Print32, HostFunction::GetCallDataSize, HostFunction::Finish]
        );
    }

    #[test]
    fn test_duplicate_imports_are_linked_once() {
        let module = compile(
            r#"(module
                (import "ethereum" "finish" (func $a (param i32 i32)))
                (import "ethereum" "finish" (func $b (param i32 i32)))
            )"#,
        );
        let resolved = resolve_imports(&module, &SandboxConfig::default()).unwrap();
        assert_eq!(resolved, vec![HostFunction::Finish]);
    }

    #[test]
    fn test_unknown_import_fails() {
        let module = compile(r#"(module (import "ethereum" "useGas" (func (param i64))))"#);
        let err = resolve_imports(&module, &SandboxConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnresolvedSymbols);
        assert!(err.to_string().contains("ethereum.useGas"));
    }

    #[test]
    fn test_global_memory_and_table_imports_fail() {
        for wat in [
            r#"(module (import "ethereum" "g" (global i32)))"#,
            r#"(module (import "ethereum" "m" (memory 1)))"#,
            r#"(module (import "ethereum" "t" (table 1 funcref)))"#,
        ] {
            let err = resolve_imports(&compile(wat), &SandboxConfig::default()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::UnresolvedSymbols, "{}", wat);
        }
    }

    #[test]
    fn test_debug_namespace_can_be_disabled() {
        let module = compile(r#"(module (import "debug" "printMem" (func (param i32 i32))))"#);
        let config = SandboxConfig {
            enable_debug_imports: false,
            ..SandboxConfig::default()
        };
        let err = resolve_imports(&module, &config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnresolvedSymbols);
    }
}
