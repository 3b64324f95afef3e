//! Host function registration via Wasmtime linker.
//!
//! Registers the resolved subset of the catalog with the `Linker`. Each
//! wrapper:
//! 1. Converts raw wasm integers into pointers, lengths and values
//! 2. Borrows linear memory and the `ExecutionContext` from the Caller
//! 3. Calls the catalog function
//! 4. On a terminal outcome, records it in the context and unwinds the
//!    interpreter with a [`Terminated`] error

use wasmtime::{Caller, Linker};

use ewasm_primitives::CallType;

use crate::context::ExecutionContext;
use crate::host::{debug, ethereum};
use crate::imports::HostFunction;
use crate::memory::LinearMemory;
use crate::outcome::{AbortCause, HostResult, Outcome, Terminated};

type Ctx<'a> = Caller<'a, ExecutionContext>;

fn terminate(caller: &mut Ctx<'_>, outcome: Outcome) -> anyhow::Error {
    let label = outcome.label();
    caller.data_mut().record(outcome);
    anyhow::Error::new(Terminated(label))
}

/// Run a catalog function that does not touch linear memory.
fn with_context<R>(
    caller: &mut Ctx<'_>,
    f: impl FnOnce(&mut ExecutionContext) -> HostResult<R>,
) -> anyhow::Result<R> {
    match f(caller.data_mut()) {
        Ok(value) => Ok(value),
        Err(outcome) => Err(terminate(caller, outcome)),
    }
}

/// Run a catalog function against the caller's exported memory.
fn with_memory<R>(
    caller: &mut Ctx<'_>,
    f: impl FnOnce(&mut ExecutionContext, &mut LinearMemory<'_>) -> HostResult<R>,
) -> anyhow::Result<R> {
    let memory = match caller.get_export("memory").and_then(|e| e.into_memory()) {
        Some(memory) => memory,
        None => return Err(terminate(caller, Outcome::Abort(AbortCause::MissingMemory))),
    };
    let result = {
        let (data, ctx) = memory.data_and_store_mut(&mut *caller);
        let mut mem = LinearMemory::new(data);
        f(ctx, &mut mem)
    };
    result.map_err(|outcome| terminate(caller, outcome))
}

/// Wasm passes pointers and lengths as i32; they are unsigned offsets.
fn offset(raw: i32) -> u32 {
    raw as u32
}

/// Register every function in `imports` with the linker.
pub fn register_host_functions(
    linker: &mut Linker<ExecutionContext>,
    imports: &[HostFunction],
) -> anyhow::Result<()> {
    for function in imports {
        register(linker, *function)?;
    }
    Ok(())
}

fn register(linker: &mut Linker<ExecutionContext>, function: HostFunction) -> anyhow::Result<()> {
    let (module, name) = (function.namespace(), function.name());
    match function {
        // ── debug ──
        HostFunction::Print32 => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, value: i32| {
                with_context(&mut caller, |ctx| debug::print32(ctx, value))
            })?
        }
        HostFunction::Print64 => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, value: i64| {
                with_context(&mut caller, |ctx| debug::print64(ctx, value))
            })?
        }
        HostFunction::PrintMem => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, ptr: i32, len: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    debug::print_mem(ctx, mem, offset(ptr), offset(len))
                })
            })?
        }
        HostFunction::PrintMemHex => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, ptr: i32, len: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    debug::print_mem_hex(ctx, mem, offset(ptr), offset(len))
                })
            })?
        }
        HostFunction::PrintStorage => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, key_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    debug::print_storage(ctx, mem, offset(key_ptr))
                })
            })?
        }
        HostFunction::PrintStorageHex => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, key_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    debug::print_storage_hex(ctx, mem, offset(key_ptr))
                })
            })?
        }

        // ── ethereum: lifecycle ──
        HostFunction::Create => linker.func_wrap(
            module,
            name,
            |mut caller: Ctx<'_>, value_ptr: i32, data_ptr: i32, data_len: i32, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::create(
                        ctx,
                        mem,
                        offset(value_ptr),
                        offset(data_ptr),
                        offset(data_len),
                        offset(result_ptr),
                    )
                })
            },
        )?,
        HostFunction::SelfDestruct => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, receiver_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::self_destruct(ctx, mem, offset(receiver_ptr))
                })
            })?
        }
        HostFunction::Finish => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, ptr: i32, len: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::finish(ctx, mem, offset(ptr), offset(len))
                })
            })?
        }
        HostFunction::Revert => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, ptr: i32, len: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::revert(ctx, mem, offset(ptr), offset(len))
                })
            })?
        }

        // ── ethereum: nested calls ──
        HostFunction::Call | HostFunction::CallCode => {
            let call_type = if function == HostFunction::Call {
                CallType::Call
            } else {
                CallType::Code
            };
            linker.func_wrap(
                module,
                name,
                move |mut caller: Ctx<'_>,
                      gas: i64,
                      address_ptr: i32,
                      value_ptr: i32,
                      data_ptr: i32,
                      data_len: i32| {
                    with_memory(&mut caller, |ctx, mem| {
                        ethereum::call(
                            ctx,
                            mem,
                            call_type,
                            gas,
                            offset(address_ptr),
                            Some(offset(value_ptr)),
                            offset(data_ptr),
                            offset(data_len),
                        )
                    })
                },
            )?
        }
        HostFunction::CallDelegate | HostFunction::CallStatic => {
            let call_type = if function == HostFunction::CallDelegate {
                CallType::Delegate
            } else {
                CallType::Static
            };
            linker.func_wrap(
                module,
                name,
                move |mut caller: Ctx<'_>, gas: i64, address_ptr: i32, data_ptr: i32, data_len: i32| {
                    with_memory(&mut caller, |ctx, mem| {
                        ethereum::call(
                            ctx,
                            mem,
                            call_type,
                            gas,
                            offset(address_ptr),
                            None,
                            offset(data_ptr),
                            offset(data_len),
                        )
                    })
                },
            )?
        }

        // ── ethereum: call data, return data, code ──
        HostFunction::GetCallDataSize => linker.func_wrap(module, name, |mut caller: Ctx<'_>| {
            with_context(&mut caller, ethereum::get_call_data_size)
        })?,
        HostFunction::CallDataCopy => linker.func_wrap(
            module,
            name,
            |mut caller: Ctx<'_>, dest: i32, data_offset: i32, len: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::call_data_copy(ctx, mem, offset(dest), offset(data_offset), offset(len))
                })
            },
        )?,
        HostFunction::GetReturnDataSize => linker.func_wrap(module, name, |mut caller: Ctx<'_>| {
            with_context(&mut caller, ethereum::get_return_data_size)
        })?,
        HostFunction::ReturnDataCopy => linker.func_wrap(
            module,
            name,
            |mut caller: Ctx<'_>, dest: i32, data_offset: i32, len: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::return_data_copy(ctx, mem, offset(dest), offset(data_offset), offset(len))
                })
            },
        )?,
        HostFunction::GetCodeSize => linker.func_wrap(module, name, |mut caller: Ctx<'_>| {
            with_context(&mut caller, ethereum::get_code_size)
        })?,
        HostFunction::CodeCopy => linker.func_wrap(
            module,
            name,
            |mut caller: Ctx<'_>, dest: i32, code_offset: i32, len: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::code_copy(ctx, mem, offset(dest), offset(code_offset), offset(len))
                })
            },
        )?,

        // ── ethereum: storage ──
        HostFunction::StorageStore => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, key_ptr: i32, value_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::storage_store(ctx, mem, offset(key_ptr), offset(value_ptr))
                })
            })?
        }
        HostFunction::StorageLoad => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, key_ptr: i32, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::storage_load(ctx, mem, offset(key_ptr), offset(result_ptr))
                })
            })?
        }

        // ── ethereum: call environment ──
        HostFunction::GetAddress => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::get_address(ctx, mem, offset(result_ptr))
                })
            })?
        }
        HostFunction::GetCaller => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::get_caller(ctx, mem, offset(result_ptr))
                })
            })?
        }
        HostFunction::GetTxOrigin => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::get_tx_origin(ctx, mem, offset(result_ptr))
                })
            })?
        }
        HostFunction::GetCallValue => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::get_call_value(ctx, mem, offset(result_ptr))
                })
            })?
        }
        HostFunction::GetExternalBalance => linker.func_wrap(
            module,
            name,
            |mut caller: Ctx<'_>, address_ptr: i32, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::get_external_balance(ctx, mem, offset(address_ptr), offset(result_ptr))
                })
            },
        )?,
        HostFunction::GetGasLeft => linker.func_wrap(module, name, |mut caller: Ctx<'_>| {
            with_context(&mut caller, ethereum::get_gas_left)
        })?,

        // ── ethereum: block environment ──
        HostFunction::GetBlockTimestamp => linker.func_wrap(module, name, |mut caller: Ctx<'_>| {
            with_context(&mut caller, ethereum::get_block_timestamp)
        })?,
        HostFunction::GetBlockNumber => linker.func_wrap(module, name, |mut caller: Ctx<'_>| {
            with_context(&mut caller, ethereum::get_block_number)
        })?,
        HostFunction::GetBlockGasLimit => linker.func_wrap(module, name, |mut caller: Ctx<'_>| {
            with_context(&mut caller, ethereum::get_block_gas_limit)
        })?,
        HostFunction::GetBlockCoinbase => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::get_block_coinbase(ctx, mem, offset(result_ptr))
                })
            })?
        }
        HostFunction::GetBlockDifficulty => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::get_block_difficulty(ctx, mem, offset(result_ptr))
                })
            })?
        }
        HostFunction::GetTxGasPrice => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::get_tx_gas_price(ctx, mem, offset(result_ptr))
                })
            })?
        }
        HostFunction::GetBlockHash => {
            linker.func_wrap(module, name, |mut caller: Ctx<'_>, number: i64, result_ptr: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::get_block_hash(ctx, mem, number, offset(result_ptr))
                })
            })?
        }

        // ── ethereum: events ──
        HostFunction::Log => linker.func_wrap(
            module,
            name,
            |mut caller: Ctx<'_>,
             data_ptr: i32,
             data_len: i32,
             topic_count: i32,
             topic1: i32,
             topic2: i32,
             topic3: i32,
             topic4: i32| {
                with_memory(&mut caller, |ctx, mem| {
                    ethereum::log(
                        ctx,
                        mem,
                        offset(data_ptr),
                        offset(data_len),
                        offset(topic_count),
                        [offset(topic1), offset(topic2), offset(topic3), offset(topic4)],
                    )
                })
            },
        )?,
    };
    Ok(())
}
