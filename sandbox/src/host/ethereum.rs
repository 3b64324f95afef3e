//! `ethereum` namespace: the contract ABI.
//!
//! Pointers and lengths arrive as `u32` offsets into linear memory. Values
//! cross the ABI as 16 bytes little-endian, addresses as 20 bytes and
//! storage words as 32 bytes. `create`, the `call*` family and
//! `getBlockHash` answer with a [`ReturnCode`]; `finish`, `revert` and
//! `selfDestruct` always terminate.

use ewasm_hostapi::HostError;
use ewasm_primitives::codec::{right_pad_bytes, right_pad_word256, value_to_le_bytes};
use ewasm_primitives::crypto::{creation_nonce, new_contract_address};
use ewasm_primitives::types::{address_to_hex, MAX_LOG_TOPICS, VALUE_BYTE_SIZE};
use ewasm_primitives::{
    CallError, CallParams, CallType, LogEvent, Permission, ReturnCode, ZERO_ADDRESS,
};
use tracing::debug;

use crate::context::ExecutionContext;
use crate::contract::Contract;
use crate::dispatch::{call_from_site, CallRequest};
use crate::memory::LinearMemory;
use crate::outcome::{AbortCause, HostResult, Outcome};

// ── Contract lifecycle ──

/// Deploy `data` as init code and install its output as the new
/// contract's code. Writes the new address to `result_ptr`.
pub fn create(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    value_ptr: u32,
    data_ptr: u32,
    data_len: u32,
    result_ptr: u32,
) -> HostResult<i32> {
    let value = mem.read_value(value_ptr)?;
    let data = mem.read(data_ptr, data_len)?;
    let creator = ctx.params.callee;

    if let Err(err) = ctx.state.ensure_permission(&creator, Permission::CreateContract) {
        debug!(%err, "create refused");
        return Ok(ReturnCode::Error.as_i32());
    }

    let sequence = ctx.next_sequence();
    let nonce = creation_nonce(&ctx.vm().options().nonce, sequence);
    let address = new_contract_address(&creator, &nonce);
    // the account itself is opened on behalf of the caller
    if let Err(err) = ctx.state.create_account(&ctx.params.caller, &address) {
        debug!(%err, address = %address_to_hex(&address), "create could not open account");
        return Ok(ReturnCode::Error.as_i32());
    }

    let mut params = CallParams {
        origin: ctx.params.origin,
        caller: ctx.params.caller,
        callee: address,
        input: Vec::new(),
        value,
        gas: ctx.params.gas,
        call_type: CallType::Call,
    };
    let init = Contract::new(ctx.vm().clone(), data);
    let result = init.call(&ctx.state, &mut params);
    ctx.params.gas = params.gas;

    match result {
        Ok(runtime_code) => {
            debug!(
                address = %address_to_hex(&address),
                code_len = runtime_code.len(),
                "contract created"
            );
            ctx.state.init_wasm_code(&address, runtime_code)?;
            mem.write(result_ptr, &address)?;
            Ok(ReturnCode::Success.as_i32())
        }
        Err(err) if err.is_revert() => {
            debug!(address = %address_to_hex(&address), "init code reverted");
            Ok(ReturnCode::Revert.as_i32())
        }
        Err(err) => Err(AbortCause::Nested(err).into()),
    }
}

/// Hand the callee's balance bookkeeping to `receiver` and remove the
/// callee. Always terminates normally.
pub fn self_destruct(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    receiver_ptr: u32,
) -> HostResult<()> {
    let receiver = mem.read_address(receiver_ptr)?;
    let callee = ctx.params.callee;

    if ctx.state.get_account(&receiver)?.is_none() {
        ctx.state.create_account(&callee, &receiver)?;
    }
    let mut account = ctx
        .state
        .get_account(&callee)?
        .ok_or(AbortCause::MissingAccount(callee))?;
    // Credits the callee with its own balance, not the receiver.
    let balance = account.balance;
    account.add_to_balance(balance).map_err(HostError::from)?;
    ctx.state.update_account(account)?;
    ctx.state.remove_account(&callee)?;
    Err(Outcome::Normal)
}

// ── Nested calls ──

/// Shared body of `call`, `callCode`, `callDelegate` and `callStatic`.
///
/// The offered `gas` is credited back to the caller in full once the
/// nested call returns, whatever it consumed.
#[allow(clippy::too_many_arguments)]
pub fn call(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    call_type: CallType,
    gas: i64,
    address_ptr: u32,
    value_ptr: Option<u32>,
    data_ptr: u32,
    data_len: u32,
) -> HostResult<i32> {
    let target = mem.read_address(address_ptr)?;
    let value = match value_ptr {
        Some(ptr) => mem.read_value(ptr)?,
        None => 0,
    };
    let input = mem.read(data_ptr, data_len)?;
    let gas_limit = u64::try_from(gas).unwrap_or(0);

    let request = CallRequest {
        call_type,
        target,
        input,
        value,
        gas: gas_limit,
    };
    let result = call_from_site(&ctx.vm, &ctx.state, &mut ctx.params, request);
    ctx.params.gas = ctx.params.gas.saturating_add(gas_limit);

    match result {
        Ok(output) => {
            ctx.return_data = output;
            Ok(ReturnCode::Success.as_i32())
        }
        Err(CallError::Reverted { output }) => {
            ctx.return_data = output;
            Ok(ReturnCode::Revert.as_i32())
        }
        Err(err) => Err(AbortCause::Nested(err).into()),
    }
}

// ── Call data, return data and code ──

/// Sizes and counters cross the ABI as signed integers; values beyond
/// their range clamp to the maximum.
fn saturating_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn copy_slice(
    mem: &mut LinearMemory<'_>,
    source: &[u8],
    dest_ptr: u32,
    offset: u32,
    len: u32,
) -> HostResult<()> {
    if len == 0 {
        return Ok(());
    }
    let start = offset as usize;
    let end = start
        .checked_add(len as usize)
        .filter(|end| *end <= source.len())
        .ok_or(AbortCause::SliceOutOfBounds {
            offset,
            len,
            size: source.len(),
        })?;
    mem.write(dest_ptr, &source[start..end])?;
    Ok(())
}

pub fn get_call_data_size(ctx: &mut ExecutionContext) -> HostResult<i32> {
    Ok(saturating_i32(ctx.params.input.len()))
}

pub fn call_data_copy(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    dest_ptr: u32,
    offset: u32,
    len: u32,
) -> HostResult<()> {
    copy_slice(mem, &ctx.params.input, dest_ptr, offset, len)
}

pub fn get_return_data_size(ctx: &mut ExecutionContext) -> HostResult<i32> {
    Ok(saturating_i32(ctx.return_data.len()))
}

pub fn return_data_copy(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    dest_ptr: u32,
    offset: u32,
    len: u32,
) -> HostResult<()> {
    copy_slice(mem, &ctx.return_data, dest_ptr, offset, len)
}

/// Size of the running code, trailer excluded.
pub fn get_code_size(ctx: &mut ExecutionContext) -> HostResult<i32> {
    Ok(saturating_i32(ctx.code.len()))
}

pub fn code_copy(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    dest_ptr: u32,
    offset: u32,
    len: u32,
) -> HostResult<()> {
    copy_slice(mem, &ctx.code, dest_ptr, offset, len)
}

// ── Storage ──

pub fn storage_store(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    key_ptr: u32,
    value_ptr: u32,
) -> HostResult<()> {
    let key = mem.read_word(key_ptr)?;
    let value = mem.read_word(value_ptr)?;
    ctx.state.set_storage(&ctx.params.callee, &key, value)?;
    Ok(())
}

pub fn storage_load(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    key_ptr: u32,
    result_ptr: u32,
) -> HostResult<()> {
    let key = mem.read_word(key_ptr)?;
    let value = ctx.state.get_storage(&ctx.params.callee, &key)?;
    mem.write(result_ptr, &value)?;
    Ok(())
}

// ── Termination ──

pub fn finish(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    data_ptr: u32,
    data_len: u32,
) -> HostResult<()> {
    let data = mem.read(data_ptr, data_len)?;
    ctx.set_output(data);
    Err(Outcome::Normal)
}

pub fn revert(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    data_ptr: u32,
    data_len: u32,
) -> HostResult<()> {
    let data = mem.read(data_ptr, data_len)?;
    ctx.set_output(data);
    Err(Outcome::Revert)
}

// ── Call environment ──

pub fn get_address(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    result_ptr: u32,
) -> HostResult<()> {
    Ok(mem.write(result_ptr, &ctx.params.callee)?)
}

pub fn get_caller(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    result_ptr: u32,
) -> HostResult<()> {
    Ok(mem.write(result_ptr, &ctx.params.caller)?)
}

pub fn get_tx_origin(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    result_ptr: u32,
) -> HostResult<()> {
    Ok(mem.write(result_ptr, &ctx.params.origin)?)
}

pub fn get_call_value(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    result_ptr: u32,
) -> HostResult<()> {
    Ok(mem.write(result_ptr, &value_to_le_bytes(ctx.params.value))?)
}

pub fn get_external_balance(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    address_ptr: u32,
    result_ptr: u32,
) -> HostResult<()> {
    let address = mem.read_address(address_ptr)?;
    let account = ctx
        .state
        .get_account(&address)?
        .ok_or(AbortCause::MissingAccount(address))?;
    mem.write(result_ptr, &value_to_le_bytes(u128::from(account.balance)))?;
    Ok(())
}

pub fn get_gas_left(ctx: &mut ExecutionContext) -> HostResult<i64> {
    Ok(saturating_i64(ctx.params.gas))
}

// ── Block environment ──

pub fn get_block_timestamp(ctx: &mut ExecutionContext) -> HostResult<i64> {
    Ok(saturating_i64(ctx.state.blockchain().last_block_time()))
}

pub fn get_block_number(ctx: &mut ExecutionContext) -> HostResult<i64> {
    Ok(saturating_i64(ctx.state.blockchain().last_block_height()))
}

/// Reports the call's remaining gas; there is no separate block limit.
pub fn get_block_gas_limit(ctx: &mut ExecutionContext) -> HostResult<i64> {
    Ok(saturating_i64(ctx.params.gas))
}

pub fn get_block_coinbase(
    _ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    result_ptr: u32,
) -> HostResult<()> {
    Ok(mem.write(result_ptr, &ZERO_ADDRESS)?)
}

pub fn get_block_difficulty(
    _ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    result_ptr: u32,
) -> HostResult<()> {
    Ok(mem.write(result_ptr, &right_pad_word256(&[1]))?)
}

pub fn get_tx_gas_price(
    _ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    result_ptr: u32,
) -> HostResult<()> {
    Ok(mem.write(result_ptr, &right_pad_bytes(&[1], VALUE_BYTE_SIZE))?)
}

/// Write the hash of block `number`, which must be below the current
/// height and no further back than the configured lookback.
pub fn get_block_hash(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    number: i64,
    result_ptr: u32,
) -> HostResult<i32> {
    let blockchain = ctx.state.blockchain();
    let height = blockchain.last_block_height();
    let lookback = ctx.vm.config().max_block_lookback;
    let invalid = AbortCause::InvalidBlockNumber { number, height };

    let requested = u64::try_from(number).map_err(|_| invalid.clone())?;
    if requested >= height || height - requested > lookback {
        return Err(invalid.into());
    }
    let hash = blockchain.block_hash(requested)?;
    mem.write(result_ptr, &hash)?;
    Ok(ReturnCode::Success.as_i32())
}

// ── Events ──

/// Emit a log event with `topic_count` topics taken from the topic
/// pointers in order.
pub fn log(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    data_ptr: u32,
    data_len: u32,
    topic_count: u32,
    topic_ptrs: [u32; MAX_LOG_TOPICS],
) -> HostResult<()> {
    if topic_count as usize > MAX_LOG_TOPICS {
        return Err(AbortCause::TooManyTopics(topic_count).into());
    }
    let data = mem.read(data_ptr, data_len)?;
    let topics = topic_ptrs[..topic_count as usize]
        .iter()
        .map(|ptr| mem.read_word(*ptr))
        .collect::<Result<Vec<_>, _>>()?;
    ctx.state.log(LogEvent {
        address: ctx.params.callee,
        topics,
        data,
    })?;
    Ok(())
}
