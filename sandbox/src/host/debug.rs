//! `debug` namespace: diagnostic output.
//!
//! Every function emits one print event attributed to the callee. None of
//! them produce a result; a failed emission aborts.

use ewasm_primitives::PrintEvent;

use crate::context::ExecutionContext;
use crate::memory::LinearMemory;
use crate::outcome::HostResult;

fn emit(ctx: &mut ExecutionContext, data: Vec<u8>) -> HostResult<()> {
    let address = ctx.params.callee;
    ctx.state.print(PrintEvent { address, data })?;
    Ok(())
}

pub fn print32(ctx: &mut ExecutionContext, value: i32) -> HostResult<()> {
    emit(ctx, value.to_string().into_bytes())
}

pub fn print64(ctx: &mut ExecutionContext, value: i64) -> HostResult<()> {
    emit(ctx, value.to_string().into_bytes())
}

pub fn print_mem(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    ptr: u32,
    len: u32,
) -> HostResult<()> {
    let data = mem.read(ptr, len)?;
    emit(ctx, data)
}

pub fn print_mem_hex(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    ptr: u32,
    len: u32,
) -> HostResult<()> {
    let data = mem.read(ptr, len)?;
    emit(ctx, hex::encode(data).into_bytes())
}

fn load_storage(
    ctx: &ExecutionContext,
    mem: &LinearMemory<'_>,
    key_ptr: u32,
) -> HostResult<[u8; 32]> {
    let key = mem.read_word(key_ptr)?;
    Ok(ctx.state.get_storage(&ctx.params.callee, &key)?)
}

pub fn print_storage(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    key_ptr: u32,
) -> HostResult<()> {
    let value = load_storage(ctx, mem, key_ptr)?;
    emit(ctx, value.to_vec())
}

pub fn print_storage_hex(
    ctx: &mut ExecutionContext,
    mem: &mut LinearMemory<'_>,
    key_ptr: u32,
) -> HostResult<()> {
    let value = load_storage(ctx, mem, key_ptr)?;
    emit(ctx, hex::encode(value).into_bytes())
}
