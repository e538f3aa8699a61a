//! Closures: a callable reference to compiled code or a native.
//!
//! ```text
//!  0  kind    u32
//!  4  native  u32   (0 = compiled function, 1 = native)
//!  8  target  u64   (function id or native index)
//! ```

use super::{Kind, kind_of, write_kind};
use crate::heap::{ExecHeap, HeapRef};
use crate::ir::FunId;
use crate::vm::{VmError, VmResult};

const OFF_NATIVE: usize = 4;
const OFF_TARGET: usize = 8;
const SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    Fun(FunId),
    Native(usize),
}

fn alloc(heap: &mut ExecHeap, native: bool, target: u64) -> VmResult<HeapRef> {
    let c = heap.allocate(SIZE)?;
    write_kind(heap, c, Kind::Closure)?;
    heap.write_u32(c, OFF_NATIVE, native as u32)?;
    heap.write_u64(c, OFF_TARGET, target)?;
    Ok(c)
}

pub fn new_closure(heap: &mut ExecHeap, fun: FunId) -> VmResult<HeapRef> {
    alloc(heap, false, fun.0 as u64)
}

pub fn new_native(heap: &mut ExecHeap, index: usize) -> VmResult<HeapRef> {
    alloc(heap, true, index as u64)
}

pub fn is_closure(heap: &ExecHeap, r: HeapRef) -> bool {
    matches!(kind_of(heap, r), Ok(Kind::Closure))
}

pub fn callee(heap: &ExecHeap, r: HeapRef) -> VmResult<Callee> {
    if !is_closure(heap, r) {
        return Err(VmError::NotCallable { found: "object" });
    }
    let target = heap.read_u64(r, OFF_TARGET)?;
    Ok(match heap.read_u32(r, OFF_NATIVE)? {
        0 => Callee::Fun(FunId(target as u32)),
        _ => Callee::Native(target as usize),
    })
}
