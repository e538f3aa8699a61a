//! Heap object layouts.
//!
//! Every object starts with a 32-bit kind word. The remaining layout is
//! per kind and documented in the submodule that owns it. All reads and
//! writes go through the bounds-checked accessors on [`ExecHeap`].

pub mod closure;
pub mod object;
pub mod string;
pub mod strtab;

use crate::heap::{ExecHeap, HeapRef};
use crate::vm::{VmError, VmResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Kind {
    String = 1,
    StringTable = 2,
    Object = 3,
    Class = 4,
    Closure = 5,
}

const OFF_KIND: usize = 0;

pub fn kind_of(heap: &ExecHeap, r: HeapRef) -> VmResult<Kind> {
    let k = heap.read_u32(r, OFF_KIND)?;
    Ok(match k {
        1 => Kind::String,
        2 => Kind::StringTable,
        3 => Kind::Object,
        4 => Kind::Class,
        5 => Kind::Closure,
        _ => return Err(VmError::InvalidHeapAccess { addr: r.addr(), len: 4 }),
    })
}

fn write_kind(heap: &mut ExecHeap, r: HeapRef, kind: Kind) -> VmResult<()> {
    heap.write_u32(r, OFF_KIND, kind as u32)
}

pub(crate) fn expect_kind(heap: &ExecHeap, r: HeapRef, want: Kind) -> VmResult<()> {
    match kind_of(heap, r)? {
        k if k == want => Ok(()),
        _ => Err(VmError::InvalidHeapAccess { addr: r.addr(), len: 4 }),
    }
}

/// Null-or-reference fields are stored as a raw address, 0 meaning none.
fn read_ref(heap: &ExecHeap, r: HeapRef, off: usize) -> VmResult<Option<HeapRef>> {
    let addr = heap.read_u64(r, off)? as usize;
    Ok((addr != 0).then(|| HeapRef::from_addr(addr)))
}

fn write_ref(heap: &mut ExecHeap, r: HeapRef, off: usize, v: Option<HeapRef>) -> VmResult<()> {
    heap.write_u64(r, off, v.map_or(0, |h| h.addr() as u64))
}

/// Allocate a headerless array of `len` 64-bit entries.
fn alloc_u64_array(heap: &mut ExecHeap, len: usize) -> VmResult<HeapRef> {
    let bytes = len.checked_mul(8).ok_or(VmError::HeapExhausted { requested: usize::MAX, free: heap.free() })?;
    heap.allocate(bytes)
}
