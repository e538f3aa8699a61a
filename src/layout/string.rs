//! String objects: a length-prefixed run of UTF-16 code units.
//!
//! ```text
//!  0  kind  u32
//!  4  len   u32   (code units)
//!  8  hash  u32
//! 12  (pad)
//! 16  units u16 * len
//! ```

use super::{Kind, expect_kind, write_kind};
use crate::heap::{ExecHeap, HeapRef};
use crate::vm::{VmError, VmResult};

const OFF_LEN: usize = 4;
const OFF_HASH: usize = 8;
const OFF_UNITS: usize = 16;

/// FNV-1a over code units.
pub fn hash_units(units: &[u16]) -> u32 {
    let mut h: u32 = 0x811C_9DC5;
    for &u in units {
        h ^= u as u32;
        h = h.wrapping_mul(0x0100_0193);
    }
    h
}

pub fn alloc_units(heap: &mut ExecHeap, units: &[u16]) -> VmResult<HeapRef> {
    let len = u32::try_from(units.len())
        .map_err(|_| VmError::HeapExhausted { requested: units.len() * 2, free: heap.free() })?;
    let s = heap.allocate(OFF_UNITS + units.len() * 2)?;
    write_kind(heap, s, Kind::String)?;
    heap.write_u32(s, OFF_LEN, len)?;
    heap.write_u32(s, OFF_HASH, hash_units(units))?;
    for (i, &u) in units.iter().enumerate() {
        heap.write_u16(s, OFF_UNITS + i * 2, u)?;
    }
    Ok(s)
}

/// Allocate a fresh, uninterned string.
pub fn alloc_str(heap: &mut ExecHeap, text: &str) -> VmResult<HeapRef> {
    let units: Vec<u16> = text.encode_utf16().collect();
    alloc_units(heap, &units)
}

pub fn length(heap: &ExecHeap, s: HeapRef) -> VmResult<u32> {
    expect_kind(heap, s, Kind::String)?;
    heap.read_u32(s, OFF_LEN)
}

pub fn char_at(heap: &ExecHeap, s: HeapRef, index: u32) -> VmResult<u16> {
    let len = length(heap, s)?;
    if index >= len {
        return Err(VmError::InvalidHeapAccess { addr: s.addr() + OFF_UNITS + index as usize * 2, len: 2 });
    }
    heap.read_u16(s, OFF_UNITS + index as usize * 2)
}

pub fn hash(heap: &ExecHeap, s: HeapRef) -> VmResult<u32> {
    expect_kind(heap, s, Kind::String)?;
    heap.read_u32(s, OFF_HASH)
}

pub fn units(heap: &ExecHeap, s: HeapRef) -> VmResult<Vec<u16>> {
    let len = length(heap, s)?;
    (0..len).map(|i| heap.read_u16(s, OFF_UNITS + i as usize * 2)).collect()
}

pub fn to_rust_string(heap: &ExecHeap, s: HeapRef) -> VmResult<String> {
    Ok(String::from_utf16_lossy(&units(heap, s)?))
}

/// Content equality.
pub fn equals(heap: &ExecHeap, a: HeapRef, b: HeapRef) -> VmResult<bool> {
    if a == b {
        return Ok(true);
    }
    if length(heap, a)? != length(heap, b)? || hash(heap, a)? != hash(heap, b)? {
        return Ok(false);
    }
    Ok(units(heap, a)? == units(heap, b)?)
}

/// Concatenate two strings into a new uninterned one.
pub fn concat(heap: &mut ExecHeap, a: HeapRef, b: HeapRef) -> VmResult<HeapRef> {
    let mut all = units(heap, a)?;
    all.extend(units(heap, b)?);
    alloc_units(heap, &all)
}
