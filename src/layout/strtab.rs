//! String-interning table: open addressing with linear probing.
//!
//! ```text
//!  0  kind   u32
//!  8  cap    u64   (power of two)
//! 16  count  u64
//! 24  slots  u64 * cap   (string address, 0 = empty)
//! ```
//!
//! The table is replaced, not resized in place, when it passes 3/4 load;
//! the caller's table reference is updated.

use super::{Kind, expect_kind, string, write_kind};
use crate::heap::{ExecHeap, HeapRef};
use crate::vm::VmResult;

const OFF_CAP: usize = 8;
const OFF_COUNT: usize = 16;
const OFF_SLOTS: usize = 24;
const MIN_CAP: usize = 8;

pub fn new_string_table(heap: &mut ExecHeap, capacity: usize) -> VmResult<HeapRef> {
    let cap = capacity.max(MIN_CAP).next_power_of_two();
    let t = heap.allocate(OFF_SLOTS + cap * 8)?;
    write_kind(heap, t, Kind::StringTable)?;
    heap.write_u64(t, OFF_CAP, cap as u64)?;
    heap.write_u64(t, OFF_COUNT, 0)?;
    for i in 0..cap {
        heap.write_u64(t, OFF_SLOTS + i * 8, 0)?;
    }
    tracing::debug!(cap, "string table allocated");
    Ok(t)
}

pub fn capacity(heap: &ExecHeap, table: HeapRef) -> VmResult<usize> {
    expect_kind(heap, table, Kind::StringTable)?;
    Ok(heap.read_u64(table, OFF_CAP)? as usize)
}

pub fn count(heap: &ExecHeap, table: HeapRef) -> VmResult<usize> {
    expect_kind(heap, table, Kind::StringTable)?;
    Ok(heap.read_u64(table, OFF_COUNT)? as usize)
}

fn slot(heap: &ExecHeap, table: HeapRef, i: usize) -> VmResult<Option<HeapRef>> {
    super::read_ref(heap, table, OFF_SLOTS + i * 8)
}

/// Return the interned string for `text`, allocating it on first sight.
pub fn intern(heap: &mut ExecHeap, table: &mut HeapRef, text: &str) -> VmResult<HeapRef> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let h = string::hash_units(&units) as usize;
    let cap = capacity(heap, *table)?;
    let mask = cap - 1;

    let mut i = h & mask;
    loop {
        match slot(heap, *table, i)? {
            None => break,
            Some(s) => {
                if string::hash(heap, s)? as usize == h && string::units(heap, s)? == units {
                    return Ok(s);
                }
            }
        }
        i = (i + 1) & mask;
    }

    let s = string::alloc_units(heap, &units)?;
    let n = count(heap, *table)? + 1;
    if n * 4 > cap * 3 {
        *table = rehash(heap, *table, cap * 2)?;
        insert(heap, *table, s)?;
    } else {
        super::write_ref(heap, *table, OFF_SLOTS + i * 8, Some(s))?;
        heap.write_u64(*table, OFF_COUNT, n as u64)?;
    }
    Ok(s)
}

fn insert(heap: &mut ExecHeap, table: HeapRef, s: HeapRef) -> VmResult<()> {
    let mask = capacity(heap, table)? - 1;
    let mut i = string::hash(heap, s)? as usize & mask;
    while slot(heap, table, i)?.is_some() {
        i = (i + 1) & mask;
    }
    super::write_ref(heap, table, OFF_SLOTS + i * 8, Some(s))?;
    let n = count(heap, table)? + 1;
    heap.write_u64(table, OFF_COUNT, n as u64)
}

fn rehash(heap: &mut ExecHeap, old: HeapRef, new_cap: usize) -> VmResult<HeapRef> {
    let old_cap = capacity(heap, old)?;
    let fresh = new_string_table(heap, new_cap)?;
    for i in 0..old_cap {
        if let Some(s) = slot(heap, old, i)? {
            insert(heap, fresh, s)?;
        }
    }
    tracing::debug!(from = old_cap, to = new_cap, "string table grown");
    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut heap = ExecHeap::new(64 * 1024).unwrap();
        let mut t = new_string_table(&mut heap, 8).unwrap();
        let a = intern(&mut heap, &mut t, "length").unwrap();
        let b = intern(&mut heap, &mut t, "length").unwrap();
        let c = intern(&mut heap, &mut t, "width").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(count(&heap, t).unwrap(), 2);
    }

    #[test]
    fn table_grows_and_keeps_entries() {
        let mut heap = ExecHeap::new(256 * 1024).unwrap();
        let mut t = new_string_table(&mut heap, 8).unwrap();
        let first = t;
        let refs: Vec<HeapRef> = (0..100)
            .map(|i| intern(&mut heap, &mut t, &format!("name{i}")).unwrap())
            .collect();
        assert_ne!(t, first);
        assert!(capacity(&heap, t).unwrap() >= 128);
        assert_eq!(count(&heap, t).unwrap(), 100);
        for (i, r) in refs.iter().enumerate() {
            assert_eq!(intern(&mut heap, &mut t, &format!("name{i}")).unwrap(), *r);
        }
    }

    #[test]
    fn capacity_rounds_to_power_of_two() {
        let mut heap = ExecHeap::new(4096).unwrap();
        let t = new_string_table(&mut heap, 20).unwrap();
        assert_eq!(capacity(&heap, t).unwrap(), 32);
    }
}
