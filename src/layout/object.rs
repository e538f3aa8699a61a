//! Plain objects and their class descriptors.
//!
//! Object:
//! ```text
//!  0  kind   u32
//!  8  class  ref
//! 16  proto  ref or 0
//! 24  cap    u64
//! 32  words  ref -> u64 * cap
//! 40  tags   ref -> u8 * cap
//! ```
//!
//! Class descriptor (property name -> slot index, by position):
//! ```text
//!  0  kind   u32
//!  8  cap    u64
//! 16  count  u64
//! 24  names  ref -> u64 * cap   (interned string addresses)
//! ```
//!
//! Property names are interned strings, so lookup compares addresses.
//! Outgrown tables are replaced and the old ones are simply abandoned.

use super::{Kind, alloc_u64_array, expect_kind, read_ref, write_kind, write_ref};
use crate::heap::{ExecHeap, HeapRef};
use crate::value::{Tag, TaggedValue, Word};
use crate::vm::VmResult;

const OBJ_CLASS: usize = 8;
const OBJ_PROTO: usize = 16;
const OBJ_CAP: usize = 24;
const OBJ_WORDS: usize = 32;
const OBJ_TAGS: usize = 40;
const OBJ_SIZE: usize = 48;

const CLS_CAP: usize = 8;
const CLS_COUNT: usize = 16;
const CLS_NAMES: usize = 24;
const CLS_SIZE: usize = 32;

/// Allocate an object. If `class_slot` is empty a new class descriptor is
/// created and stored there, so callers sharing a slot share a class.
pub fn new_object(
    heap: &mut ExecHeap,
    class_slot: &mut Option<HeapRef>,
    proto: Option<HeapRef>,
    class_capacity: usize,
    slot_capacity: usize,
) -> VmResult<HeapRef> {
    let class = match *class_slot {
        Some(c) => c,
        None => {
            let c = new_class(heap, class_capacity.max(1))?;
            *class_slot = Some(c);
            c
        }
    };
    let cap = slot_capacity.max(1);
    let (words, tags) = alloc_slots(heap, cap)?;
    let obj = heap.allocate(OBJ_SIZE)?;
    write_kind(heap, obj, Kind::Object)?;
    write_ref(heap, obj, OBJ_CLASS, Some(class))?;
    write_ref(heap, obj, OBJ_PROTO, proto)?;
    heap.write_u64(obj, OBJ_CAP, cap as u64)?;
    write_ref(heap, obj, OBJ_WORDS, Some(words))?;
    write_ref(heap, obj, OBJ_TAGS, Some(tags))?;
    Ok(obj)
}

/// Slot tables start out holding `undefined`, so a slot laid out by a
/// shared class but never written reads as undefined.
fn alloc_slots(heap: &mut ExecHeap, cap: usize) -> VmResult<(HeapRef, HeapRef)> {
    let words = alloc_u64_array(heap, cap)?;
    let tags = heap.allocate(cap)?;
    for i in 0..cap {
        heap.write_u64(words, i * 8, TaggedValue::UNDEF.word().bits())?;
        heap.write_u8(tags, i, TaggedValue::UNDEF.tag() as u8)?;
    }
    Ok((words, tags))
}

fn new_class(heap: &mut ExecHeap, cap: usize) -> VmResult<HeapRef> {
    let names = alloc_u64_array(heap, cap)?;
    let cls = heap.allocate(CLS_SIZE)?;
    write_kind(heap, cls, Kind::Class)?;
    heap.write_u64(cls, CLS_CAP, cap as u64)?;
    heap.write_u64(cls, CLS_COUNT, 0)?;
    write_ref(heap, cls, CLS_NAMES, Some(names))?;
    Ok(cls)
}

fn required(heap: &ExecHeap, r: HeapRef, off: usize) -> VmResult<HeapRef> {
    read_ref(heap, r, off)?.ok_or(crate::vm::VmError::InvalidHeapAccess { addr: r.addr() + off, len: 8 })
}

pub fn class_of(heap: &ExecHeap, obj: HeapRef) -> VmResult<HeapRef> {
    expect_kind(heap, obj, Kind::Object)?;
    required(heap, obj, OBJ_CLASS)
}

pub fn proto_of(heap: &ExecHeap, obj: HeapRef) -> VmResult<Option<HeapRef>> {
    expect_kind(heap, obj, Kind::Object)?;
    read_ref(heap, obj, OBJ_PROTO)
}

/// Number of properties the class has laid out.
pub fn class_len(heap: &ExecHeap, class: HeapRef) -> VmResult<usize> {
    expect_kind(heap, class, Kind::Class)?;
    Ok(heap.read_u64(class, CLS_COUNT)? as usize)
}

fn find_index(heap: &ExecHeap, class: HeapRef, name: HeapRef) -> VmResult<Option<usize>> {
    let n = class_len(heap, class)?;
    let names = required(heap, class, CLS_NAMES)?;
    for i in 0..n {
        if heap.read_u64(names, i * 8)? as usize == name.addr() {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

fn add_name(heap: &mut ExecHeap, class: HeapRef, name: HeapRef) -> VmResult<usize> {
    let n = class_len(heap, class)?;
    let cap = heap.read_u64(class, CLS_CAP)? as usize;
    let mut names = required(heap, class, CLS_NAMES)?;
    if n == cap {
        let new_cap = cap * 2;
        let grown = alloc_u64_array(heap, new_cap)?;
        for i in 0..n {
            let v = heap.read_u64(names, i * 8)?;
            heap.write_u64(grown, i * 8, v)?;
        }
        write_ref(heap, class, CLS_NAMES, Some(grown))?;
        heap.write_u64(class, CLS_CAP, new_cap as u64)?;
        names = grown;
    }
    heap.write_u64(names, n * 8, name.addr() as u64)?;
    heap.write_u64(class, CLS_COUNT, (n + 1) as u64)?;
    Ok(n)
}

fn ensure_capacity(heap: &mut ExecHeap, obj: HeapRef, index: usize) -> VmResult<()> {
    let cap = heap.read_u64(obj, OBJ_CAP)? as usize;
    if index < cap {
        return Ok(());
    }
    let new_cap = (cap * 2).max(index + 1);
    let old_words = required(heap, obj, OBJ_WORDS)?;
    let old_tags = required(heap, obj, OBJ_TAGS)?;
    let (words, tags) = alloc_slots(heap, new_cap)?;
    for i in 0..cap {
        let w = heap.read_u64(old_words, i * 8)?;
        heap.write_u64(words, i * 8, w)?;
        let t = heap.read_u8(old_tags, i)?;
        heap.write_u8(tags, i, t)?;
    }
    write_ref(heap, obj, OBJ_WORDS, Some(words))?;
    write_ref(heap, obj, OBJ_TAGS, Some(tags))?;
    heap.write_u64(obj, OBJ_CAP, new_cap as u64)
}

fn read_slot(heap: &ExecHeap, obj: HeapRef, index: usize) -> VmResult<TaggedValue> {
    let words = required(heap, obj, OBJ_WORDS)?;
    let tags = required(heap, obj, OBJ_TAGS)?;
    let word = Word::from_bits(heap.read_u64(words, index * 8)?);
    let tag = Tag::try_from(heap.read_u8(tags, index)?)?;
    TaggedValue::new(word, tag)
}

/// Own property, then the prototype chain.
pub fn get_prop(heap: &ExecHeap, obj: HeapRef, name: HeapRef) -> VmResult<Option<TaggedValue>> {
    let mut cur = Some(obj);
    while let Some(o) = cur {
        let class = class_of(heap, o)?;
        if let Some(i) = find_index(heap, class, name)? {
            let cap = heap.read_u64(o, OBJ_CAP)? as usize;
            if i >= cap {
                return Ok(Some(TaggedValue::UNDEF));
            }
            return read_slot(heap, o, i).map(Some);
        }
        cur = proto_of(heap, o)?;
    }
    Ok(None)
}

/// Always writes an own property, adding it to the class when new.
pub fn set_prop(heap: &mut ExecHeap, obj: HeapRef, name: HeapRef, v: TaggedValue) -> VmResult<()> {
    let class = class_of(heap, obj)?;
    let index = match find_index(heap, class, name)? {
        Some(i) => i,
        None => add_name(heap, class, name)?,
    };
    ensure_capacity(heap, obj, index)?;
    let words = required(heap, obj, OBJ_WORDS)?;
    let tags = required(heap, obj, OBJ_TAGS)?;
    heap.write_u64(words, index * 8, v.word().bits())?;
    heap.write_u8(tags, index, v.tag() as u8)
}
