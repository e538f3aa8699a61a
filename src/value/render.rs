//! Diagnostic text for tagged values.

use super::{Tag, TaggedValue};
use crate::heap::ExecHeap;
use crate::layout::{closure, string};
use crate::vm::VmResult;

pub fn render(heap: &ExecHeap, v: TaggedValue) -> VmResult<String> {
    Ok(match v.tag() {
        Tag::Int => v.word().as_int().to_string(),
        Tag::Float => render_float(v.word().as_float()),
        Tag::String => {
            let s = v.word().as_heap_ref();
            let len = string::length(heap, s)?;
            let units = (0..len).map(|i| string::char_at(heap, s, i)).collect::<VmResult<Vec<u16>>>()?;
            String::from_utf16_lossy(&units)
        }
        Tag::RawPtr => format!("{:#x}", v.word().as_uint()),
        Tag::HeapRef => "[object]".to_string(),
        Tag::Const => v.constant()?.keyword().to_string(),
    })
}

fn render_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else {
        format!("{f}")
    }
}

/// The `typeof` name of a value.
pub fn type_name(heap: &ExecHeap, v: TaggedValue) -> VmResult<&'static str> {
    Ok(match v.tag() {
        Tag::Int | Tag::Float => "number",
        Tag::String => "string",
        Tag::HeapRef if closure::is_closure(heap, v.word().as_heap_ref()) => "function",
        Tag::HeapRef => "object",
        Tag::RawPtr => "rawptr",
        Tag::Const => match v.constant()? {
            super::Constant::True | super::Constant::False => "boolean",
            super::Constant::Null => "object",
            super::Constant::Undef => "undefined",
        },
    })
}
