//! Arithmetic, comparison and equality.
//!
//! Two integers stay integral while the result is exact and in range;
//! everything else falls back to doubles. `+` with a string on either side
//! concatenates.

use std::cmp::Ordering;

use super::truthy;
use crate::heap::ExecHeap;
use crate::ir::Instr;
use crate::layout::string;
use crate::value::{Tag, TaggedValue, render, tag_name};
use crate::vm::{Vm, VmError, VmResult};

fn operands(vm: &mut Vm) -> VmResult<(TaggedValue, TaggedValue)> {
    let b = vm.stack.pop()?;
    let a = vm.stack.pop()?;
    Ok((a, b))
}

fn numbers(op: &'static str, a: TaggedValue, b: TaggedValue) -> VmResult<(f64, f64)> {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => Ok((x, y)),
        (None, _) => Err(VmError::TypeError { op, found: tag_name(a.tag()) }),
        (_, None) => Err(VmError::TypeError { op, found: tag_name(b.tag()) }),
    }
}

/// Integer fast path with a double fallback.
fn numeric(
    vm: &mut Vm,
    op: &'static str,
    int: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> VmResult<()> {
    let (a, b) = operands(vm)?;
    if a.tag() == Tag::Int && b.tag() == Tag::Int {
        if let Some(n) = int(a.word().as_int(), b.word().as_int()) {
            return vm.stack.push(TaggedValue::int(n));
        }
    }
    let (x, y) = numbers(op, a, b)?;
    vm.stack.push(TaggedValue::float(float(x, y)))
}

pub(super) fn add(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    let a = vm.stack.get(1)?;
    let b = vm.stack.get(0)?;
    if a.tag() == Tag::String || b.tag() == Tag::String {
        vm.stack.release(2)?;
        let left = as_string(&mut vm.heap, a)?;
        let right = as_string(&mut vm.heap, b)?;
        let joined = string::concat(&mut vm.heap, left, right)?;
        return vm.stack.push(TaggedValue::string(joined));
    }
    numeric(vm, "add", i64::checked_add, |x, y| x + y)
}

fn as_string(heap: &mut ExecHeap, v: TaggedValue) -> VmResult<crate::heap::HeapRef> {
    if v.tag() == Tag::String {
        return Ok(v.word().as_heap_ref());
    }
    let text = render(heap, v)?;
    string::alloc_str(heap, &text)
}

pub(super) fn sub(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    numeric(vm, "sub", i64::checked_sub, |x, y| x - y)
}

pub(super) fn mul(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    numeric(vm, "mul", i64::checked_mul, |x, y| x * y)
}

pub(super) fn div(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    numeric(
        vm,
        "div",
        |x, y| if y != 0 && x.checked_rem(y) == Some(0) { x.checked_div(y) } else { None },
        |x, y| x / y,
    )
}

pub(super) fn rem(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    numeric(vm, "mod", |x, y| if y != 0 { x.checked_rem(y) } else { None }, |x, y| x % y)
}

pub(super) fn neg(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    let v = vm.stack.pop()?;
    let r = match v.tag() {
        Tag::Int => match v.word().as_int().checked_neg() {
            Some(n) => TaggedValue::int(n),
            None => TaggedValue::float(-(v.word().as_int() as f64)),
        },
        Tag::Float => TaggedValue::float(-v.word().as_float()),
        tag => return Err(VmError::TypeError { op: "neg", found: tag_name(tag) }),
    };
    vm.stack.push(r)
}

pub(super) fn not(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    let v = vm.stack.pop()?;
    let t = truthy(&vm.heap, v)?;
    vm.stack.push(TaggedValue::boolean(!t))
}

/// Numbers order numerically, strings by code unit. `None` means unordered (NaN).
fn compare(heap: &ExecHeap, op: &'static str, a: TaggedValue, b: TaggedValue) -> VmResult<Option<Ordering>> {
    if a.tag() == Tag::Int && b.tag() == Tag::Int {
        return Ok(Some(a.word().as_int().cmp(&b.word().as_int())));
    }
    if a.tag() == Tag::String && b.tag() == Tag::String {
        let x = string::units(heap, a.word().as_heap_ref())?;
        let y = string::units(heap, b.word().as_heap_ref())?;
        return Ok(Some(x.cmp(&y)));
    }
    let (x, y) = numbers(op, a, b)?;
    Ok(x.partial_cmp(&y))
}

fn relational(vm: &mut Vm, op: &'static str, pred: fn(Ordering) -> bool) -> VmResult<()> {
    let (a, b) = operands(vm)?;
    let r = compare(&vm.heap, op, a, b)?.is_some_and(pred);
    vm.stack.push(TaggedValue::boolean(r))
}

pub(super) fn lt(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    relational(vm, "lt", Ordering::is_lt)
}

pub(super) fn le(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    relational(vm, "le", Ordering::is_le)
}

pub(super) fn gt(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    relational(vm, "gt", Ordering::is_gt)
}

pub(super) fn ge(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    relational(vm, "ge", Ordering::is_ge)
}

/// Strict equality: numbers by value, strings by content, the rest by identity.
pub fn strict_equals(heap: &ExecHeap, a: TaggedValue, b: TaggedValue) -> VmResult<bool> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        if a.tag() == Tag::Int && b.tag() == Tag::Int {
            return Ok(a.word().as_int() == b.word().as_int());
        }
        return Ok(x == y);
    }
    if a.tag() == Tag::String && b.tag() == Tag::String {
        return string::equals(heap, a.word().as_heap_ref(), b.word().as_heap_ref());
    }
    Ok(a == b)
}

pub(super) fn eq(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    let (a, b) = operands(vm)?;
    let r = strict_equals(&vm.heap, a, b)?;
    vm.stack.push(TaggedValue::boolean(r))
}

pub(super) fn ne(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    let (a, b) = operands(vm)?;
    let r = strict_equals(&vm.heap, a, b)?;
    vm.stack.push(TaggedValue::boolean(!r))
}
