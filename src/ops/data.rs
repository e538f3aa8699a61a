//! Constants, stack shuffling, locals, globals and closure creation.

use super::bad_operand;
use crate::ir::{Imm, Instr};
use crate::layout::{closure, object, string};
use crate::value::{Constant, TaggedValue};
use crate::vm::{Vm, VmError, VmResult};

pub(super) fn push_int(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let Imm::Int(n) = instr.imm else { return Err(bad_operand(instr)) };
    vm.stack.push(TaggedValue::int(n))
}

pub(super) fn push_float(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let Imm::Float(f) = instr.imm else { return Err(bad_operand(instr)) };
    vm.stack.push(TaggedValue::float(f))
}

pub(super) fn push_str(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let Imm::Str(s) = instr.imm else { return Err(bad_operand(instr)) };
    vm.stack.push(TaggedValue::string(s))
}

pub(super) fn push_const(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let c = Constant::from_operand(instr.a).ok_or(VmError::UnsupportedValue { bits: instr.a as u64 })?;
    vm.stack.push(c.value())
}

pub(super) fn pop(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    vm.stack.release(instr.a as usize)
}

pub(super) fn dup(vm: &mut Vm, _instr: &Instr) -> VmResult<()> {
    let v = vm.stack.get(0)?;
    vm.stack.push(v)
}

/// Make room for `a` locals, all undefined.
pub(super) fn reserve(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let n = instr.a as usize;
    vm.stack.reserve(n)?;
    for slot in 0..n {
        vm.stack.set(slot, TaggedValue::UNDEF)?;
    }
    Ok(())
}

pub(super) fn get_local(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let v = vm.stack.get(instr.a as usize)?;
    vm.stack.push(v)
}

/// Store the top into slot `a` (counted with the top still live), then drop it.
pub(super) fn set_local(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    vm.stack.move_slot(0, instr.a as usize)?;
    vm.stack.release(1)
}

pub(super) fn get_global(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let Imm::Str(name) = instr.imm else { return Err(bad_operand(instr)) };
    match object::get_prop(&vm.heap, vm.global_object(), name)? {
        Some(v) => vm.stack.push(v),
        None => Err(VmError::UndefinedGlobal { name: string::to_rust_string(&vm.heap, name)? }),
    }
}

pub(super) fn set_global(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let Imm::Str(name) = instr.imm else { return Err(bad_operand(instr)) };
    let v = vm.stack.pop()?;
    let global = vm.global_object();
    object::set_prop(&mut vm.heap, global, name, v)
}

pub(super) fn new_closure(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let Imm::Fun(id) = instr.imm else { return Err(bad_operand(instr)) };
    vm.function(id)?;
    let c = closure::new_closure(&mut vm.heap, id)?;
    vm.stack.push(TaggedValue::heap_ref(c))
}
