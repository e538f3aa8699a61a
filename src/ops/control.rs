//! Jumps, calls and returns.
//!
//! Frame layout seen by a callee, top first:
//! ```text
//!   ...temporaries and locals...
//!   argc            (int)
//!   this
//!   closure
//!   return address  (raw pointer, null at the outermost frame)
//!   arg[argc-1] ... arg[0]
//! ```

use super::{bad_operand, truthy};
use crate::ir::{CodeRef, Imm, Instr};
use crate::layout::closure::{self, Callee};
use crate::value::{Tag, TaggedValue};
use crate::vm::{FRAME_ARGC, FRAME_RET, FRAME_SLOTS, Vm, VmError, VmResult, not_callable};

pub(super) fn jump(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let Imm::Target(t) = instr.imm else { return Err(bad_operand(instr)) };
    vm.cursor = Some(CodeRef { fun: vm.current, at: t });
    Ok(())
}

pub(super) fn jump_false(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let v = vm.stack.pop()?;
    if truthy(&vm.heap, v)? {
        return Ok(());
    }
    jump(vm, instr)
}

/// `a` arguments sit below the callee value on top of the stack.
pub(super) fn call(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let argc = instr.a as usize;
    let callee = vm.stack.pop()?;
    if callee.tag() != Tag::HeapRef {
        return Err(not_callable(callee));
    }
    match closure::callee(&vm.heap, callee.word().as_heap_ref())? {
        Callee::Fun(id) => {
            let fun = vm.function(id)?;
            let params = fun.params as usize;
            let entry = fun
                .entry
                .filter(|_| fun.is_well_formed())
                .ok_or_else(|| VmError::MalformedUnit { name: fun.name.clone() })?;
            if argc > params {
                vm.stack.release(argc - params)?;
            }
            for _ in argc..params {
                vm.stack.push(TaggedValue::UNDEF)?;
            }
            vm.push_frame(vm.cursor, callee, TaggedValue::UNDEF, params)?;
            vm.cursor = Some(CodeRef { fun: id, at: entry });
            Ok(())
        }
        Callee::Native(index) => {
            let f = vm.native(index)?;
            let args = (0..argc).rev().map(|slot| vm.stack.get(slot)).collect::<VmResult<Vec<_>>>()?;
            vm.stack.release(argc)?;
            let result = f(vm, &args)?;
            vm.stack.push(result)
        }
    }
}

/// `a` is the number of live slots above the frame, the result included.
pub(super) fn ret(vm: &mut Vm, instr: &Instr) -> VmResult<()> {
    let above = instr.a as usize;
    let result = vm.stack.get(0)?;
    let argc = vm.stack.get(above + FRAME_ARGC)?.as_int()?;
    let argc = usize::try_from(argc).map_err(|_| VmError::TypeError { op: "ret", found: "argc" })?;
    let ret = vm.stack.get(above + FRAME_RET)?.as_code_ref()?;
    vm.stack.release(above + FRAME_SLOTS + argc)?;
    vm.stack.push(result)?;
    vm.cursor = ret;
    Ok(())
}
