//! Opcode handlers and the dispatch table that maps opcodes to them.
//!
//! A handler runs with the cursor already pointing at the instruction's
//! successor. Control-flow handlers overwrite it.

mod arith;
mod control;
mod data;

use crate::heap::ExecHeap;
use crate::ir::{Instr, Opcode};
use crate::layout::string;
use crate::value::{Tag, TaggedValue};
use crate::vm::{Vm, VmError, VmResult};

pub use arith::strict_equals;

pub type Handler = fn(&mut Vm, &Instr) -> VmResult<()>;

/// Fixed-size table, one optional handler per opcode.
#[derive(Clone)]
pub struct DispatchTable {
    handlers: [Option<Handler>; Opcode::COUNT],
}

impl DispatchTable {
    /// No opcode is supported.
    pub fn empty() -> Self {
        DispatchTable { handlers: [None; Opcode::COUNT] }
    }

    /// Every opcode the compiler emits.
    pub fn core() -> Self {
        let mut t = Self::empty();
        t.register(Opcode::PushInt, data::push_int);
        t.register(Opcode::PushFloat, data::push_float);
        t.register(Opcode::PushStr, data::push_str);
        t.register(Opcode::PushConst, data::push_const);
        t.register(Opcode::Pop, data::pop);
        t.register(Opcode::Dup, data::dup);
        t.register(Opcode::Reserve, data::reserve);
        t.register(Opcode::GetLocal, data::get_local);
        t.register(Opcode::SetLocal, data::set_local);
        t.register(Opcode::Add, arith::add);
        t.register(Opcode::Sub, arith::sub);
        t.register(Opcode::Mul, arith::mul);
        t.register(Opcode::Div, arith::div);
        t.register(Opcode::Mod, arith::rem);
        t.register(Opcode::Neg, arith::neg);
        t.register(Opcode::Not, arith::not);
        t.register(Opcode::Lt, arith::lt);
        t.register(Opcode::Le, arith::le);
        t.register(Opcode::Gt, arith::gt);
        t.register(Opcode::Ge, arith::ge);
        t.register(Opcode::Eq, arith::eq);
        t.register(Opcode::Ne, arith::ne);
        t.register(Opcode::Jump, control::jump);
        t.register(Opcode::JumpFalse, control::jump_false);
        t.register(Opcode::GetGlobal, data::get_global);
        t.register(Opcode::SetGlobal, data::set_global);
        t.register(Opcode::NewClosure, data::new_closure);
        t.register(Opcode::Call, control::call);
        t.register(Opcode::Ret, control::ret);
        t
    }

    pub fn register(&mut self, op: Opcode, handler: Handler) {
        self.handlers[op as usize] = Some(handler);
    }

    pub fn unregister(&mut self, op: Opcode) {
        self.handlers[op as usize] = None;
    }

    #[inline]
    pub fn get(&self, op: Opcode) -> Option<Handler> {
        self.handlers[op as usize]
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::core()
    }
}

/// Truthiness used by conditional jumps and `!`.
pub fn truthy(heap: &ExecHeap, v: TaggedValue) -> VmResult<bool> {
    Ok(match v.tag() {
        Tag::Int => v.word().as_int() != 0,
        Tag::Float => {
            let f = v.word().as_float();
            f != 0.0 && !f.is_nan()
        }
        Tag::String => string::length(heap, v.word().as_heap_ref())? > 0,
        Tag::HeapRef | Tag::RawPtr => true,
        Tag::Const => v == TaggedValue::TRUE,
    })
}

fn bad_operand(instr: &Instr) -> VmError {
    VmError::TypeError { op: instr.op.name(), found: "operand" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;
    use crate::ir::{FunId, Imm, IrBuilder};

    fn vm() -> Vm {
        Vm::new(&VmConfig { stack_slots: 256, heap_bytes: 256 * 1024, startup: false }).unwrap()
    }

    fn run(vm: &mut Vm, build: impl FnOnce(&mut IrBuilder)) -> VmResult<TaggedValue> {
        let mut b = IrBuilder::new("t", 0);
        build(&mut b);
        b.emit(Opcode::Ret, 1, Imm::None);
        let id = vm.register(b.finish(0));
        vm.exec(id)
    }

    fn binary(vm: &mut Vm, op: Opcode, a: Imm, b: Imm) -> VmResult<TaggedValue> {
        let push = |imm: Imm| match imm {
            Imm::Float(_) => Opcode::PushFloat,
            Imm::Str(_) => Opcode::PushStr,
            _ => Opcode::PushInt,
        };
        run(vm, |bld| {
            bld.emit(push(a), 0, a);
            bld.emit(push(b), 0, b);
            bld.emit_op(op);
        })
    }

    #[test]
    fn core_table_covers_every_opcode() {
        let t = DispatchTable::core();
        for op in Opcode::ALL {
            assert!(t.get(op).is_some(), "{} has no handler", op.name());
        }
        assert!(DispatchTable::empty().get(Opcode::Add).is_none());
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        let mut vm = vm();
        assert_eq!(binary(&mut vm, Opcode::Add, Imm::Int(1), Imm::Int(2)).unwrap(), TaggedValue::int(3));
        assert_eq!(binary(&mut vm, Opcode::Sub, Imm::Int(1), Imm::Int(2)).unwrap(), TaggedValue::int(-1));
        assert_eq!(binary(&mut vm, Opcode::Mul, Imm::Int(6), Imm::Int(7)).unwrap(), TaggedValue::int(42));
        assert_eq!(binary(&mut vm, Opcode::Div, Imm::Int(8), Imm::Int(2)).unwrap(), TaggedValue::int(4));
        assert_eq!(binary(&mut vm, Opcode::Mod, Imm::Int(7), Imm::Int(3)).unwrap(), TaggedValue::int(1));
    }

    #[test]
    fn inexact_or_overflowing_results_become_floats() {
        let mut vm = vm();
        assert_eq!(binary(&mut vm, Opcode::Div, Imm::Int(1), Imm::Int(2)).unwrap(), TaggedValue::float(0.5));
        let big = binary(&mut vm, Opcode::Add, Imm::Int(i64::MAX), Imm::Int(1)).unwrap();
        assert_eq!(big.tag(), Tag::Float);
        let inf = binary(&mut vm, Opcode::Div, Imm::Int(1), Imm::Int(0)).unwrap();
        assert_eq!(inf, TaggedValue::float(f64::INFINITY));
        let nan = binary(&mut vm, Opcode::Mod, Imm::Int(1), Imm::Int(0)).unwrap();
        assert!(nan.word().as_float().is_nan());
        assert_eq!(binary(&mut vm, Opcode::Add, Imm::Int(1), Imm::Float(0.5)).unwrap(), TaggedValue::float(1.5));
    }

    #[test]
    fn string_concatenation_renders_other_side() {
        let mut vm = vm();
        let s = vm.intern("n=").unwrap();
        let v = binary(&mut vm, Opcode::Add, Imm::Str(s), Imm::Int(4)).unwrap();
        assert_eq!(vm.render(v).unwrap(), "n=4");
    }

    #[test]
    fn comparisons() {
        let mut vm = vm();
        assert_eq!(binary(&mut vm, Opcode::Lt, Imm::Int(1), Imm::Int(2)).unwrap(), TaggedValue::TRUE);
        assert_eq!(binary(&mut vm, Opcode::Ge, Imm::Int(1), Imm::Float(1.5)).unwrap(), TaggedValue::FALSE);
        assert_eq!(binary(&mut vm, Opcode::Eq, Imm::Int(2), Imm::Float(2.0)).unwrap(), TaggedValue::TRUE);
        let a = vm.intern("abc").unwrap();
        let b = vm.intern("abd").unwrap();
        assert_eq!(binary(&mut vm, Opcode::Lt, Imm::Str(a), Imm::Str(b)).unwrap(), TaggedValue::TRUE);
        assert_eq!(binary(&mut vm, Opcode::Ne, Imm::Str(a), Imm::Str(b)).unwrap(), TaggedValue::TRUE);
    }

    #[test]
    fn adding_a_constant_is_a_type_error() {
        let mut vm = vm();
        let r = run(&mut vm, |b| {
            b.emit(Opcode::PushInt, 0, Imm::Int(1));
            b.emit(Opcode::PushConst, 1, Imm::None);
            b.emit_op(Opcode::Add);
        });
        assert!(matches!(r, Err(VmError::TypeError { op: "add", .. })));
    }

    #[test]
    fn locals_and_dup() {
        let mut vm = vm();
        let v = run(&mut vm, |b| {
            b.emit(Opcode::Reserve, 2, Imm::None);
            b.emit(Opcode::PushInt, 0, Imm::Int(5));
            b.emit(Opcode::SetLocal, 2, Imm::None);
            b.emit(Opcode::GetLocal, 1, Imm::None);
            b.emit_op(Opcode::Dup);
            b.emit_op(Opcode::Mul);
            b.emit(Opcode::SetLocal, 1, Imm::None);
            b.emit(Opcode::SetLocal, 1, Imm::None);
        })
        .unwrap();
        assert_eq!(v, TaggedValue::int(25));
    }

    #[test]
    fn conditional_jump_skips_on_falsy() {
        let mut vm = vm();
        let v = run(&mut vm, |b| {
            b.emit(Opcode::PushConst, 3, Imm::None);
            let jf = b.emit(Opcode::JumpFalse, 0, Imm::None);
            b.emit(Opcode::PushInt, 0, Imm::Int(1));
            let j = b.emit(Opcode::Jump, 0, Imm::None);
            let alt = b.emit(Opcode::PushInt, 0, Imm::Int(2));
            let end = b.emit(Opcode::Dup, 0, Imm::None);
            b.emit(Opcode::Pop, 1, Imm::None);
            b.patch_target(jf, alt);
            b.patch_target(j, end);
        })
        .unwrap();
        assert_eq!(v, TaggedValue::int(2));
    }

    #[test]
    fn truthiness() {
        let mut vm = vm();
        let empty = vm.intern("").unwrap();
        let h = vm.heap();
        assert!(!truthy(h, TaggedValue::int(0)).unwrap());
        assert!(!truthy(h, TaggedValue::float(f64::NAN)).unwrap());
        assert!(!truthy(h, TaggedValue::string(empty)).unwrap());
        assert!(!truthy(h, TaggedValue::NULL).unwrap());
        assert!(!truthy(h, TaggedValue::UNDEF).unwrap());
        assert!(truthy(h, TaggedValue::TRUE).unwrap());
        assert!(truthy(h, TaggedValue::float(-0.5)).unwrap());
    }

    #[test]
    fn call_and_return_through_a_closure() {
        let mut vm = vm();
        // function (a, b) { return a - b; }
        let mut f = IrBuilder::new("sub", 2);
        f.emit(Opcode::GetLocal, 5, Imm::None);
        f.emit(Opcode::GetLocal, 5, Imm::None);
        f.emit_op(Opcode::Sub);
        f.emit(Opcode::Ret, 1, Imm::None);
        let sub = vm.register(f.finish(0));

        let v = run(&mut vm, |b| {
            b.emit(Opcode::PushInt, 0, Imm::Int(10));
            b.emit(Opcode::PushInt, 0, Imm::Int(4));
            b.emit(Opcode::PushInt, 0, Imm::Int(99));
            b.emit(Opcode::NewClosure, 0, Imm::Fun(sub));
            b.emit(Opcode::Call, 3, Imm::None);
        })
        .unwrap();
        assert_eq!(v, TaggedValue::int(6));
        assert_eq!(vm.stack().depth(), 0);
    }

    #[test]
    fn missing_arguments_read_as_undefined() {
        let mut vm = vm();
        let mut f = IrBuilder::new("second", 2);
        f.emit(Opcode::GetLocal, 4, Imm::None);
        f.emit(Opcode::Ret, 1, Imm::None);
        let second = vm.register(f.finish(0));
        let v = run(&mut vm, |b| {
            b.emit(Opcode::PushInt, 0, Imm::Int(1));
            b.emit(Opcode::NewClosure, 0, Imm::Fun(second));
            b.emit(Opcode::Call, 1, Imm::None);
        })
        .unwrap();
        assert_eq!(v, TaggedValue::UNDEF);
    }

    #[test]
    fn calling_a_number_fails() {
        let mut vm = vm();
        let r = run(&mut vm, |b| {
            b.emit(Opcode::PushInt, 0, Imm::Int(1));
            b.emit(Opcode::Call, 0, Imm::None);
        });
        assert!(matches!(r, Err(VmError::NotCallable { found: "number" })));
    }

    #[test]
    fn globals_round_trip_and_undefined_read_fails() {
        let mut vm = vm();
        let x = vm.intern("x").unwrap();
        let v = run(&mut vm, |b| {
            b.emit(Opcode::PushInt, 0, Imm::Int(7));
            b.emit(Opcode::SetGlobal, 0, Imm::Str(x));
            b.emit(Opcode::GetGlobal, 0, Imm::Str(x));
        })
        .unwrap();
        assert_eq!(v, TaggedValue::int(7));
        let missing = vm.intern("missing").unwrap();
        let r = run(&mut vm, |b| {
            b.emit(Opcode::GetGlobal, 0, Imm::Str(missing));
        });
        assert!(matches!(r, Err(VmError::UndefinedGlobal { ref name }) if name == "missing"));
    }

    #[test]
    fn closure_over_unknown_function_fails() {
        let mut vm = vm();
        let r = run(&mut vm, |b| {
            b.emit(Opcode::NewClosure, 0, Imm::Fun(FunId(999)));
        });
        assert!(matches!(r, Err(VmError::UnknownFunction { id: 999 })));
    }
}
