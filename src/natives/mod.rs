//! Host functions installed on the global object at construction.

use crate::layout::string;
use crate::value::{Tag, TaggedValue, type_name};
use crate::vm::{NativeFn, Vm, VmError, VmResult, not_callable};

const BUILTINS: &[(&str, NativeFn)] = &[
    ("print", print),
    ("typeof", type_of),
    ("String", to_string),
    ("length", length),
    ("charAt", char_at),
    ("call", call),
];

pub fn install(vm: &mut Vm) -> VmResult<()> {
    for (name, f) in BUILTINS {
        vm.define_native(name, *f)?;
    }
    tracing::debug!(count = BUILTINS.len(), "natives installed");
    Ok(())
}

fn arg(args: &[TaggedValue], i: usize) -> TaggedValue {
    args.get(i).copied().unwrap_or(TaggedValue::UNDEF)
}

fn string_arg(op: &'static str, args: &[TaggedValue], i: usize) -> VmResult<crate::heap::HeapRef> {
    let v = arg(args, i);
    match v.tag() {
        Tag::String => Ok(v.word().as_heap_ref()),
        _ => Err(VmError::TypeError { op, found: crate::value::tag_name(v.tag()) }),
    }
}

/// Renders each argument, space separated, on one line.
fn print(vm: &mut Vm, args: &[TaggedValue]) -> VmResult<TaggedValue> {
    let parts = args.iter().map(|v| vm.render(*v)).collect::<VmResult<Vec<_>>>()?;
    println!("{}", parts.join(" "));
    Ok(TaggedValue::UNDEF)
}

fn type_of(vm: &mut Vm, args: &[TaggedValue]) -> VmResult<TaggedValue> {
    let name = type_name(vm.heap(), arg(args, 0))?;
    Ok(TaggedValue::string(vm.intern(name)?))
}

fn to_string(vm: &mut Vm, args: &[TaggedValue]) -> VmResult<TaggedValue> {
    let v = arg(args, 0);
    if v.tag() == Tag::String {
        return Ok(v);
    }
    let text = vm.render(v)?;
    Ok(TaggedValue::string(string::alloc_str(vm.heap_mut(), &text)?))
}

fn length(vm: &mut Vm, args: &[TaggedValue]) -> VmResult<TaggedValue> {
    let s = string_arg("length", args, 0)?;
    Ok(TaggedValue::int(string::length(vm.heap(), s)? as i64))
}

/// One-unit string at an index, or `undefined` past the end.
fn char_at(vm: &mut Vm, args: &[TaggedValue]) -> VmResult<TaggedValue> {
    let s = string_arg("charAt", args, 0)?;
    let i = arg(args, 1).as_int()?;
    let len = string::length(vm.heap(), s)?;
    if i < 0 || i >= len as i64 {
        return Ok(TaggedValue::UNDEF);
    }
    let unit = string::char_at(vm.heap(), s, i as u32)?;
    Ok(TaggedValue::string(string::alloc_units(vm.heap_mut(), &[unit])?))
}

/// `call(f, ...args)`: re-enters the VM from the host side.
fn call(vm: &mut Vm, args: &[TaggedValue]) -> VmResult<TaggedValue> {
    let Some((callee, rest)) = args.split_first() else {
        return Err(not_callable(TaggedValue::UNDEF));
    };
    vm.call(*callee, rest)
}

#[cfg(test)]
mod tests {
    use crate::config::VmConfig;
    use crate::value::TaggedValue;
    use crate::vm::{Vm, VmError};

    fn vm() -> Vm {
        Vm::new(&VmConfig { stack_slots: 512, heap_bytes: 512 * 1024, startup: false }).unwrap()
    }

    fn eval(vm: &mut Vm, src: &str) -> String {
        let v = vm.load(src).unwrap();
        vm.render(v).unwrap()
    }

    #[test]
    fn builtins_are_globals() {
        let mut vm = vm();
        for name in ["print", "typeof", "String", "length", "charAt", "call"] {
            assert!(vm.global(name).unwrap().is_some(), "{name} missing");
        }
    }

    #[test]
    fn type_names() {
        let mut vm = vm();
        assert_eq!(eval(&mut vm, "typeof(1)"), "number");
        assert_eq!(eval(&mut vm, "typeof(\"s\")"), "string");
        assert_eq!(eval(&mut vm, "typeof(null)"), "object");
        assert_eq!(eval(&mut vm, "typeof(undefined)"), "undefined");
        assert_eq!(eval(&mut vm, "typeof(print)"), "function");
        assert_eq!(eval(&mut vm, "typeof(true)"), "boolean");
    }

    #[test]
    fn string_helpers() {
        let mut vm = vm();
        assert_eq!(eval(&mut vm, "length(\"hello\")"), "5");
        assert_eq!(eval(&mut vm, "charAt(\"hello\", 1)"), "e");
        assert_eq!(eval(&mut vm, "charAt(\"hello\", 9)"), "undefined");
        assert_eq!(eval(&mut vm, "String(2.5) + \"!\""), "2.5!");
    }

    #[test]
    fn print_returns_undefined() {
        let mut vm = vm();
        assert_eq!(vm.load("print(1, \"two\", null)").unwrap(), TaggedValue::UNDEF);
    }

    #[test]
    fn call_reenters_compiled_code() {
        let mut vm = vm();
        let src = "function twice(x) { return x * 2; }\ncall(twice, 21)";
        assert_eq!(eval(&mut vm, src), "42");
        assert_eq!(vm.stack().depth(), 0);
    }

    #[test]
    fn call_without_callee_fails() {
        let mut vm = vm();
        let r = vm.load("call()");
        assert!(matches!(r, Err(crate::vm::LoadError::Vm(VmError::NotCallable { .. }))));
    }
}
