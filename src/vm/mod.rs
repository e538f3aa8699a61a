use std::path::Path;

use crate::compiler::{self, CompileError};
use crate::config::VmConfig;
use crate::heap::{ExecHeap, HeapRef};
use crate::ir::{CodeRef, FunId, IrFunction};
use crate::layout::{closure, object, strtab};
use crate::lexer::{self, LexError};
use crate::natives;
use crate::ops::DispatchTable;
use crate::parser::{self, ParseError};
use crate::stack::DualStack;
use crate::value::{self, TaggedValue};

/// Fatal conditions. None of these is recovered inside the VM; the host
/// decides whether to abort.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    #[error("stack overflow: reserving {requested} slots with {available} free")]
    StackOverflow { requested: usize, available: usize },
    #[error("stack underflow: releasing {requested} slots with depth {depth}")]
    StackUnderflow { requested: usize, depth: usize },
    #[error("invalid stack slot {slot} (depth {depth})")]
    InvalidSlot { slot: usize, depth: usize },
    #[error("heap exhausted: {requested} bytes requested, {free} free")]
    HeapExhausted { requested: usize, free: usize },
    #[error("VM construction failed: {reason}")]
    Construction { reason: String },
    #[error("unsupported opcode: {op}")]
    UnsupportedOpcode { op: &'static str },
    #[error("stack depth after call is {found}, expected {expected}")]
    PostCondition { expected: usize, found: usize },
    #[error("unsupported value tag {tag}")]
    UnsupportedTag { tag: u8 },
    #[error("unsupported constant payload {bits:#018x}")]
    UnsupportedValue { bits: u64 },
    #[error("malformed unit '{name}': no entry instruction")]
    MalformedUnit { name: String },
    #[error("invalid heap access at {addr:#x} ({len} bytes)")]
    InvalidHeapAccess { addr: usize, len: usize },
    #[error("type error in {op}: unexpected {found}")]
    TypeError { op: &'static str, found: &'static str },
    #[error("{found} is not a function")]
    NotCallable { found: &'static str },
    #[error("{name} is not defined")]
    UndefinedGlobal { name: String },
    #[error("no function with id {id}")]
    UnknownFunction { id: u32 },
    #[error("host call nesting exceeded {limit} levels")]
    CallDepth { limit: usize },
    #[error("startup script failed: {0}")]
    Startup(#[source] Box<LoadError>),
}

impl VmError {
    /// Stable diagnostic code, see `diagnostic::registry`.
    pub fn code(&self) -> &'static str {
        match self {
            VmError::StackOverflow { .. } => "CVD-V001",
            VmError::StackUnderflow { .. } => "CVD-V002",
            VmError::InvalidSlot { .. } => "CVD-V003",
            VmError::HeapExhausted { .. } => "CVD-V004",
            VmError::Construction { .. } => "CVD-V005",
            VmError::UnsupportedOpcode { .. } => "CVD-V006",
            VmError::PostCondition { .. } => "CVD-V007",
            VmError::UnsupportedTag { .. } => "CVD-V008",
            VmError::UnsupportedValue { .. } => "CVD-V009",
            VmError::MalformedUnit { .. } => "CVD-V010",
            VmError::InvalidHeapAccess { .. } => "CVD-V011",
            VmError::TypeError { .. } => "CVD-V012",
            VmError::NotCallable { .. } => "CVD-V013",
            VmError::UndefinedGlobal { .. } => "CVD-V014",
            VmError::UnknownFunction { .. } => "CVD-V015",
            VmError::CallDepth { .. } => "CVD-V016",
            // Reported under the code of whatever went wrong inside it.
            VmError::Startup(inner) => inner.code().unwrap_or("CVD-V005"),
        }
    }
}

pub type VmResult<T> = Result<T, VmError>;

/// Anything `load` can fail with: front end or execution.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Vm(#[from] VmError),
    #[error("cannot read {path}: {source}")]
    Io { path: String, source: std::io::Error },
}

impl LoadError {
    pub fn code(&self) -> Option<&'static str> {
        match self {
            LoadError::Lex(e) => Some(e.code),
            LoadError::Parse(e) => Some(e.code),
            LoadError::Compile(e) => Some(e.code()),
            LoadError::Vm(e) => Some(e.code()),
            LoadError::Io { .. } => None,
        }
    }
}

/// Host function callable from scripts through a native closure.
pub type NativeFn = fn(&mut Vm, &[TaggedValue]) -> VmResult<TaggedValue>;

/// Number of hidden slots every activation pushes.
pub const FRAME_SLOTS: usize = 4;

// Offsets of the hidden slots, counted from the slot just above them.
pub const FRAME_ARGC: usize = 0;
pub const FRAME_THIS: usize = 1;
pub const FRAME_CLOSURE: usize = 2;
pub const FRAME_RET: usize = 3;

/// Source of the built-in globals loaded at construction.
pub const STARTUP_SCRIPT: &str = include_str!("startup.cv");

/// How deep host re-entry (`Vm::call` from a native) may nest. Each level
/// costs host stack, so this bounds it well below the thread's stack size.
pub const MAX_CALL_DEPTH: usize = 128;
const GLOBAL_CLASS_CAPACITY: usize = 32;
const GLOBAL_SLOT_CAPACITY: usize = 32;
const STRING_TABLE_CAPACITY: usize = 256;

pub struct Vm {
    pub(crate) stack: DualStack,
    pub(crate) heap: ExecHeap,
    /// Next instruction; `None` halts the dispatch loop.
    pub(crate) cursor: Option<CodeRef>,
    /// Function of the instruction being executed.
    pub(crate) current: FunId,
    /// Units currently running through `invoke`, outermost included.
    nesting: usize,
    code: Vec<IrFunction>,
    dispatch: DispatchTable,
    natives: Vec<(String, NativeFn)>,
    global_obj: HeapRef,
    global_class: HeapRef,
    strtab: HeapRef,
}

impl Vm {
    pub fn new(config: &VmConfig) -> VmResult<Self> {
        Self::with_dispatch(config, DispatchTable::core())
    }

    /// Construct with a custom dispatch table. Each step's failure aborts.
    pub fn with_dispatch(config: &VmConfig, dispatch: DispatchTable) -> VmResult<Self> {
        let stack = DualStack::new(config.stack_slots)?;
        let mut heap = ExecHeap::new(config.heap_bytes)?;

        let mut class_slot = None;
        let global_obj = object::new_object(&mut heap, &mut class_slot, None, GLOBAL_CLASS_CAPACITY, GLOBAL_SLOT_CAPACITY)?;
        let global_class = class_slot.ok_or_else(|| VmError::Construction {
            reason: "global object has no class descriptor".into(),
        })?;
        let strtab = strtab::new_string_table(&mut heap, STRING_TABLE_CAPACITY)?;

        let mut vm = Vm {
            stack,
            heap,
            cursor: None,
            current: FunId(0),
            nesting: 0,
            code: Vec::new(),
            dispatch,
            natives: Vec::new(),
            global_obj,
            global_class,
            strtab,
        };
        natives::install(&mut vm)?;

        if config.startup {
            vm.load(STARTUP_SCRIPT).map_err(|e| VmError::Startup(Box::new(e)))?;
        }
        tracing::debug!(
            stack_slots = config.stack_slots,
            heap_used = vm.heap.used(),
            functions = vm.code.len(),
            "vm ready"
        );
        Ok(vm)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn stack(&self) -> &DualStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut DualStack {
        &mut self.stack
    }

    pub fn heap(&self) -> &ExecHeap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut ExecHeap {
        &mut self.heap
    }

    pub fn global_object(&self) -> HeapRef {
        self.global_obj
    }

    pub fn global_class(&self) -> HeapRef {
        self.global_class
    }

    pub fn string_table(&self) -> HeapRef {
        self.strtab
    }

    pub fn cursor(&self) -> Option<CodeRef> {
        self.cursor
    }

    pub fn function(&self, id: FunId) -> VmResult<&IrFunction> {
        self.code.get(id.0 as usize).ok_or(VmError::UnknownFunction { id: id.0 })
    }

    pub fn functions(&self) -> &[IrFunction] {
        &self.code
    }

    // ── Strings and globals ──────────────────────────────────────────

    pub fn intern(&mut self, text: &str) -> VmResult<HeapRef> {
        strtab::intern(&mut self.heap, &mut self.strtab, text)
    }

    pub fn render(&self, v: TaggedValue) -> VmResult<String> {
        value::render(&self.heap, v)
    }

    pub fn global(&mut self, name: &str) -> VmResult<Option<TaggedValue>> {
        let key = self.intern(name)?;
        object::get_prop(&self.heap, self.global_obj, key)
    }

    pub fn set_global(&mut self, name: &str, v: TaggedValue) -> VmResult<()> {
        let key = self.intern(name)?;
        object::set_prop(&mut self.heap, self.global_obj, key, v)
    }

    /// Expose a host function as a global.
    pub fn define_native(&mut self, name: &str, f: NativeFn) -> VmResult<()> {
        let index = self.natives.len();
        self.natives.push((name.to_string(), f));
        let c = closure::new_native(&mut self.heap, index)?;
        self.set_global(name, TaggedValue::heap_ref(c))
    }

    pub(crate) fn native(&self, index: usize) -> VmResult<NativeFn> {
        self.natives
            .get(index)
            .map(|(_, f)| *f)
            .ok_or(VmError::NotCallable { found: "native" })
    }

    // ── Code ─────────────────────────────────────────────────────────

    pub fn register(&mut self, fun: IrFunction) -> FunId {
        let id = FunId(self.code.len() as u32);
        tracing::debug!(id = id.0, name = %fun.name, instrs = fun.instrs.len(), "function registered");
        self.code.push(fun);
        id
    }

    /// The dispatch loop: fetch, advance, invoke, until the cursor is null.
    pub fn run(&mut self) -> VmResult<()> {
        while let Some(at) = self.cursor {
            let fun = self.code.get(at.fun.0 as usize).ok_or(VmError::UnknownFunction { id: at.fun.0 })?;
            let instr = *fun.get(at.at).ok_or_else(|| VmError::MalformedUnit { name: fun.name.clone() })?;
            self.current = at.fun;
            self.cursor = instr.next.map(|n| CodeRef { fun: at.fun, at: n });
            let handler = self.dispatch.get(instr.op).ok_or(VmError::UnsupportedOpcode { op: instr.op.name() })?;
            tracing::trace!(op = instr.op.name(), at = at.at.0, depth = self.stack.depth(), "dispatch");
            handler(self, &instr)?;
        }
        Ok(())
    }

    /// Push the four hidden slots in their fixed order.
    pub(crate) fn push_frame(
        &mut self,
        ret: Option<CodeRef>,
        closure: TaggedValue,
        this: TaggedValue,
        argc: usize,
    ) -> VmResult<()> {
        self.stack.push(TaggedValue::code_ref(ret))?;
        self.stack.push(closure)?;
        self.stack.push(this)?;
        self.stack.push(TaggedValue::int(argc as i64))
    }

    /// Run a compiled unit as top-level code and return its single result.
    pub fn exec(&mut self, unit: FunId) -> VmResult<TaggedValue> {
        self.invoke(unit, TaggedValue::UNDEF, &[])
    }

    /// Call any callable value from the host, re-entrantly if need be.
    pub fn call(&mut self, callee: TaggedValue, args: &[TaggedValue]) -> VmResult<TaggedValue> {
        match closure::callee(&self.heap, callee.as_heap_ref().map_err(|_| not_callable(callee))?)? {
            closure::Callee::Fun(id) => self.invoke(id, callee, args),
            closure::Callee::Native(i) => {
                let f = self.native(i)?;
                f(self, args)
            }
        }
    }

    fn invoke(&mut self, unit: FunId, closure: TaggedValue, args: &[TaggedValue]) -> VmResult<TaggedValue> {
        let fun = self.function(unit)?;
        let entry = match fun.entry {
            Some(e) if fun.is_well_formed() => e,
            _ => return Err(VmError::MalformedUnit { name: fun.name.clone() }),
        };
        let params = fun.params as usize;
        if self.nesting >= MAX_CALL_DEPTH {
            return Err(VmError::CallDepth { limit: MAX_CALL_DEPTH });
        }
        tracing::debug!(unit = %fun.name, args = args.len(), nesting = self.nesting, "exec");

        let base = self.stack.depth();
        let saved_cursor = self.cursor;
        let saved_current = self.current;
        self.nesting += 1;
        let outcome = self.run_unit(CodeRef { fun: unit, at: entry }, closure, params, args, base);
        self.nesting -= 1;
        self.cursor = saved_cursor;
        self.current = saved_current;

        if outcome.is_err() {
            // Drop every slot the failed unit left live.
            let extra = self.stack.depth().saturating_sub(base);
            if let Err(e) = self.stack.release(extra) {
                tracing::warn!(error = %e, "stack not restored after failed call");
            }
        }
        outcome
    }

    fn run_unit(
        &mut self,
        entry: CodeRef,
        closure: TaggedValue,
        params: usize,
        args: &[TaggedValue],
        base: usize,
    ) -> VmResult<TaggedValue> {
        for i in 0..params {
            self.stack.push(args.get(i).copied().unwrap_or(TaggedValue::UNDEF))?;
        }
        self.push_frame(None, closure, TaggedValue::UNDEF, params)?;
        self.cursor = Some(entry);
        self.run()?;

        let depth = self.stack.depth();
        if depth != base + 1 {
            return Err(VmError::PostCondition { expected: base + 1, found: depth });
        }
        self.stack.pop()
    }

    // ── Source entry points ──────────────────────────────────────────

    /// Lex, parse and compile `source` into a registered unit.
    pub fn compile(&mut self, source: &str, name: &str) -> Result<FunId, LoadError> {
        let tokens = lexer::lex(source)?;
        let program = parser::parse(tokens)?;
        Ok(compiler::compile(self, &program, name)?)
    }

    pub fn load(&mut self, source: &str) -> Result<TaggedValue, LoadError> {
        let unit = self.compile(source, "<top>")?;
        Ok(self.exec(unit)?)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<TaggedValue, LoadError> {
        let source = std::fs::read_to_string(path)
            .map_err(|source| LoadError::Io { path: path.display().to_string(), source })?;
        let unit = self.compile(&source, &path.display().to_string())?;
        Ok(self.exec(unit)?)
    }
}

pub(crate) fn not_callable(v: TaggedValue) -> VmError {
    VmError::NotCallable { found: value::tag_name(v.tag()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Imm, IrBuilder, Opcode};
    use crate::value::Tag;

    fn config() -> VmConfig {
        VmConfig { stack_slots: 512, heap_bytes: 512 * 1024, startup: false }
    }

    fn vm() -> Vm {
        Vm::new(&config()).unwrap()
    }

    fn add_unit() -> IrFunction {
        let mut b = IrBuilder::new("add", 0);
        b.emit(Opcode::PushInt, 0, Imm::Int(1));
        b.emit(Opcode::PushInt, 0, Imm::Int(2));
        b.emit_op(Opcode::Add);
        b.emit(Opcode::Ret, 1, Imm::None);
        b.finish(0)
    }

    #[test]
    fn exec_push_push_add() {
        let mut vm = vm();
        let unit = vm.register(add_unit());
        let v = vm.exec(unit).unwrap();
        assert_eq!(v.tag(), Tag::Int);
        assert_eq!(v, TaggedValue::int(3));
        assert_eq!(vm.stack().depth(), 0);
        assert_eq!(vm.cursor(), None);
    }

    #[test]
    fn exec_rejects_empty_unit() {
        let mut vm = vm();
        let unit = vm.register(IrBuilder::new("empty", 0).finish(0));
        let err = vm.exec(unit).unwrap_err();
        assert!(matches!(err, VmError::MalformedUnit { ref name } if name == "empty"));
        assert_eq!(err.code(), "CVD-V010");
        assert_eq!(vm.stack().depth(), 0);
    }

    #[test]
    fn exec_rejects_unknown_unit() {
        let mut vm = vm();
        assert!(matches!(vm.exec(FunId(77)), Err(VmError::UnknownFunction { id: 77 })));
    }

    #[test]
    fn unit_without_ret_violates_post_condition() {
        let mut vm = vm();
        let mut b = IrBuilder::new("no_ret", 0);
        b.emit(Opcode::PushInt, 0, Imm::Int(1));
        b.emit(Opcode::PushInt, 0, Imm::Int(2));
        let unit = vm.register(b.finish(0));
        // Falls off the end with the frame and both values still live.
        let err = vm.exec(unit).unwrap_err();
        assert!(matches!(err, VmError::PostCondition { expected: 1, found: 6 }));
        assert_eq!(err.code(), "CVD-V007");
        assert_eq!(vm.stack().depth(), 0);
    }

    #[test]
    fn missing_handler_is_unsupported_opcode() {
        let mut table = DispatchTable::core();
        table.unregister(Opcode::Add);
        let mut vm = Vm::with_dispatch(&config(), table).unwrap();
        let unit = vm.register(add_unit());
        let err = vm.exec(unit).unwrap_err();
        assert!(matches!(err, VmError::UnsupportedOpcode { op: "add" }));
    }

    #[test]
    fn custom_handler_replaces_builtin() {
        fn always_seven(vm: &mut Vm, _: &crate::ir::Instr) -> VmResult<()> {
            vm.stack_mut().release(2)?;
            vm.stack_mut().push(TaggedValue::int(7))
        }
        let mut table = DispatchTable::core();
        table.register(Opcode::Add, always_seven);
        let mut vm = Vm::with_dispatch(&config(), table).unwrap();
        let unit = vm.register(add_unit());
        assert_eq!(vm.exec(unit).unwrap(), TaggedValue::int(7));
    }

    #[test]
    fn deep_recursion_overflows_the_stack() {
        let mut vm = vm();
        let err = vm.load("function down(n) { return down(n + 1); } down(0)").unwrap_err();
        assert!(matches!(err, LoadError::Vm(VmError::StackOverflow { .. })));
        assert_eq!(vm.stack().depth(), 0);
    }

    #[test]
    fn failed_load_releases_its_slots() {
        let mut vm = vm();
        vm.load("function f(a) { var t = a * 2; return t + missing; }").unwrap();
        for _ in 0..4 {
            let err = vm.load("f(1)").unwrap_err();
            assert!(matches!(err, LoadError::Vm(VmError::UndefinedGlobal { .. })));
            assert_eq!(vm.stack().depth(), 0);
        }
        // the VM is still usable afterwards
        assert_eq!(vm.load("1 + 1").unwrap(), TaggedValue::int(2));
    }

    #[test]
    fn unbounded_host_reentry_hits_call_depth() {
        let cfg = VmConfig { stack_slots: 1 << 16, ..config() };
        let mut vm = Vm::new(&cfg).unwrap();
        let err = vm.load("function f(n) { return call(f, n + 1); } f(0)").unwrap_err();
        match err {
            LoadError::Vm(e @ VmError::CallDepth { limit: MAX_CALL_DEPTH }) => assert_eq!(e.code(), "CVD-V016"),
            other => panic!("expected call depth error, got {other:?}"),
        }
        assert_eq!(vm.stack().depth(), 0);
        assert_eq!(vm.cursor(), None);

        let v = vm.load("function g(n) { if (n == 0) return 0; return call(g, n - 1) + 1; } g(100)").unwrap();
        assert_eq!(v, TaggedValue::int(100));
    }

    #[test]
    fn tiny_heap_is_exhausted() {
        let cfg = VmConfig { stack_slots: 64, heap_bytes: 16 * 1024, startup: false };
        let mut vm = Vm::new(&cfg).unwrap();
        let err = vm.load("var s = \"x\"; while (true) s = s + s;").unwrap_err();
        assert!(matches!(err, LoadError::Vm(VmError::HeapExhausted { .. })));
        assert_ne!(VmError::HeapExhausted { requested: 1, free: 0 }.code(), VmError::StackOverflow { requested: 1, available: 0 }.code());
    }

    #[test]
    fn bootstrap_creates_globals_and_string_table() {
        let mut vm = vm();
        assert_eq!(object::class_of(vm.heap(), vm.global_object()).unwrap(), vm.global_class());
        let a = vm.intern("same").unwrap();
        let b = vm.intern("same").unwrap();
        assert_eq!(a, b);
        vm.set_global("answer", TaggedValue::int(42)).unwrap();
        assert_eq!(vm.global("answer").unwrap(), Some(TaggedValue::int(42)));
        assert_eq!(vm.global("nope").unwrap(), None);
    }

    #[test]
    fn zero_sized_stack_fails_construction() {
        let cfg = VmConfig { stack_slots: 0, ..config() };
        assert!(matches!(Vm::new(&cfg), Err(VmError::Construction { .. })));
    }

    #[test]
    fn startup_failure_keeps_inner_code() {
        let mut table = DispatchTable::core();
        table.unregister(Opcode::Div);
        let cfg = VmConfig { startup: true, ..config() };
        let err = match Vm::with_dispatch(&cfg, table) {
            Ok(_) => panic!("startup should need div"),
            Err(e) => e,
        };
        assert!(matches!(&err, VmError::Startup(inner)
            if matches!(**inner, LoadError::Vm(VmError::UnsupportedOpcode { op: "div" }))));
        assert_eq!(err.code(), "CVD-V006");

        let exhausted = VmError::Startup(Box::new(LoadError::Vm(VmError::HeapExhausted { requested: 8, free: 0 })));
        assert_eq!(exhausted.code(), "CVD-V004");
    }

    #[test]
    fn startup_script_defines_helpers() {
        let cfg = VmConfig { startup: true, ..config() };
        let mut vm = Vm::new(&cfg).unwrap();
        let v = vm.load("max(3, abs(-9))").unwrap();
        assert_eq!(v, TaggedValue::int(9));
    }

    #[test]
    fn host_call_reenters_and_restores_cursor() {
        let mut vm = vm();
        vm.load("function add(a, b) { return a + b; }").unwrap();
        let f = vm.global("add").unwrap().unwrap();
        let v = vm.call(f, &[TaggedValue::int(2), TaggedValue::float(0.5)]).unwrap();
        assert_eq!(v, TaggedValue::float(2.5));
        assert_eq!(vm.cursor(), None);
        assert_eq!(vm.stack().depth(), 0);
        assert!(matches!(vm.call(TaggedValue::int(1), &[]), Err(VmError::NotCallable { .. })));
    }

    #[test]
    fn native_called_from_script_can_call_back() {
        fn twice(vm: &mut Vm, args: &[TaggedValue]) -> VmResult<TaggedValue> {
            let f = args.first().copied().unwrap_or(TaggedValue::UNDEF);
            let once = vm.call(f, &args[1..])?;
            vm.call(f, &[once])
        }
        let mut vm = vm();
        vm.define_native("twice", twice).unwrap();
        let v = vm.load("function inc(x) { return x + 1; } 10 * twice(inc, 4)").unwrap();
        assert_eq!(v, TaggedValue::int(60));
        assert_eq!(vm.stack().depth(), 0);
    }

    #[test]
    fn load_reports_front_end_errors() {
        let mut vm = vm();
        assert!(matches!(vm.load("var x = #;"), Err(LoadError::Lex(_))));
        assert!(matches!(vm.load("var = 1;"), Err(LoadError::Parse(_))));
        assert!(matches!(vm.load("function f() { function g() {} }"), Err(LoadError::Compile(_))));
        assert!(matches!(vm.load("missing + 1"), Err(LoadError::Vm(VmError::UndefinedGlobal { .. }))));
    }

    #[test]
    fn load_file_reads_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("six.cv");
        std::fs::write(&path, "var a = 2;\na * 3").unwrap();
        let mut vm = vm();
        assert_eq!(vm.load_file(&path).unwrap(), TaggedValue::int(6));
        assert!(matches!(vm.load_file(&dir.path().join("none.cv")), Err(LoadError::Io { .. })));
    }

    #[test]
    fn randomised_sums_match_host_arithmetic() {
        let mut vm = vm();
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..50 {
            let a = rng.i64(-1_000_000..1_000_000);
            let b = rng.i64(-1_000_000..1_000_000);
            let v = vm.load(&format!("{a} + {b}")).unwrap();
            assert_eq!(v, TaggedValue::int(a + b));
        }
    }
}
