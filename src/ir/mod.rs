//! Linear IR consumed by the dispatch loop.
//!
//! A compiled unit is an [`IrFunction`]: a vector of [`Instr`]s linked into
//! a chain by their `next` field. Control flow is nothing more than that
//! chain plus the handlers that overwrite the cursor (jumps, calls, returns).

use std::fmt;

use crate::heap::HeapRef;

// ── Opcodes ──────────────────────────────────────────────────────────

/// Compact opcode enumeration; the dispatch table is indexed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // constants
    PushInt,
    PushFloat,
    PushStr,
    PushConst,
    // stack
    Pop,
    Dup,
    Reserve,
    GetLocal,
    SetLocal,
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Not,
    // comparison
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    // control
    Jump,
    JumpFalse,
    // globals and functions
    GetGlobal,
    SetGlobal,
    NewClosure,
    Call,
    Ret,
}

impl Opcode {
    pub const COUNT: usize = Opcode::Ret as usize + 1;

    pub const ALL: [Opcode; Opcode::COUNT] = [
        Opcode::PushInt, Opcode::PushFloat, Opcode::PushStr, Opcode::PushConst,
        Opcode::Pop, Opcode::Dup, Opcode::Reserve, Opcode::GetLocal, Opcode::SetLocal,
        Opcode::Add, Opcode::Sub, Opcode::Mul, Opcode::Div, Opcode::Mod, Opcode::Neg, Opcode::Not,
        Opcode::Lt, Opcode::Le, Opcode::Gt, Opcode::Ge, Opcode::Eq, Opcode::Ne,
        Opcode::Jump, Opcode::JumpFalse,
        Opcode::GetGlobal, Opcode::SetGlobal, Opcode::NewClosure, Opcode::Call, Opcode::Ret,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Opcode::PushInt => "push_int",
            Opcode::PushFloat => "push_float",
            Opcode::PushStr => "push_str",
            Opcode::PushConst => "push_const",
            Opcode::Pop => "pop",
            Opcode::Dup => "dup",
            Opcode::Reserve => "reserve",
            Opcode::GetLocal => "get_local",
            Opcode::SetLocal => "set_local",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::Neg => "neg",
            Opcode::Not => "not",
            Opcode::Lt => "lt",
            Opcode::Le => "le",
            Opcode::Gt => "gt",
            Opcode::Ge => "ge",
            Opcode::Eq => "eq",
            Opcode::Ne => "ne",
            Opcode::Jump => "jump",
            Opcode::JumpFalse => "jump_false",
            Opcode::GetGlobal => "get_global",
            Opcode::SetGlobal => "set_global",
            Opcode::NewClosure => "new_closure",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
        }
    }
}

// ── Instructions ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrId(pub u32);

/// Immediate operand. Only handlers look at it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Imm {
    None,
    Int(i64),
    Float(f64),
    Str(HeapRef),
    Fun(FunId),
    Target(InstrId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instr {
    pub op: Opcode,
    /// Small unsigned operand: slot index, count, or constant selector.
    pub a: u32,
    pub imm: Imm,
    pub next: Option<InstrId>,
}

/// A position in the code table: function plus instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeRef {
    pub fun: FunId,
    pub at: InstrId,
}

impl CodeRef {
    /// Packs into a non-zero word so that zero can mean "no return address".
    pub fn to_bits(self) -> u64 {
        ((self.fun.0 as u64 + 1) << 32) | self.at.0 as u64
    }

    pub fn from_bits(bits: u64) -> Option<CodeRef> {
        let hi = bits >> 32;
        if hi == 0 {
            return None;
        }
        Some(CodeRef { fun: FunId((hi - 1) as u32), at: InstrId(bits as u32) })
    }
}

// ── Compiled units ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IrFunction {
    pub name: String,
    pub params: u32,
    pub locals: u32,
    pub instrs: Vec<Instr>,
    pub entry: Option<InstrId>,
}

impl IrFunction {
    pub fn get(&self, id: InstrId) -> Option<&Instr> {
        self.instrs.get(id.0 as usize)
    }

    /// A unit the dispatch loop can start on.
    pub fn is_well_formed(&self) -> bool {
        self.entry.is_some_and(|e| (e.0 as usize) < self.instrs.len())
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "function {} (params {}, locals {})", self.name, self.params, self.locals)?;
        for (i, inst) in self.instrs.iter().enumerate() {
            write!(f, "  {i:04}  {}", inst.op.name())?;
            match inst.op {
                Opcode::Pop | Opcode::Reserve | Opcode::GetLocal | Opcode::SetLocal
                | Opcode::PushConst | Opcode::Call | Opcode::Ret => write!(f, " {}", inst.a)?,
                _ => {}
            }
            match inst.imm {
                Imm::None => {}
                Imm::Int(n) => write!(f, " {n}")?,
                Imm::Float(x) => write!(f, " {x:?}")?,
                Imm::Str(r) => write!(f, " str@{:#x}", r.addr())?,
                Imm::Fun(id) => write!(f, " fn#{}", id.0)?,
                Imm::Target(t) => write!(f, " -> {:04}", t.0)?,
            }
            match inst.next {
                Some(n) if n.0 as usize != i + 1 => writeln!(f, "  ; next {:04}", n.0)?,
                None => writeln!(f, "  ; end")?,
                _ => writeln!(f)?,
            }
        }
        Ok(())
    }
}

/// Appends instructions and links each to its successor.
pub struct IrBuilder {
    name: String,
    params: u32,
    instrs: Vec<Instr>,
}

impl IrBuilder {
    pub fn new(name: impl Into<String>, params: u32) -> Self {
        IrBuilder { name: name.into(), params, instrs: Vec::new() }
    }

    /// Id the next emitted instruction will get.
    pub fn here(&self) -> InstrId {
        InstrId(self.instrs.len() as u32)
    }

    pub fn emit(&mut self, op: Opcode, a: u32, imm: Imm) -> InstrId {
        let id = self.here();
        if let Some(prev) = self.instrs.last_mut() {
            prev.next = Some(id);
        }
        self.instrs.push(Instr { op, a, imm, next: None });
        id
    }

    pub fn emit_op(&mut self, op: Opcode) -> InstrId {
        self.emit(op, 0, Imm::None)
    }

    pub fn patch_target(&mut self, at: InstrId, target: InstrId) {
        if let Some(inst) = self.instrs.get_mut(at.0 as usize) {
            inst.imm = Imm::Target(target);
        }
    }

    pub fn finish(self, locals: u32) -> IrFunction {
        let entry = if self.instrs.is_empty() { None } else { Some(InstrId(0)) };
        IrFunction { name: self.name, params: self.params, locals, instrs: self.instrs, entry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_table_is_dense() {
        for (i, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(*op as usize, i, "{} out of place", op.name());
        }
    }

    #[test]
    fn builder_links_chain() {
        let mut b = IrBuilder::new("t", 0);
        b.emit(Opcode::PushInt, 0, Imm::Int(1));
        b.emit(Opcode::PushInt, 0, Imm::Int(2));
        b.emit_op(Opcode::Add);
        let f = b.finish(0);
        assert_eq!(f.entry, Some(InstrId(0)));
        assert_eq!(f.instrs[0].next, Some(InstrId(1)));
        assert_eq!(f.instrs[1].next, Some(InstrId(2)));
        assert_eq!(f.instrs[2].next, None);
        assert!(f.is_well_formed());
    }

    #[test]
    fn empty_builder_has_no_entry() {
        let f = IrBuilder::new("empty", 0).finish(0);
        assert_eq!(f.entry, None);
        assert!(!f.is_well_formed());
    }

    #[test]
    fn code_ref_packing() {
        let at = CodeRef { fun: FunId(0), at: InstrId(0) };
        assert_ne!(at.to_bits(), 0);
        assert_eq!(CodeRef::from_bits(at.to_bits()), Some(at));
        let far = CodeRef { fun: FunId(70_000), at: InstrId(123_456) };
        assert_eq!(CodeRef::from_bits(far.to_bits()), Some(far));
        assert_eq!(CodeRef::from_bits(0), None);
    }

    #[test]
    fn listing_shows_ops() {
        let mut b = IrBuilder::new("main", 0);
        b.emit(Opcode::PushInt, 0, Imm::Int(7));
        b.emit(Opcode::Ret, 1, Imm::None);
        let text = b.finish(0).to_string();
        assert!(text.contains("function main"));
        assert!(text.contains("push_int 7"));
        assert!(text.contains("ret 1"));
    }
}
