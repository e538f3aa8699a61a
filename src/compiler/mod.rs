//! AST to IR lowering.
//!
//! There is no frame pointer at run time, so the compiler tracks `sp`, the
//! number of live slots above the current frame, at every instruction and
//! turns each variable into a slot distance from the top:
//!
//! ```text
//!   local k  (of L hoisted vars)  -> sp - 1 - k
//!   param i  (of P params)        -> sp + 4 + (P - 1 - i)
//! ```
//!
//! Top-level `var`s and function declarations become globals.

use std::collections::HashSet;

use crate::ast::*;
use crate::ir::{FunId, Imm, IrBuilder, Opcode};
use crate::value::Constant;
use crate::vm::{FRAME_SLOTS, Vm, VmError};

/// Parameter and argument limit per call.
pub const MAX_ARGS: usize = 255;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("function '{name}' must be declared at the top level of the program")]
    NestedFunction { name: String, span: Span },
    #[error("duplicate parameter '{name}' in function '{function}'")]
    DuplicateParameter { name: String, function: String, span: Span },
    #[error("too many {what} in '{function}' (limit {MAX_ARGS})")]
    TooMany { what: &'static str, function: String, span: Span },
    #[error(transparent)]
    Vm(#[from] VmError),
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::NestedFunction { .. } => "CVD-C001",
            CompileError::DuplicateParameter { .. } => "CVD-C002",
            CompileError::TooMany { .. } => "CVD-C003",
            CompileError::Vm(e) => e.code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::NestedFunction { span, .. }
            | CompileError::DuplicateParameter { span, .. }
            | CompileError::TooMany { span, .. } => Some(*span),
            CompileError::Vm(_) => None,
        }
    }
}

type Result<T> = std::result::Result<T, CompileError>;

enum Place {
    Slot(u32),
    Global(String),
}

struct FnCompiler<'a> {
    vm: &'a mut Vm,
    b: IrBuilder,
    name: String,
    params: Vec<String>,
    locals: Vec<String>,
    top_level: bool,
    sp: u32,
}

/// Compile a program into a top-level unit. Function declarations are
/// compiled and registered first so they can be called before they appear.
pub fn compile(vm: &mut Vm, program: &Program, name: &str) -> Result<FunId> {
    let mut unit = FnCompiler::new(vm, name, Vec::new(), Vec::new(), true);

    for stmt in &program.body {
        if let Stmt::Function { name, params, body } = &stmt.node {
            let id = compile_function(unit.vm, name, params, body, stmt.span)?;
            unit.b.emit(Opcode::NewClosure, 0, Imm::Fun(id));
            unit.push(1);
            let key = unit.vm.intern(name)?;
            unit.b.emit(Opcode::SetGlobal, 0, Imm::Str(key));
            unit.pop(1);
        }
    }

    let result_at = match program.body.last() {
        Some(Spanned { node: Stmt::Expr(_), .. }) => Some(program.body.len() - 1),
        _ => None,
    };
    for (i, stmt) in program.body.iter().enumerate() {
        match &stmt.node {
            Stmt::Function { .. } => {}
            Stmt::Expr(e) if Some(i) == result_at => unit.expr(e, stmt.span)?,
            _ => unit.stmt(stmt)?,
        }
    }
    if result_at.is_none() {
        unit.push_const(Constant::Undef);
    }
    unit.ret();

    let fun = unit.b.finish(0);
    tracing::debug!(unit = name, instrs = fun.instrs.len(), "compiled");
    Ok(vm.register(fun))
}

fn compile_function(vm: &mut Vm, name: &str, params: &[String], body: &Block, span: Span) -> Result<FunId> {
    if params.len() > MAX_ARGS {
        return Err(CompileError::TooMany { what: "parameters", function: name.to_string(), span });
    }
    let mut seen = HashSet::new();
    for p in params {
        if !seen.insert(p.as_str()) {
            return Err(CompileError::DuplicateParameter { name: p.clone(), function: name.to_string(), span });
        }
    }

    let mut locals = Vec::new();
    hoist_vars(body, params, &mut locals)?;

    let mut f = FnCompiler::new(vm, name, params.to_vec(), locals, false);
    if !f.locals.is_empty() {
        let n = f.locals.len() as u32;
        f.b.emit(Opcode::Reserve, n, Imm::None);
        f.push(n);
    }
    for stmt in body {
        f.stmt(stmt)?;
    }
    f.push_const(Constant::Undef);
    f.ret();

    let fun = f.b.finish(f.locals.len() as u32);
    Ok(vm.register(fun))
}

/// Every `var` in a function body, in order of first appearance, minus params.
fn hoist_vars(body: &Block, params: &[String], out: &mut Vec<String>) -> Result<()> {
    for stmt in body {
        match &stmt.node {
            Stmt::Var { name, .. } => {
                if !params.contains(name) && !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Stmt::If { then_branch, else_branch, .. } => {
                hoist_vars(then_branch, params, out)?;
                if let Some(e) = else_branch {
                    hoist_vars(e, params, out)?;
                }
            }
            Stmt::While { body, .. } | Stmt::Block(body) => hoist_vars(body, params, out)?,
            Stmt::Function { name, .. } => {
                return Err(CompileError::NestedFunction { name: name.clone(), span: stmt.span });
            }
            Stmt::Assign { .. } | Stmt::Return(_) | Stmt::Expr(_) => {}
        }
    }
    Ok(())
}

impl<'a> FnCompiler<'a> {
    fn new(vm: &'a mut Vm, name: &str, params: Vec<String>, locals: Vec<String>, top_level: bool) -> Self {
        FnCompiler { vm, b: IrBuilder::new(name, params.len() as u32), name: name.to_string(), params, locals, top_level, sp: 0 }
    }

    fn push(&mut self, n: u32) {
        self.sp += n;
    }

    fn pop(&mut self, n: u32) {
        self.sp -= n;
    }

    fn push_const(&mut self, c: Constant) {
        self.b.emit(Opcode::PushConst, c.operand(), Imm::None);
        self.push(1);
    }

    /// Return the value on top; leaves `sp` as if it had been consumed.
    fn ret(&mut self) {
        self.b.emit(Opcode::Ret, self.sp, Imm::None);
        self.pop(1);
    }

    fn resolve(&self, name: &str) -> Place {
        if let Some(k) = self.locals.iter().position(|l| l == name) {
            return Place::Slot(self.sp - 1 - k as u32);
        }
        if let Some(i) = self.params.iter().rposition(|p| p == name) {
            let p = self.params.len() as u32;
            return Place::Slot(self.sp + FRAME_SLOTS as u32 + (p - 1 - i as u32));
        }
        Place::Global(name.to_string())
    }

    /// Pop the top into `name`.
    fn store(&mut self, name: &str) -> Result<()> {
        match self.resolve(name) {
            Place::Slot(slot) => {
                self.b.emit(Opcode::SetLocal, slot, Imm::None);
            }
            Place::Global(g) => {
                let key = self.vm.intern(&g)?;
                self.b.emit(Opcode::SetGlobal, 0, Imm::Str(key));
            }
        }
        self.pop(1);
        Ok(())
    }

    fn stmt(&mut self, stmt: &Spanned<Stmt>) -> Result<()> {
        match &stmt.node {
            Stmt::Var { name, init } => match init {
                Some(e) => {
                    self.expr(e, stmt.span)?;
                    self.store(name)?;
                }
                None if self.top_level => {
                    self.push_const(Constant::Undef);
                    self.store(name)?;
                }
                None => {}
            },
            Stmt::Assign { name, value } => {
                self.expr(value, stmt.span)?;
                self.store(name)?;
            }
            Stmt::Function { name, .. } => {
                return Err(CompileError::NestedFunction { name: name.clone(), span: stmt.span });
            }
            Stmt::Return(value) => {
                match value {
                    Some(e) => self.expr(e, stmt.span)?,
                    None => self.push_const(Constant::Undef),
                }
                self.ret();
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.expr(condition, stmt.span)?;
                let skip_then = self.b.emit(Opcode::JumpFalse, 0, Imm::None);
                self.pop(1);
                self.block(then_branch)?;
                match else_branch {
                    Some(else_branch) => {
                        let skip_else = self.b.emit(Opcode::Jump, 0, Imm::None);
                        let here = self.b.here();
                        self.b.patch_target(skip_then, here);
                        self.block(else_branch)?;
                        let here = self.b.here();
                        self.b.patch_target(skip_else, here);
                    }
                    None => {
                        let here = self.b.here();
                        self.b.patch_target(skip_then, here);
                    }
                }
            }
            Stmt::While { condition, body } => {
                let top = self.b.here();
                self.expr(condition, stmt.span)?;
                let exit = self.b.emit(Opcode::JumpFalse, 0, Imm::None);
                self.pop(1);
                self.block(body)?;
                self.b.emit(Opcode::Jump, 0, Imm::Target(top));
                let here = self.b.here();
                self.b.patch_target(exit, here);
            }
            Stmt::Block(body) => self.block(body)?,
            Stmt::Expr(e) => {
                self.expr(e, stmt.span)?;
                self.b.emit(Opcode::Pop, 1, Imm::None);
                self.pop(1);
            }
        }
        Ok(())
    }

    fn block(&mut self, body: &Block) -> Result<()> {
        body.iter().try_for_each(|s| self.stmt(s))
    }

    /// Leaves exactly one value on the stack.
    fn expr(&mut self, expr: &Expr, span: Span) -> Result<()> {
        match expr {
            Expr::Literal(lit) => match lit {
                Literal::Int(n) => {
                    self.b.emit(Opcode::PushInt, 0, Imm::Int(*n));
                    self.push(1);
                }
                Literal::Float(f) => {
                    self.b.emit(Opcode::PushFloat, 0, Imm::Float(*f));
                    self.push(1);
                }
                Literal::Text(s) => {
                    let r = self.vm.intern(s)?;
                    self.b.emit(Opcode::PushStr, 0, Imm::Str(r));
                    self.push(1);
                }
                Literal::Bool(true) => self.push_const(Constant::True),
                Literal::Bool(false) => self.push_const(Constant::False),
                Literal::Null => self.push_const(Constant::Null),
                Literal::Undefined => self.push_const(Constant::Undef),
            },
            Expr::Ref(name) => {
                match self.resolve(name) {
                    Place::Slot(slot) => {
                        self.b.emit(Opcode::GetLocal, slot, Imm::None);
                    }
                    Place::Global(g) => {
                        let key = self.vm.intern(&g)?;
                        self.b.emit(Opcode::GetGlobal, 0, Imm::Str(key));
                    }
                }
                self.push(1);
            }
            Expr::Call { callee, args } => {
                if args.len() > MAX_ARGS {
                    return Err(CompileError::TooMany { what: "arguments", function: self.name.clone(), span });
                }
                for a in args {
                    self.expr(a, span)?;
                }
                self.expr(callee, span)?;
                let argc = args.len() as u32;
                self.b.emit(Opcode::Call, argc, Imm::None);
                self.pop(argc);
            }
            Expr::BinOp { op, left, right } => {
                self.expr(left, span)?;
                self.expr(right, span)?;
                self.b.emit_op(binop_opcode(*op));
                self.pop(1);
            }
            Expr::UnaryOp { op, operand } => {
                self.expr(operand, span)?;
                self.b.emit_op(match op {
                    UnaryOp::Not => Opcode::Not,
                    UnaryOp::Negate => Opcode::Neg,
                });
            }
        }
        Ok(())
    }
}

fn binop_opcode(op: BinOp) -> Opcode {
    match op {
        BinOp::Add => Opcode::Add,
        BinOp::Subtract => Opcode::Sub,
        BinOp::Multiply => Opcode::Mul,
        BinOp::Divide => Opcode::Div,
        BinOp::Modulo => Opcode::Mod,
        BinOp::Equals => Opcode::Eq,
        BinOp::NotEquals => Opcode::Ne,
        BinOp::LessThan => Opcode::Lt,
        BinOp::LessOrEqual => Opcode::Le,
        BinOp::GreaterThan => Opcode::Gt,
        BinOp::GreaterOrEqual => Opcode::Ge,
    }
}
