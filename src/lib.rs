//! corvid: a tagged-value stack VM with a small dynamic language on top.
//!
//! The execution core is a dual operand stack (payload words and tags in
//! parallel arrays), a bump heap over an executable mapping, and a dispatch
//! loop over linked IR instructions. The lexer, parser and compiler exist to
//! feed it.

pub mod ast;
pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod heap;
pub mod ir;
pub mod layout;
pub mod lexer;
pub mod natives;
pub mod ops;
pub mod parser;
pub mod stack;
pub mod value;
pub mod vm;

pub use config::VmConfig;
pub use value::{Tag, TaggedValue};
pub use vm::{LoadError, Vm, VmError, VmResult};
