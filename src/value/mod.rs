//! Tagged values: a 64-bit payload word paired with a one-byte type tag.
//!
//! The word is meaningless on its own. Every read and write of a value goes
//! through [`TaggedValue`] (or through the dual stack, which keeps the two
//! halves in lockstep), so a word is always interpreted under its tag.

pub mod render;

use std::fmt;

use crate::heap::HeapRef;
use crate::ir::CodeRef;
use crate::vm::{VmError, VmResult};

pub use render::{render, type_name};

// ── Constant encodings ──────────────────────────────────────────────
//
// High byte set: a one-byte compare separates these from any pointer
// payload. Floats never carry these patterns because NaNs are
// canonicalised on construction.

const CONST_MARK: u64 = 0xFF00_0000_0000_0000;
const CONST_TRUE: u64 = CONST_MARK | 1;
const CONST_FALSE: u64 = CONST_MARK | 2;
const CONST_NULL: u64 = CONST_MARK | 3;
const CONST_UNDEF: u64 = CONST_MARK | 4;

const CANONICAL_NAN: u64 = 0x7FF8_0000_0000_0000;

/// Raw 64-bit payload of a value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word(u64);

impl Word {
    #[inline]
    pub(crate) const fn from_bits(bits: u64) -> Self {
        Word(bits)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_int(n: i64) -> Self {
        Word(n as u64)
    }

    #[inline]
    pub fn from_uint(n: u64) -> Self {
        Word(n)
    }

    #[inline]
    pub fn from_float(f: f64) -> Self {
        if f.is_nan() { Word(CANONICAL_NAN) } else { Word(f.to_bits()) }
    }

    #[inline]
    pub fn from_raw_ptr(p: *const u8) -> Self {
        Word(p as usize as u64)
    }

    #[inline]
    pub fn from_heap_ref(r: HeapRef) -> Self {
        Word(r.addr() as u64)
    }

    #[inline]
    pub fn as_int(self) -> i64 {
        self.0 as i64
    }

    #[inline]
    pub fn as_uint(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_float(self) -> f64 {
        f64::from_bits(self.0)
    }

    #[inline]
    pub fn as_heap_ref(self) -> HeapRef {
        HeapRef::from_addr(self.0 as usize)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#018x})", self.0)
    }
}

/// How a [`Word`] is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Int = 0,
    Float = 1,
    String = 2,
    HeapRef = 3,
    RawPtr = 4,
    Const = 5,
}

impl TryFrom<u8> for Tag {
    type Error = VmError;

    fn try_from(b: u8) -> VmResult<Tag> {
        Ok(match b {
            0 => Tag::Int,
            1 => Tag::Float,
            2 => Tag::String,
            3 => Tag::HeapRef,
            4 => Tag::RawPtr,
            5 => Tag::Const,
            _ => return Err(VmError::UnsupportedTag { tag: b }),
        })
    }
}

/// A word together with its tag. The only way values travel.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaggedValue {
    word: Word,
    tag: Tag,
}

impl TaggedValue {
    pub const UNDEF: TaggedValue = TaggedValue { word: Word(CONST_UNDEF), tag: Tag::Const };
    pub const NULL: TaggedValue = TaggedValue { word: Word(CONST_NULL), tag: Tag::Const };
    pub const TRUE: TaggedValue = TaggedValue { word: Word(CONST_TRUE), tag: Tag::Const };
    pub const FALSE: TaggedValue = TaggedValue { word: Word(CONST_FALSE), tag: Tag::Const };

    /// Reassemble a value from its two halves, as read back from a stack
    /// slot or a heap object. A `Const` tag is only accepted on one of the
    /// four singleton payloads.
    #[inline]
    pub(crate) fn new(word: Word, tag: Tag) -> VmResult<Self> {
        let v = TaggedValue { word, tag };
        if tag == Tag::Const {
            v.constant()?;
        }
        Ok(v)
    }

    #[inline]
    pub fn word(self) -> Word {
        self.word
    }

    #[inline]
    pub fn tag(self) -> Tag {
        self.tag
    }

    #[inline]
    pub fn int(n: i64) -> Self {
        TaggedValue { word: Word::from_int(n), tag: Tag::Int }
    }

    #[inline]
    pub fn uint(n: u64) -> Self {
        TaggedValue { word: Word::from_uint(n), tag: Tag::Int }
    }

    #[inline]
    pub fn float(f: f64) -> Self {
        TaggedValue { word: Word::from_float(f), tag: Tag::Float }
    }

    #[inline]
    pub fn boolean(b: bool) -> Self {
        if b { Self::TRUE } else { Self::FALSE }
    }

    #[inline]
    pub fn string(s: HeapRef) -> Self {
        TaggedValue { word: Word::from_heap_ref(s), tag: Tag::String }
    }

    #[inline]
    pub fn heap_ref(r: HeapRef) -> Self {
        TaggedValue { word: Word::from_heap_ref(r), tag: Tag::HeapRef }
    }

    #[inline]
    pub fn raw_ptr(p: *const u8) -> Self {
        TaggedValue { word: Word::from_raw_ptr(p), tag: Tag::RawPtr }
    }

    /// Return addresses live on the stack as raw pointers; `None` is null.
    #[inline]
    pub fn code_ref(at: Option<CodeRef>) -> Self {
        let bits = at.map_or(0, CodeRef::to_bits);
        TaggedValue { word: Word(bits), tag: Tag::RawPtr }
    }

    #[inline]
    pub fn is_undef(self) -> bool {
        self == Self::UNDEF
    }

    /// Numeric view for mixed int/float arithmetic.
    #[inline]
    pub fn as_f64(self) -> Option<f64> {
        match self.tag {
            Tag::Int => Some(self.word.as_int() as f64),
            Tag::Float => Some(self.word.as_float()),
            _ => None,
        }
    }

    pub fn as_int(self) -> VmResult<i64> {
        match self.tag {
            Tag::Int => Ok(self.word.as_int()),
            tag => Err(VmError::TypeError { op: "as_int", found: tag_name(tag) }),
        }
    }

    pub fn as_heap_ref(self) -> VmResult<HeapRef> {
        match self.tag {
            Tag::HeapRef | Tag::String => Ok(self.word.as_heap_ref()),
            tag => Err(VmError::TypeError { op: "as_heap_ref", found: tag_name(tag) }),
        }
    }

    pub fn as_code_ref(self) -> VmResult<Option<CodeRef>> {
        match self.tag {
            Tag::RawPtr => Ok(CodeRef::from_bits(self.word.bits())),
            tag => Err(VmError::TypeError { op: "as_code_ref", found: tag_name(tag) }),
        }
    }

    /// Which singleton a `Const` value is. Any other payload is rejected.
    pub fn constant(self) -> VmResult<Constant> {
        if self.tag != Tag::Const {
            return Err(VmError::UnsupportedValue { bits: self.word.bits() });
        }
        match self.word.bits() {
            CONST_TRUE => Ok(Constant::True),
            CONST_FALSE => Ok(Constant::False),
            CONST_NULL => Ok(Constant::Null),
            CONST_UNDEF => Ok(Constant::Undef),
            bits => Err(VmError::UnsupportedValue { bits }),
        }
    }
}

impl fmt::Debug for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Tag::Int => write!(f, "Int({})", self.word.as_int()),
            Tag::Float => write!(f, "Float({})", self.word.as_float()),
            Tag::Const => match self.constant() {
                Ok(c) => write!(f, "Const({})", c.keyword()),
                Err(_) => write!(f, "Const(?{:#x})", self.word.bits()),
            },
            tag => write!(f, "{:?}({:#x})", tag, self.word.bits()),
        }
    }
}

/// The four constant singletons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    True,
    False,
    Null,
    Undef,
}

impl Constant {
    pub fn keyword(self) -> &'static str {
        match self {
            Constant::True => "true",
            Constant::False => "false",
            Constant::Null => "null",
            Constant::Undef => "undefined",
        }
    }

    pub fn value(self) -> TaggedValue {
        match self {
            Constant::True => TaggedValue::TRUE,
            Constant::False => TaggedValue::FALSE,
            Constant::Null => TaggedValue::NULL,
            Constant::Undef => TaggedValue::UNDEF,
        }
    }

    /// Operand encoding used by the `push_const` instruction.
    pub fn from_operand(a: u32) -> Option<Constant> {
        match a {
            0 => Some(Constant::Undef),
            1 => Some(Constant::Null),
            2 => Some(Constant::True),
            3 => Some(Constant::False),
            _ => None,
        }
    }

    pub fn operand(self) -> u32 {
        match self {
            Constant::Undef => 0,
            Constant::Null => 1,
            Constant::True => 2,
            Constant::False => 3,
        }
    }
}

pub(crate) fn tag_name(tag: Tag) -> &'static str {
    match tag {
        Tag::Int | Tag::Float => "number",
        Tag::String => "string",
        Tag::HeapRef => "object",
        Tag::RawPtr => "rawptr",
        Tag::Const => "constant",
    }
}
