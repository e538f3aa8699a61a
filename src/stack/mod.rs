//! The dual operand stack.
//!
//! Payload words and tags live in two parallel fixed-capacity arrays that
//! share a single top index. The stack grows toward index 0: `top ==
//! capacity` is empty, `top == 0` is full. Slot `n` names the value `n`
//! positions below the top, so slot 0 is the top itself.
//!
//! There is no frame pointer. Locals, arguments and the hidden call slots
//! are all addressed relative to the live top, and the compiler tracks how
//! far away they are.

use crate::value::{Tag, TaggedValue, Word};
use crate::vm::{VmError, VmResult};

pub struct DualStack {
    words: Box<[Word]>,
    tags: Box<[Tag]>,
    top: usize,
}

impl DualStack {
    pub fn new(capacity: usize) -> VmResult<Self> {
        Self::from_parts(
            vec![TaggedValue::UNDEF.word(); capacity].into_boxed_slice(),
            vec![TaggedValue::UNDEF.tag(); capacity].into_boxed_slice(),
        )
    }

    /// Build a stack over existing arrays. Both must have the same length.
    /// Their contents are overwritten with `undefined`, so a slot exposed by
    /// `reserve` never holds anything that did not come through `set`.
    pub fn from_parts(mut words: Box<[Word]>, mut tags: Box<[Tag]>) -> VmResult<Self> {
        if words.len() != tags.len() {
            return Err(VmError::Construction {
                reason: format!("stack arrays differ in size ({} words, {} tags)", words.len(), tags.len()),
            });
        }
        if words.is_empty() {
            return Err(VmError::Construction { reason: "stack capacity must be non-zero".into() });
        }
        words.fill(TaggedValue::UNDEF.word());
        tags.fill(TaggedValue::UNDEF.tag());
        let top = words.len();
        Ok(DualStack { words, tags, top })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    /// Number of live slots.
    #[inline]
    pub fn depth(&self) -> usize {
        self.words.len() - self.top
    }

    #[inline]
    fn index(&self, slot: usize) -> VmResult<usize> {
        match self.top.checked_add(slot) {
            Some(i) if i < self.words.len() => Ok(i),
            _ => Err(VmError::InvalidSlot { slot, depth: self.depth() }),
        }
    }

    #[inline]
    pub fn get(&self, slot: usize) -> VmResult<TaggedValue> {
        let i = self.index(slot)?;
        TaggedValue::new(self.words[i], self.tags[i])
    }

    #[inline]
    pub fn set(&mut self, slot: usize, v: TaggedValue) -> VmResult<()> {
        let i = self.index(slot)?;
        self.words[i] = v.word();
        self.tags[i] = v.tag();
        Ok(())
    }

    /// Copy one slot over another, word and tag together.
    #[inline]
    pub fn move_slot(&mut self, src: usize, dst: usize) -> VmResult<()> {
        let s = self.index(src)?;
        let d = self.index(dst)?;
        self.words[d] = self.words[s];
        self.tags[d] = self.tags[s];
        Ok(())
    }

    /// Grow the live region by `n` slots. New slots keep whatever they held.
    pub fn reserve(&mut self, n: usize) -> VmResult<()> {
        if n > self.top {
            return Err(VmError::StackOverflow { requested: n, available: self.top });
        }
        self.top -= n;
        Ok(())
    }

    /// Shrink the live region by `n` slots.
    pub fn release(&mut self, n: usize) -> VmResult<()> {
        if n > self.depth() {
            return Err(VmError::StackUnderflow { requested: n, depth: self.depth() });
        }
        self.top += n;
        Ok(())
    }

    #[inline]
    pub fn push(&mut self, v: TaggedValue) -> VmResult<()> {
        self.reserve(1)?;
        self.set(0, v)
    }

    #[inline]
    pub fn pop(&mut self) -> VmResult<TaggedValue> {
        let v = self.get(0)?;
        self.release(1)?;
        Ok(v)
    }
}
