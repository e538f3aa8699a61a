//! Bump allocator over a single read/write/execute mapping.
//!
//! One region is mapped at construction and never grows, moves or frees
//! individual objects. The mapping is executable so generated machine code
//! can later be placed directly in heap objects.

use std::ptr::NonNull;

use crate::vm::{VmError, VmResult};

/// Alignment of every allocation: the natural alignment of a word.
pub const HEAP_ALIGN: usize = std::mem::align_of::<u64>();

#[inline]
const fn align_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

/// Address of an object inside the heap. Non-relocating, so plain
/// addresses are stable for the whole session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct HeapRef(usize);

impl HeapRef {
    #[inline]
    pub(crate) fn from_addr(addr: usize) -> Self {
        HeapRef(addr)
    }

    #[inline]
    pub fn addr(self) -> usize {
        self.0
    }

    #[inline]
    pub fn offset(self, bytes: usize) -> HeapRef {
        HeapRef(self.0 + bytes)
    }
}

pub struct ExecHeap {
    base: NonNull<u8>,
    /// Bytes actually mapped (requested size rounded up to whole pages).
    mapped: usize,
    /// Next free address.
    alloc: usize,
    /// One past the last usable address.
    limit: usize,
}

impl ExecHeap {
    pub fn new(size: usize) -> VmResult<Self> {
        if size == 0 {
            return Err(VmError::Construction { reason: "heap size must be non-zero".into() });
        }
        // SAFETY: sysconf has no preconditions.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if page_size <= 0 {
            return Err(VmError::Construction { reason: "could not query page size".into() });
        }
        let mapped = align_up(size, page_size as usize);

        #[cfg(target_os = "macos")]
        let flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_JIT;
        #[cfg(not(target_os = "macos"))]
        let flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;

        // SAFETY: anonymous private mapping with a null hint; the result is
        // checked against MAP_FAILED before use.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                mapped,
                libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC,
                flags,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            let err = std::io::Error::last_os_error();
            return Err(VmError::Construction { reason: format!("mmap of {mapped} bytes failed: {err}") });
        }
        let base = NonNull::new(ptr as *mut u8)
            .ok_or_else(|| VmError::Construction { reason: "mmap returned null".into() })?;

        let start = align_up(base.as_ptr() as usize, HEAP_ALIGN);
        tracing::debug!(bytes = mapped, base = format_args!("{:#x}", start), "heap mapped");
        Ok(ExecHeap { base, mapped, alloc: start, limit: base.as_ptr() as usize + size })
    }

    /// Hand out `size` bytes at the current cursor.
    pub fn allocate(&mut self, size: usize) -> VmResult<HeapRef> {
        let at = self.alloc;
        let end = at.checked_add(size).filter(|&end| end <= self.limit).ok_or(
            VmError::HeapExhausted { requested: size, free: self.free() },
        )?;
        self.alloc = align_up(end, HEAP_ALIGN).min(self.limit);
        tracing::trace!(size, at = format_args!("{at:#x}"), "allocate");
        Ok(HeapRef(at))
    }

    pub fn base(&self) -> usize {
        self.base.as_ptr() as usize
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn used(&self) -> usize {
        self.alloc - self.base()
    }

    pub fn free(&self) -> usize {
        self.limit - self.alloc
    }

    /// Whether `[addr, addr + len)` lies in the allocated part of the heap.
    pub fn contains(&self, addr: usize, len: usize) -> bool {
        addr >= self.base() && addr.checked_add(len).is_some_and(|end| end <= self.alloc)
    }

    #[inline]
    fn check(&self, r: HeapRef, off: usize, len: usize) -> VmResult<*mut u8> {
        let addr = r.0.checked_add(off).ok_or(VmError::InvalidHeapAccess { addr: r.0, len })?;
        if !self.contains(addr, len) {
            return Err(VmError::InvalidHeapAccess { addr, len });
        }
        Ok(addr as *mut u8)
    }

    pub fn read_u64(&self, r: HeapRef, off: usize) -> VmResult<u64> {
        let p = self.check(r, off, 8)?;
        // SAFETY: check() proved the 8 bytes are inside the mapped region.
        Ok(unsafe { std::ptr::read_unaligned(p as *const u64) })
    }

    pub fn write_u64(&mut self, r: HeapRef, off: usize, v: u64) -> VmResult<()> {
        let p = self.check(r, off, 8)?;
        // SAFETY: in bounds per check(); mapping is writable.
        unsafe { std::ptr::write_unaligned(p as *mut u64, v) };
        Ok(())
    }

    pub fn read_u32(&self, r: HeapRef, off: usize) -> VmResult<u32> {
        let p = self.check(r, off, 4)?;
        // SAFETY: in bounds per check().
        Ok(unsafe { std::ptr::read_unaligned(p as *const u32) })
    }

    pub fn write_u32(&mut self, r: HeapRef, off: usize, v: u32) -> VmResult<()> {
        let p = self.check(r, off, 4)?;
        // SAFETY: in bounds per check(); mapping is writable.
        unsafe { std::ptr::write_unaligned(p as *mut u32, v) };
        Ok(())
    }

    pub fn read_u16(&self, r: HeapRef, off: usize) -> VmResult<u16> {
        let p = self.check(r, off, 2)?;
        // SAFETY: in bounds per check().
        Ok(unsafe { std::ptr::read_unaligned(p as *const u16) })
    }

    pub fn write_u16(&mut self, r: HeapRef, off: usize, v: u16) -> VmResult<()> {
        let p = self.check(r, off, 2)?;
        // SAFETY: in bounds per check(); mapping is writable.
        unsafe { std::ptr::write_unaligned(p as *mut u16, v) };
        Ok(())
    }

    pub fn read_u8(&self, r: HeapRef, off: usize) -> VmResult<u8> {
        let p = self.check(r, off, 1)?;
        // SAFETY: in bounds per check().
        Ok(unsafe { *p })
    }

    pub fn write_u8(&mut self, r: HeapRef, off: usize, v: u8) -> VmResult<()> {
        let p = self.check(r, off, 1)?;
        // SAFETY: in bounds per check(); mapping is writable.
        unsafe { *p = v };
        Ok(())
    }
}

impl Drop for ExecHeap {
    fn drop(&mut self) {
        // SAFETY: base/mapped are exactly what mmap returned; Drop runs once.
        unsafe {
            libc::munmap(self.base.as_ptr() as *mut libc::c_void, self.mapped);
        }
    }
}
