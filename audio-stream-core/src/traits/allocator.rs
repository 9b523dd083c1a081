use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::models::error::StreamError;

/// Which memory pool an allocator serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocatorKind {
    Standard,
    /// Non-cacheable memory that DMA engines can access directly.
    NonCacheable,
}

/// Memory strategy for stream buffers, injected once when a stream is built.
pub trait Allocator: Send + Sync {
    /// Allocate `size` zeroed bytes.
    fn allocate(&self, size: usize) -> Result<Allocation, StreamError>;

    fn kind(&self) -> AllocatorKind;
}

/// Zero-initialized heap memory owned by a stream. Freed on drop.
#[derive(Debug)]
pub struct Allocation {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: `Allocation` uniquely owns its memory; access to the bytes is
// coordinated by the owning stream.
unsafe impl Send for Allocation {}
unsafe impl Sync for Allocation {}

impl Allocation {
    /// Allocate `size` zeroed bytes aligned to `align` (a power of two).
    pub fn zeroed(size: usize, align: usize) -> Result<Self, StreamError> {
        let layout = Layout::from_size_align(size, align)
            .map_err(|_| StreamError::AllocationFailed { size })?;
        if size == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                layout,
            });
        }

        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr, layout })
            .ok_or(StreamError::AllocationFailed { size })
    }

    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.layout.size()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    pub fn align(&self) -> usize {
        self.layout.align()
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: allocated in `zeroed` with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
        }
    }
}
