use std::ptr;
use std::slice;

/// Non-owning view over a contiguous byte range: a pointer and a length.
///
/// Spans handed out by `reserve()` and `peek()` point straight into a stream
/// buffer. Two spans are equal when they view the same address with the same
/// length, regardless of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    data: *mut u8,
    size: usize,
}

// SAFETY: a span is only an address; every access to the bytes goes through
// an `unsafe` accessor whose caller upholds the validity contract.
unsafe impl Send for Span {}
unsafe impl Sync for Span {}

impl Span {
    pub const fn from_raw_parts(data: *mut u8, size: usize) -> Self {
        Self { data, size }
    }

    pub fn from_slice(data: &mut [u8]) -> Self {
        Self {
            data: data.as_mut_ptr(),
            size: data.len(),
        }
    }

    pub const fn data(&self) -> *mut u8 {
        self.data
    }

    pub fn data_end(&self) -> *mut u8 {
        self.data.wrapping_add(self.size)
    }

    pub const fn len(&self) -> usize {
        self.size
    }

    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// A view of the first `size` bytes (clamped to the span).
    pub fn truncated(&self, size: usize) -> Self {
        Self {
            data: self.data,
            size: size.min(self.size),
        }
    }

    /// # Safety
    ///
    /// The span must point at live memory of at least `len()` bytes that
    /// nothing writes to for `'a`. For stream spans this holds until the
    /// sequence that produced the span is closed (`consume`, `unpeek`,
    /// `commit`, `release` or `reset`).
    pub unsafe fn as_slice<'a>(&self) -> &'a [u8] {
        if self.size == 0 {
            return &[];
        }
        // SAFETY: guaranteed by the caller.
        unsafe { slice::from_raw_parts(self.data, self.size) }
    }

    /// # Safety
    ///
    /// As for [`Span::as_slice`], and additionally nothing else may read or
    /// write the bytes for `'a`. A reserved block satisfies this until it is
    /// committed or released.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn as_mut_slice<'a>(&self) -> &'a mut [u8] {
        if self.size == 0 {
            return &mut [];
        }
        // SAFETY: guaranteed by the caller.
        unsafe { slice::from_raw_parts_mut(self.data, self.size) }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self {
            data: ptr::null_mut(),
            size: 0,
        }
    }
}
