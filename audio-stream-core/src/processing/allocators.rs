use crate::models::error::StreamError;
use crate::traits::allocator::{Allocation, Allocator, AllocatorKind};

/// Alignment of standard stream buffers.
pub const STANDARD_ALIGNMENT: usize = 8;

/// Alignment of DMA-safe buffers: one cache line, so no line is shared with
/// unrelated data.
pub const NON_CACHEABLE_ALIGNMENT: usize = 32;

/// General-purpose heap memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAllocator;

impl Allocator for StandardAllocator {
    fn allocate(&self, size: usize) -> Result<Allocation, StreamError> {
        Allocation::zeroed(size, STANDARD_ALIGNMENT)
    }

    fn kind(&self) -> AllocatorKind {
        AllocatorKind::Standard
    }
}

/// DMA-safe memory, aligned and padded to whole cache lines.
///
/// On targets with a non-cacheable region the platform layer supplies its own
/// `Allocator`; this one keeps the same layout guarantees on the host heap.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonCacheableAllocator;

impl Allocator for NonCacheableAllocator {
    fn allocate(&self, size: usize) -> Result<Allocation, StreamError> {
        let padded = size
            .checked_next_multiple_of(NON_CACHEABLE_ALIGNMENT)
            .ok_or(StreamError::AllocationFailed { size })?;
        Allocation::zeroed(padded, NON_CACHEABLE_ALIGNMENT)
    }

    fn kind(&self) -> AllocatorKind {
        AllocatorKind::NonCacheable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_allocation_is_zeroed() {
        let allocation = StandardAllocator.allocate(64).unwrap();
        assert_eq!(allocation.len(), 64);
        let bytes = unsafe { std::slice::from_raw_parts(allocation.as_ptr(), allocation.len()) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn non_cacheable_allocation_is_line_aligned() {
        let allocation = NonCacheableAllocator.allocate(100).unwrap();
        assert_eq!(allocation.len(), 128);
        assert_eq!(allocation.as_ptr() as usize % NON_CACHEABLE_ALIGNMENT, 0);
        assert_eq!(NonCacheableAllocator.kind(), AllocatorKind::NonCacheable);
    }

    #[test]
    fn zero_sized_allocation() {
        let allocation = StandardAllocator.allocate(0).unwrap();
        assert!(allocation.is_empty());
    }
}
