/// Block index into a ring of `capacity` blocks, advancing modulo the capacity.
///
/// A zero-capacity ring has a single position, `0`, that never moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingCursor {
    position: usize,
    capacity: usize,
}

impl RingCursor {
    pub const fn new(capacity: usize) -> Self {
        Self {
            position: 0,
            capacity,
        }
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Step forward one block, wrapping at the end of the ring.
    pub fn advance(&mut self) {
        self.advance_by(1);
    }

    pub fn advance_by(&mut self, blocks: usize) {
        if self.capacity == 0 {
            return;
        }
        self.position = (self.position + blocks % self.capacity) % self.capacity;
    }

    /// Blocks to step forward from `self` to reach `other`, in `0..capacity`.
    pub fn distance_to(&self, other: &RingCursor) -> usize {
        debug_assert_eq!(self.capacity, other.capacity);
        if self.capacity == 0 {
            return 0;
        }
        (other.position + self.capacity - self.position) % self.capacity
    }

    /// Byte offset of the current block for blocks of `block_size` bytes.
    pub const fn offset(&self, block_size: usize) -> usize {
        self.position * block_size
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }
}
