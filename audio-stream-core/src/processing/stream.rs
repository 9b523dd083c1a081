use std::ptr;
use std::slice;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_format::AudioFormat;
use crate::models::config::OverflowPolicy;
use crate::models::error::StreamError;
use crate::models::stream_models::{ExecutionContext, StreamId, Traits};
use crate::processing::listener_registry::{ListenerHandle, ListenerRegistry};
use crate::processing::ring_cursor::RingCursor;
use crate::processing::span::Span;
use crate::traits::abstract_stream::{AbstractStream, Event, EventListener};
use crate::traits::allocator::{Allocation, Allocator, AllocatorKind};

/// Cursor bookkeeping, only touched inside the stream's critical section.
#[derive(Debug)]
struct Cursors {
    data_start: RingCursor,
    data_end: RingCursor,
    peek_position: RingCursor,
    write_reservation_position: RingCursor,
    blocks_used: usize,
    peek_count: usize,
    reserve_count: usize,
}

impl Cursors {
    fn new(block_count: usize) -> Self {
        let origin = RingCursor::new(block_count);
        Self {
            data_start: origin,
            data_end: origin,
            peek_position: origin,
            write_reservation_position: origin,
            blocks_used: 0,
            peek_count: 0,
            reserve_count: 0,
        }
    }

    fn rewind(&mut self) {
        self.data_start.rewind();
        self.data_end.rewind();
        self.peek_position.rewind();
        self.write_reservation_position.rewind();
        self.blocks_used = 0;
        self.peek_count = 0;
        self.reserve_count = 0;
    }
}

/// Ring buffer of `block_count` fixed-size blocks for one producer and one consumer.
///
/// The buffer and a zero-filled silence block are allocated once, by the
/// allocator passed to [`Stream::new`]. Cursor updates run inside a short
/// critical section; immediate-mode block copies run inside it too, zero-copy
/// accesses happen outside it through the returned [`Span`]s.
///
/// ```text
///            data_start      peek_position        data_end   write_reservation_position
///                │  peeked        │   committed      │  reserved       │
/// ... free ──────┴────────────────┴──────────────────┴─────────────────┴────── free ...
/// ```
pub struct Stream {
    id: StreamId,
    format: AudioFormat,
    block_size: usize,
    block_count: usize,
    allocator_kind: AllocatorKind,
    overflow_policy: OverflowPolicy,
    producer_context: ExecutionContext,
    consumer_context: ExecutionContext,
    buffer: Allocation,
    silence: Allocation,
    cursors: Mutex<Cursors>,
    listeners: ListenerRegistry,
}

impl Stream {
    pub fn new(
        format: AudioFormat,
        allocator: &dyn Allocator,
        block_size: usize,
        block_count: usize,
    ) -> Result<Self, StreamError> {
        let buffer_size = block_size
            .checked_mul(block_count)
            .ok_or(StreamError::AllocationFailed { size: usize::MAX })?;
        let buffer = allocator.allocate(buffer_size)?;
        let silence = allocator.allocate(block_size)?;

        let id = StreamId::new();
        log::debug!(
            "Created stream {}: {} blocks of {} bytes, {}, {:?} memory",
            id,
            block_count,
            block_size,
            format,
            allocator.kind()
        );

        Ok(Self {
            id,
            format,
            block_size,
            block_count,
            allocator_kind: allocator.kind(),
            overflow_policy: OverflowPolicy::default(),
            producer_context: ExecutionContext::Task,
            consumer_context: ExecutionContext::Task,
            buffer,
            silence,
            cursors: Mutex::new(Cursors::new(block_count)),
            listeners: ListenerRegistry::new(),
        })
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Contexts reported to listeners for producer-side and consumer-side events.
    pub fn with_execution_contexts(
        mut self,
        producer: ExecutionContext,
        consumer: ExecutionContext,
    ) -> Self {
        self.producer_context = producer;
        self.consumer_context = consumer;
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn allocator_kind(&self) -> AllocatorKind {
        self.allocator_kind
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }

    pub fn peeked_block_count(&self) -> usize {
        self.cursors.lock().peek_count
    }

    pub fn reserved_block_count(&self) -> usize {
        self.cursors.lock().reserve_count
    }

    /// View over the silence block. Its bytes are always zero and must not be written.
    pub fn null_span(&self) -> Span {
        Span::from_raw_parts(self.silence.as_ptr(), self.block_size)
    }

    fn silence(&self) -> &[u8] {
        // SAFETY: the silence block is `block_size` bytes, initialized to zero
        // and never written.
        unsafe { slice::from_raw_parts(self.silence.as_ptr(), self.block_size) }
    }

    fn block_span(&self, cursor: &RingCursor) -> Span {
        debug_assert!(cursor.position() < self.block_count);
        // SAFETY: position < block_count, so the offset stays inside the buffer.
        let data = unsafe { self.buffer.as_ptr().add(cursor.offset(self.block_size)) };
        Span::from_raw_parts(data, self.block_size)
    }

    fn check_block_size(&self, size: usize) -> Result<(), StreamError> {
        if size != self.block_size {
            return Err(StreamError::BlockSizeMismatch {
                expected: self.block_size,
                actual: size,
            });
        }
        Ok(())
    }

    fn state_event(&self, cursors: &Cursors) -> Option<Event> {
        if cursors.blocks_used == self.block_count / 2 {
            Some(Event::StreamHalfUsed)
        } else if cursors.blocks_used == 0 {
            Some(Event::StreamEmpty)
        } else if cursors.blocks_used == self.block_count {
            Some(Event::StreamFull)
        } else {
            None
        }
    }

    fn broadcast(&self, event: Option<Event>, context: ExecutionContext) {
        if let Some(event) = event {
            self.listeners.broadcast(self, event, context);
        }
    }

    fn push_bytes(&self, data: &[u8]) -> Result<(), StreamError> {
        let mut cursors = self.cursors.lock();
        if cursors.reserve_count > 0 {
            return Err(StreamError::WriteReservationOpen);
        }
        if cursors.blocks_used == self.block_count {
            drop(cursors);
            self.broadcast(Some(Event::StreamOverflow), self.producer_context);
            return Err(StreamError::Overflow);
        }

        let target = self.block_span(&cursors.data_end);
        // SAFETY: the block at `data_end` is free and no reservation is open,
        // so nothing else accesses it while we hold the lock.
        unsafe { ptr::copy_nonoverlapping(data.as_ptr(), target.data(), self.block_size) };

        cursors.data_end.advance();
        cursors.write_reservation_position = cursors.data_end;
        cursors.blocks_used += 1;
        let event = self.state_event(&cursors);
        drop(cursors);

        self.broadcast(event, self.producer_context);
        Ok(())
    }
}

impl AbstractStream for Stream {
    fn id(&self) -> StreamId {
        self.id
    }

    fn register_listener(&self, listener: Arc<dyn EventListener>) -> ListenerHandle {
        self.listeners.register(listener)
    }

    fn unregister_listener(&self, handle: ListenerHandle) -> bool {
        self.listeners.unregister(handle)
    }

    fn push(&self, data: &[u8]) -> Result<(), StreamError> {
        self.check_block_size(data.len())?;
        self.push_bytes(data)
    }

    fn push_silence(&self) -> Result<(), StreamError> {
        self.push_bytes(self.silence())
    }

    fn pop(&self, data: &mut [u8]) -> Result<(), StreamError> {
        self.check_block_size(data.len())?;

        let mut cursors = self.cursors.lock();
        if cursors.peek_count > 0 {
            return Err(StreamError::PeekOpen);
        }
        if cursors.blocks_used == 0 {
            drop(cursors);
            data.copy_from_slice(self.silence());
            self.broadcast(Some(Event::StreamUnderflow), self.consumer_context);
            return Err(StreamError::Underflow);
        }

        let source = self.block_span(&cursors.data_start);
        // SAFETY: the block at `data_start` is committed and not peeked; the
        // producer does not write committed blocks.
        unsafe { ptr::copy_nonoverlapping(source.data(), data.as_mut_ptr(), self.block_size) };

        cursors.data_start.advance();
        cursors.peek_position = cursors.data_start;
        cursors.blocks_used -= 1;
        let event = self.state_event(&cursors);
        drop(cursors);

        self.broadcast(event, self.consumer_context);
        Ok(())
    }

    fn reserve(&self) -> Result<Span, StreamError> {
        let mut cursors = self.cursors.lock();
        if self.block_count - cursors.blocks_used > cursors.reserve_count {
            let span = self.block_span(&cursors.write_reservation_position);
            cursors.write_reservation_position.advance();
            cursors.reserve_count += 1;
            return Ok(span);
        }

        match self.overflow_policy {
            OverflowPolicy::DiscardUnread if self.block_count > 0 => {
                let discarded = cursors.blocks_used;
                let anchor = cursors.peek_position;
                cursors.data_start = anchor;
                cursors.data_end = anchor;
                cursors.write_reservation_position = anchor;
                cursors.blocks_used = 0;
                cursors.peek_count = 0;

                let span = self.block_span(&cursors.write_reservation_position);
                cursors.write_reservation_position.advance();
                cursors.reserve_count = 1;
                drop(cursors);

                log::warn!(
                    "Stream {} overflow: discarded {} unread blocks to make room",
                    self.id,
                    discarded
                );
                self.broadcast(Some(Event::StreamOverflow), self.producer_context);
                Ok(span)
            }
            _ => {
                drop(cursors);
                self.broadcast(Some(Event::StreamOverflow), self.producer_context);
                Err(StreamError::Overflow)
            }
        }
    }

    fn commit(&self) {
        let mut cursors = self.cursors.lock();
        if cursors.reserve_count == 0 {
            return;
        }
        cursors.blocks_used += cursors.reserve_count;
        cursors.data_end = cursors.write_reservation_position;
        cursors.reserve_count = 0;
        let event = self.state_event(&cursors);
        drop(cursors);

        self.broadcast(event, self.producer_context);
    }

    fn release(&self) {
        let mut cursors = self.cursors.lock();
        cursors.reserve_count = 0;
        cursors.write_reservation_position = cursors.data_end;
    }

    fn peek(&self) -> Result<Span, StreamError> {
        let mut cursors = self.cursors.lock();
        if cursors.peek_count < cursors.blocks_used {
            let span = self.block_span(&cursors.peek_position);
            cursors.peek_position.advance();
            cursors.peek_count += 1;
            return Ok(span);
        }
        drop(cursors);

        self.broadcast(Some(Event::StreamUnderflow), self.consumer_context);
        Err(StreamError::Underflow)
    }

    fn consume(&self) {
        let mut cursors = self.cursors.lock();
        if cursors.peek_count == 0 {
            return;
        }
        cursors.data_start = cursors.peek_position;
        cursors.blocks_used -= cursors.peek_count;
        cursors.peek_count = 0;
        let event = self.state_event(&cursors);
        drop(cursors);

        self.broadcast(event, self.consumer_context);
    }

    fn unpeek(&self) {
        let mut cursors = self.cursors.lock();
        cursors.peek_position = cursors.data_start;
        cursors.peek_count = 0;
    }

    fn reset(&self) {
        self.cursors.lock().rewind();
    }

    fn is_empty(&self) -> bool {
        self.cursors.lock().blocks_used == 0
    }

    fn is_full(&self) -> bool {
        self.cursors.lock().blocks_used == self.block_count
    }

    fn block_count(&self) -> usize {
        self.block_count
    }

    fn used_block_count(&self) -> usize {
        self.cursors.lock().blocks_used
    }

    fn input_traits(&self) -> Traits {
        Traits {
            block_size: self.block_size,
            format: self.format,
        }
    }

    fn output_traits(&self) -> Traits {
        self.input_traits()
    }
}
