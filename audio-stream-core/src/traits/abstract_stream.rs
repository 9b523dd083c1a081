use std::sync::Arc;

use crate::models::error::StreamError;
use crate::models::stream_models::{ExecutionContext, StreamId, Traits};
use crate::processing::listener_registry::ListenerHandle;
use crate::processing::span::Span;

/// Stream state notifications delivered to registered listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    StreamFull,
    StreamHalfUsed,
    StreamEmpty,
    StreamOverflow,
    StreamUnderflow,
}

/// Receiver of stream events.
///
/// Called from whichever side raised the event, possibly from an interrupt
/// handler (see `context`). Implementations must not block.
pub trait EventListener: Send + Sync {
    fn on_event(&self, stream: &dyn AbstractStream, event: Event, context: ExecutionContext);
}

/// Block-oriented stream between one producer and one consumer.
///
/// Two protocols share the buffer:
/// - immediate: `push` / `pop` copy a whole block in or out;
/// - zero-copy: `reserve` → write → `commit`/`release` on the producer side,
///   `peek` → read → `consume`/`unpeek` on the consumer side.
///
/// No operation blocks. `push` and `pop` fail while the zero-copy sequence of
/// the same side is open.
pub trait AbstractStream: Send + Sync {
    fn id(&self) -> StreamId;

    fn register_listener(&self, listener: Arc<dyn EventListener>) -> ListenerHandle;

    /// Remove a registration. Returns `false` if the handle was not registered.
    fn unregister_listener(&self, handle: ListenerHandle) -> bool;

    /// Copy one block (`data.len()` must equal the block size) into the stream.
    fn push(&self, data: &[u8]) -> Result<(), StreamError>;

    /// Push one block of silence.
    fn push_silence(&self) -> Result<(), StreamError>;

    /// Copy the oldest block out of the stream and remove it.
    ///
    /// On underflow `data` is filled with silence.
    fn pop(&self, data: &mut [u8]) -> Result<(), StreamError>;

    /// Reserve the next free block for direct writing.
    fn reserve(&self) -> Result<Span, StreamError>;

    /// Publish every reserved block.
    fn commit(&self);

    /// Drop every reserved block without publishing it.
    fn release(&self);

    /// Expose the next unread block for direct reading without removing it.
    fn peek(&self) -> Result<Span, StreamError>;

    /// Remove every peeked block.
    fn consume(&self);

    /// Abort the read sequence; peeked blocks stay in the stream.
    fn unpeek(&self);

    /// Cancel both zero-copy sequences and empty the stream.
    fn reset(&self);

    fn is_empty(&self) -> bool;

    fn is_full(&self) -> bool;

    fn block_count(&self) -> usize;

    fn used_block_count(&self) -> usize;

    /// Block size and format the producer must write.
    fn input_traits(&self) -> Traits;

    /// Block size and format the consumer reads.
    fn output_traits(&self) -> Traits;
}
