use std::fmt;
use std::slice;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::{NegotiationError, StreamError};
use crate::models::stream_models::{StreamId, Traits};
use crate::processing::listener_registry::ListenerHandle;
use crate::processing::span::Span;
use crate::traits::abstract_stream::{AbstractStream, EventListener};
use crate::traits::allocator::{Allocation, Allocator};
use crate::traits::transform::Transform;
use crate::transcode::stream_proxy::StreamProxy;

struct Workspace {
    buffer: Allocation,
    /// Block reserved in the wrapped stream while the producer fills `buffer`.
    reservation: Option<Span>,
}

impl Workspace {
    fn bytes(&mut self) -> &mut [u8] {
        if self.buffer.is_empty() {
            return &mut [];
        }
        // SAFETY: the allocation is live for `self`, and the producer only
        // writes it through a reservation view, never while we hold `&mut self`
        // on its behalf.
        unsafe { slice::from_raw_parts_mut(self.buffer.as_ptr(), self.buffer.len()) }
    }
}

/// Transcodes producer blocks on their way into the wrapped stream.
///
/// The producer writes in the transform's input format (see
/// [`input_traits`](AbstractStream::input_traits)); the wrapped stream stores
/// the converted blocks. Both write protocols are supported:
/// - `push` copies the block into a private workspace, transforms it there
///   and pushes the result;
/// - `reserve` reserves a block in the wrapped stream but hands out a view
///   of the workspace; `commit` transforms the workspace into the reserved
///   block and commits it.
///
/// Only one proxy reservation may be open at a time. Everything on the
/// consumer side is forwarded unchanged.
pub struct InputTranscodeProxy {
    proxy: StreamProxy,
    transform: Arc<dyn Transform>,
    input_traits: Traits,
    workspace: Mutex<Workspace>,
}

impl InputTranscodeProxy {
    /// Wrap `stream` so that producers can write blocks that `transform`
    /// converts into the stream's input traits.
    ///
    /// The workspace handed out by `reserve` comes from `allocator`, which
    /// must be the one backing `stream` when the producer is DMA-bound.
    pub fn new(
        stream: Arc<dyn AbstractStream>,
        transform: Arc<dyn Transform>,
        allocator: &dyn Allocator,
    ) -> Result<Self, NegotiationError> {
        let stored = stream.input_traits();
        let input_traits = Traits {
            block_size: transform.transform_block_size_inverted(stored.block_size),
            format: transform.transform_format_inverted(&stored.format),
        };

        if !transform.validate_input_format(&input_traits.format)
            || transform.transform_format(&input_traits.format) != stored.format
        {
            return Err(NegotiationError::UnsupportedTranscoding {
                source_format: input_traits.format,
                sink_format: stored.format,
                reason: "transform cannot produce the stream format",
            });
        }
        if transform.transform_block_size(input_traits.block_size) != stored.block_size {
            return Err(NegotiationError::BlockSizeNotTranscodable {
                block_size: stored.block_size,
            });
        }

        let workspace_size = input_traits
            .block_size
            .max(transform.transform_size(input_traits.block_size));

        Ok(Self {
            proxy: StreamProxy::new(stream),
            transform,
            input_traits,
            workspace: Mutex::new(Workspace {
                buffer: allocator.allocate(workspace_size)?,
                reservation: None,
            }),
        })
    }

    pub fn transform(&self) -> &Arc<dyn Transform> {
        &self.transform
    }

    /// The wrapped stream.
    pub fn inner(&self) -> &Arc<dyn AbstractStream> {
        self.proxy.inner()
    }
}

impl fmt::Debug for InputTranscodeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputTranscodeProxy")
            .field("stream", &self.proxy.id())
            .field("input_traits", &self.input_traits)
            .finish_non_exhaustive()
    }
}

impl AbstractStream for InputTranscodeProxy {
    fn id(&self) -> StreamId {
        self.proxy.id()
    }

    fn register_listener(&self, listener: Arc<dyn EventListener>) -> ListenerHandle {
        self.proxy.register_listener(listener)
    }

    fn unregister_listener(&self, handle: ListenerHandle) -> bool {
        self.proxy.unregister_listener(handle)
    }

    fn push(&self, data: &[u8]) -> Result<(), StreamError> {
        let block_size = self.input_traits.block_size;
        if data.len() != block_size {
            return Err(StreamError::BlockSizeMismatch {
                expected: block_size,
                actual: data.len(),
            });
        }

        let mut workspace = self.workspace.lock();
        if workspace.reservation.is_some() {
            return Err(StreamError::WriteReservationOpen);
        }
        let buffer = workspace.bytes();
        buffer[..block_size].copy_from_slice(data);
        let output_size = self.transform.transform_in_place(buffer, block_size);
        self.proxy.push(&buffer[..output_size])
    }

    fn push_silence(&self) -> Result<(), StreamError> {
        self.proxy.push_silence()
    }

    fn pop(&self, data: &mut [u8]) -> Result<(), StreamError> {
        self.proxy.pop(data)
    }

    fn reserve(&self) -> Result<Span, StreamError> {
        let mut workspace = self.workspace.lock();
        if workspace.reservation.is_some() {
            return Err(StreamError::WriteReservationOpen);
        }
        let target = self.proxy.reserve()?;
        workspace.reservation = Some(target);
        Ok(Span::from_raw_parts(
            workspace.buffer.as_ptr(),
            self.input_traits.block_size,
        ))
    }

    /// Transform the pending proxy reservation, if any, into its reserved
    /// block, then commit the wrapped stream.
    fn commit(&self) {
        let mut workspace = self.workspace.lock();
        let pending = workspace.reservation.take();
        if let Some(target) = pending {
            let buffer = workspace.bytes();
            let output_size = self
                .transform
                .transform_in_place(buffer, self.input_traits.block_size)
                .min(target.len());
            // SAFETY: `target` is the wrapped stream's open reservation, which
            // only this proxy writes until the commit below.
            let reserved = unsafe { target.as_mut_slice() };
            reserved[..output_size].copy_from_slice(&buffer[..output_size]);
        }
        drop(workspace);
        self.proxy.commit();
    }

    fn release(&self) {
        self.workspace.lock().reservation = None;
        self.proxy.release();
    }

    fn peek(&self) -> Result<Span, StreamError> {
        self.proxy.peek()
    }

    fn consume(&self) {
        self.proxy.consume()
    }

    fn unpeek(&self) {
        self.proxy.unpeek()
    }

    fn reset(&self) {
        self.workspace.lock().reservation = None;
        self.proxy.reset();
    }

    fn is_empty(&self) -> bool {
        self.proxy.is_empty()
    }

    fn is_full(&self) -> bool {
        self.proxy.is_full()
    }

    fn block_count(&self) -> usize {
        self.proxy.block_count()
    }

    fn used_block_count(&self) -> usize {
        self.proxy.used_block_count()
    }

    /// What the producer writes: the pre-image of the wrapped stream's input.
    fn input_traits(&self) -> Traits {
        self.input_traits
    }

    fn output_traits(&self) -> Traits {
        self.proxy.output_traits()
    }
}
