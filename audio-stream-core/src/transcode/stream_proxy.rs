use std::sync::Arc;

use crate::models::error::StreamError;
use crate::models::stream_models::{StreamId, Traits};
use crate::processing::listener_registry::ListenerHandle;
use crate::processing::span::Span;
use crate::traits::abstract_stream::{AbstractStream, EventListener};

/// Forwards every stream operation unchanged to a wrapped stream.
///
/// Decorators embed a `StreamProxy` and forward what they do not override.
#[derive(Clone)]
pub struct StreamProxy {
    inner: Arc<dyn AbstractStream>,
}

impl StreamProxy {
    pub fn new(inner: Arc<dyn AbstractStream>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<dyn AbstractStream> {
        &self.inner
    }
}

impl AbstractStream for StreamProxy {
    fn id(&self) -> StreamId {
        self.inner.id()
    }

    fn register_listener(&self, listener: Arc<dyn EventListener>) -> ListenerHandle {
        self.inner.register_listener(listener)
    }

    fn unregister_listener(&self, handle: ListenerHandle) -> bool {
        self.inner.unregister_listener(handle)
    }

    fn push(&self, data: &[u8]) -> Result<(), StreamError> {
        self.inner.push(data)
    }

    fn push_silence(&self) -> Result<(), StreamError> {
        self.inner.push_silence()
    }

    fn pop(&self, data: &mut [u8]) -> Result<(), StreamError> {
        self.inner.pop(data)
    }

    fn reserve(&self) -> Result<Span, StreamError> {
        self.inner.reserve()
    }

    fn commit(&self) {
        self.inner.commit()
    }

    fn release(&self) {
        self.inner.release()
    }

    fn peek(&self) -> Result<Span, StreamError> {
        self.inner.peek()
    }

    fn consume(&self) {
        self.inner.consume()
    }

    fn unpeek(&self) {
        self.inner.unpeek()
    }

    fn reset(&self) {
        self.inner.reset()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    fn block_count(&self) -> usize {
        self.inner.block_count()
    }

    fn used_block_count(&self) -> usize {
        self.inner.used_block_count()
    }

    fn input_traits(&self) -> Traits {
        self.inner.input_traits()
    }

    fn output_traits(&self) -> Traits {
        self.inner.output_traits()
    }
}
