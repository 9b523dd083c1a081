use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::audio_format::AudioFormat;
use crate::models::error::StreamError;
use crate::models::stream_models::Capabilities;
use crate::traits::abstract_stream::AbstractStream;

/// One direction of an audio endpoint: declared capabilities plus the stream
/// it is currently attached to.
///
/// The stream is held weakly. An endpoint whose stream has been dropped counts
/// as disconnected.
pub struct Endpoint {
    capabilities: Capabilities,
    stream: Mutex<Option<Weak<dyn AbstractStream>>>,
}

impl Endpoint {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            stream: Mutex::new(None),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Attach to `stream`. Fails if already attached to a live stream.
    pub fn connect_stream(&self, stream: &Arc<dyn AbstractStream>) -> Result<(), StreamError> {
        let mut slot = self.stream.lock();
        if slot.as_ref().is_some_and(|weak| weak.strong_count() > 0) {
            return Err(StreamError::AlreadyConnected);
        }
        *slot = Some(Arc::downgrade(stream));
        Ok(())
    }

    pub fn disconnect_stream(&self) {
        if self.stream.lock().take().is_none() {
            log::warn!("Disconnecting an endpoint that is not connected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream().is_some()
    }

    /// The attached stream, if it is still alive.
    pub fn stream(&self) -> Option<Arc<dyn AbstractStream>> {
        self.stream.lock().as_ref().and_then(Weak::upgrade)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(Capabilities::default())
    }
}

/// Producer endpoint (microphone, codec input, decoder, ...).
///
/// Implemented by drivers; `StreamConnection` drives the enable/disable calls.
pub trait Source: Send + Sync {
    fn source_endpoint(&self) -> &Endpoint;

    /// Format of the blocks this source produces.
    fn source_format(&self) -> AudioFormat;

    fn enable_input(&self);

    fn disable_input(&self);

    /// Called by the audio service when the hardware has data for the stream.
    fn on_data_receive(&self);
}

/// Consumer endpoint (speaker, codec output, encoder, ...).
pub trait Sink: Send + Sync {
    fn sink_endpoint(&self) -> &Endpoint;

    /// Format of the blocks this sink consumes.
    fn sink_format(&self) -> AudioFormat;

    fn enable_output(&self);

    fn disable_output(&self);

    /// Called by the audio service when the hardware wants data from the stream.
    fn on_data_send(&self);
}

/// Full-duplex endpoint: a `Source` and a `Sink` with one stream per direction.
///
/// The output stream is the one the source side writes into; the input stream
/// is the one the sink side reads from.
pub trait IOProxy: Source + Sink {
    fn connect_output_stream(&self, stream: &Arc<dyn AbstractStream>) -> Result<(), StreamError> {
        self.source_endpoint().connect_stream(stream)
    }

    fn connect_input_stream(&self, stream: &Arc<dyn AbstractStream>) -> Result<(), StreamError> {
        self.sink_endpoint().connect_stream(stream)
    }

    fn disconnect_output_stream(&self) {
        self.source_endpoint().disconnect_stream();
    }

    fn disconnect_input_stream(&self) {
        self.sink_endpoint().disconnect_stream();
    }

    fn is_source_connected(&self) -> bool {
        self.source_endpoint().is_connected()
    }

    fn is_sink_connected(&self) -> bool {
        self.sink_endpoint().is_connected()
    }
}

impl<T: Source + Sink + ?Sized> IOProxy for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::allocators::StandardAllocator;
    use crate::processing::stream::Stream;
    use crate::test_support::TestEndpoint;

    fn make_stream() -> Arc<dyn AbstractStream> {
        Arc::new(Stream::new(AudioFormat::new(16000, 16, 1), &StandardAllocator, 8, 4).unwrap())
    }

    #[test]
    fn connect_rejects_second_stream() {
        let endpoint = Endpoint::default();
        let first = make_stream();
        let second = make_stream();

        endpoint.connect_stream(&first).unwrap();
        assert!(endpoint.is_connected());
        assert_eq!(endpoint.connect_stream(&second), Err(StreamError::AlreadyConnected));
        assert_eq!(endpoint.stream().unwrap().id(), first.id());

        endpoint.disconnect_stream();
        assert!(!endpoint.is_connected());
        endpoint.connect_stream(&second).unwrap();
        assert_eq!(endpoint.stream().unwrap().id(), second.id());
    }

    #[test]
    fn dropped_stream_counts_as_disconnected() {
        let endpoint = Endpoint::default();
        let stream = make_stream();
        endpoint.connect_stream(&stream).unwrap();

        drop(stream);

        assert!(!endpoint.is_connected());
        assert!(endpoint.connect_stream(&make_stream()).is_ok());
    }

    #[test]
    fn io_proxy_directions_are_independent() {
        let duplex = TestEndpoint::new(AudioFormat::new(16000, 16, 1));
        let output = make_stream();
        let input = make_stream();

        duplex.connect_output_stream(&output).unwrap();
        assert!(duplex.is_source_connected());
        assert!(!duplex.is_sink_connected());

        duplex.connect_input_stream(&input).unwrap();
        assert!(duplex.is_sink_connected());

        duplex.disconnect_output_stream();
        assert!(!duplex.is_source_connected());
        assert!(duplex.is_sink_connected());
        assert_eq!(duplex.sink_endpoint().stream().unwrap().id(), input.id());
    }
}
