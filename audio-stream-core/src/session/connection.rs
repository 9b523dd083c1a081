use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::StreamError;
use crate::models::state::ConnectionState;
use crate::traits::abstract_stream::AbstractStream;
use crate::traits::endpoint::{Sink, Source};

/// Ties one source, one sink and the stream between them.
///
/// Construction attaches both endpoints to the stream; dropping the
/// connection disables it and detaches them again. The connection shares the
/// endpoints and the stream, it does not own them exclusively.
///
/// ```text
/// [Source] ──push/reserve──→ [Stream] ──pop/peek──→ [Sink]
///     └──────────── StreamConnection (enabled | disabled) ───┘
/// ```
pub struct StreamConnection {
    source: Arc<dyn Source>,
    sink: Arc<dyn Sink>,
    stream: Arc<dyn AbstractStream>,
    state: Mutex<ConnectionState>,
    /// Serializes `enable`/`disable`; `state` itself is never held across
    /// endpoint callbacks.
    transition: Mutex<()>,
}

impl StreamConnection {
    /// Attach `source` and `sink` to `stream`. Starts disabled.
    ///
    /// If either endpoint is already attached to a live stream nothing is
    /// changed and `StreamError::AlreadyConnected` is returned.
    pub fn new(
        source: Arc<dyn Source>,
        sink: Arc<dyn Sink>,
        stream: Arc<dyn AbstractStream>,
    ) -> Result<Self, StreamError> {
        source.source_endpoint().connect_stream(&stream)?;
        if let Err(e) = sink.sink_endpoint().connect_stream(&stream) {
            source.source_endpoint().disconnect_stream();
            return Err(e);
        }

        log::debug!("Connected endpoints through stream {}", stream.id());
        Ok(Self {
            source,
            sink,
            stream,
            state: Mutex::new(ConnectionState::Disabled),
            transition: Mutex::new(()),
        })
    }

    /// Start the data path: empty the stream, then start the sink before the
    /// source so no produced block goes unread.
    pub fn enable(&self) {
        let _transition = self.transition.lock();
        if !self.set_state(ConnectionState::Enabled) {
            return;
        }
        self.stream.reset();
        self.sink.enable_output();
        self.source.enable_input();
        log::info!("Stream {} enabled", self.stream.id());
    }

    /// Stop the data path: source first, then sink, then drop buffered blocks.
    pub fn disable(&self) {
        let _transition = self.transition.lock();
        if !self.set_state(ConnectionState::Disabled) {
            return;
        }
        self.source.disable_input();
        self.sink.disable_output();
        self.stream.reset();
        log::info!("Stream {} disabled", self.stream.id());
    }

    /// Returns false if the connection already was in `next`.
    fn set_state(&self, next: ConnectionState) -> bool {
        let mut state = self.state.lock();
        if *state == next {
            return false;
        }
        *state = next;
        true
    }

    /// Disable and detach both endpoints.
    pub fn destroy(self) {
        drop(self);
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().is_enabled()
    }

    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    pub fn stream(&self) -> &Arc<dyn AbstractStream> {
        &self.stream
    }
}

impl fmt::Debug for StreamConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConnection")
            .field("stream", &self.stream.id())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Drop for StreamConnection {
    fn drop(&mut self) {
        self.disable();
        self.source.source_endpoint().disconnect_stream();
        self.sink.sink_endpoint().disconnect_stream();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Weak;

    use super::*;
    use crate::models::audio_format::AudioFormat;
    use crate::models::stream_models::Capabilities;
    use crate::processing::allocators::StandardAllocator;
    use crate::processing::stream::Stream;
    use crate::test_support::{CallLog, TestEndpoint};
    use crate::traits::endpoint::Endpoint;

    const FORMAT: AudioFormat = AudioFormat::new(16000, 16, 1);

    struct Fixture {
        source: Arc<TestEndpoint>,
        sink: Arc<TestEndpoint>,
        stream: Arc<Stream>,
        log: CallLog,
    }

    fn fixture() -> Fixture {
        let log = CallLog::default();
        let endpoint = |name| {
            Arc::new(
                TestEndpoint::with_capabilities(name, FORMAT, Capabilities::default())
                    .with_log(log.clone()),
            )
        };
        Fixture {
            source: endpoint("source"),
            sink: endpoint("sink"),
            stream: Arc::new(Stream::new(FORMAT, &StandardAllocator, 4, 4).unwrap()),
            log: log.clone(),
        }
    }

    fn connect(f: &Fixture) -> StreamConnection {
        StreamConnection::new(f.source.clone(), f.sink.clone(), f.stream.clone()).unwrap()
    }

    #[test]
    fn new_attaches_both_endpoints_disabled() {
        let f = fixture();
        let connection = connect(&f);

        assert!(f.source.source_endpoint().is_connected());
        assert!(f.sink.sink_endpoint().is_connected());
        assert_eq!(connection.state(), ConnectionState::Disabled);
        assert!(f.log.lock().is_empty());
    }

    #[test]
    fn enable_resets_then_starts_sink_before_source() {
        let f = fixture();
        let connection = connect(&f);
        f.stream.push(&[1, 2, 3, 4]).unwrap();

        connection.enable();
        connection.enable();

        assert!(f.stream.is_empty());
        assert!(connection.is_enabled());
        assert_eq!(f.source.calls(), vec!["sink.enable_output", "source.enable_input"]);
    }

    #[test]
    fn disable_stops_source_before_sink() {
        let f = fixture();
        let connection = connect(&f);
        connection.disable();
        assert!(f.log.lock().is_empty());

        connection.enable();
        f.stream.push(&[1, 2, 3, 4]).unwrap();
        f.log.lock().clear();
        connection.disable();

        assert!(f.stream.is_empty());
        assert_eq!(connection.state(), ConnectionState::Disabled);
        assert_eq!(f.sink.calls(), vec!["source.disable_input", "sink.disable_output"]);
    }

    /// Source that queries its connection from inside the lifecycle callbacks.
    struct QueryingSource {
        endpoint: TestEndpoint,
        connection: Mutex<Weak<StreamConnection>>,
        observed: Mutex<Vec<ConnectionState>>,
    }

    impl QueryingSource {
        fn observe(&self) {
            if let Some(connection) = self.connection.lock().upgrade() {
                self.observed.lock().push(connection.state());
            }
        }
    }

    impl Source for QueryingSource {
        fn source_endpoint(&self) -> &Endpoint {
            self.endpoint.source_endpoint()
        }

        fn source_format(&self) -> AudioFormat {
            FORMAT
        }

        fn enable_input(&self) {
            self.observe();
        }

        fn disable_input(&self) {
            self.observe();
        }

        fn on_data_receive(&self) {}
    }

    #[test]
    fn callbacks_may_query_the_connection() {
        let f = fixture();
        let source = Arc::new(QueryingSource {
            endpoint: TestEndpoint::new(FORMAT),
            connection: Mutex::new(Weak::new()),
            observed: Mutex::new(Vec::new()),
        });
        let connection = Arc::new(
            StreamConnection::new(source.clone(), f.sink.clone(), f.stream.clone()).unwrap(),
        );
        *source.connection.lock() = Arc::downgrade(&connection);

        connection.enable();
        connection.disable();

        assert_eq!(
            *source.observed.lock(),
            vec![ConnectionState::Enabled, ConnectionState::Disabled]
        );
    }

    #[test]
    fn destroy_disables_and_detaches() {
        let f = fixture();
        let connection = connect(&f);
        connection.enable();

        connection.destroy();

        assert!(!f.source.source_endpoint().is_connected());
        assert!(!f.sink.sink_endpoint().is_connected());
        assert_eq!(
            f.log.lock().last().map(String::as_str),
            Some("sink.disable_output")
        );
    }

    #[test]
    fn busy_sink_rolls_back_source() {
        let f = fixture();
        let other: Arc<dyn AbstractStream> =
            Arc::new(Stream::new(FORMAT, &StandardAllocator, 4, 4).unwrap());
        f.sink.sink_endpoint().connect_stream(&other).unwrap();

        let result = StreamConnection::new(f.source.clone(), f.sink.clone(), f.stream.clone());

        assert!(matches!(result, Err(StreamError::AlreadyConnected)));
        assert!(!f.source.source_endpoint().is_connected());
        assert_eq!(f.sink.sink_endpoint().stream().unwrap().id(), other.id());
    }

    #[test]
    fn busy_source_is_rejected() {
        let f = fixture();
        let _first = connect(&f);
        let sink = Arc::new(TestEndpoint::new(FORMAT));

        let result = StreamConnection::new(f.source.clone(), sink.clone(), f.stream.clone());

        assert!(matches!(result, Err(StreamError::AlreadyConnected)));
        assert!(!sink.sink_endpoint().is_connected());
    }
}
