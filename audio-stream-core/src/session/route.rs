use std::fmt;
use std::sync::Arc;

use crate::models::error::NegotiationError;
use crate::session::connection::StreamConnection;
use crate::session::stream_factory::StreamFactory;
use crate::traits::abstract_stream::AbstractStream;
use crate::traits::endpoint::{Sink, Source};
use crate::traits::transform::Transform;
use crate::transcode::factory::TransformFactory;

/// A source wired to a sink, transcoding on the way when their formats differ.
///
/// ```text
/// [Source] → [InputTranscodeProxy]? → [Stream] → [Sink]
/// ```
///
/// Setup happens once in [`AudioRoute::open`]; a route that cannot be
/// negotiated is rejected rather than started with a degraded pipeline.
pub struct AudioRoute {
    transform: Arc<dyn Transform>,
    stream: Arc<dyn AbstractStream>,
    connection: StreamConnection,
}

impl AudioRoute {
    /// Build the transform, the stream and the connection for
    /// `source → sink`. The route starts disabled.
    pub fn open(
        source: Arc<dyn Source>,
        sink: Arc<dyn Sink>,
        streams: &StreamFactory,
        transforms: &TransformFactory,
    ) -> Result<Self, NegotiationError> {
        let source_format = source.source_format();
        let sink_format = sink.sink_format();

        let route = Self::build(source, sink, streams, transforms);
        match &route {
            Ok(route) => log::debug!(
                "Opened route {} -> {} on stream {}",
                source_format,
                sink_format,
                route.stream.id()
            ),
            Err(e) => log::error!(
                "Rejected route {} -> {}: {}",
                source_format,
                sink_format,
                e
            ),
        }
        route
    }

    fn build(
        source: Arc<dyn Source>,
        sink: Arc<dyn Sink>,
        streams: &StreamFactory,
        transforms: &TransformFactory,
    ) -> Result<Self, NegotiationError> {
        let source_format = source.source_format();
        let sink_format = sink.sink_format();
        let transform = transforms.make_transform(&source_format, &sink_format)?;

        let stream: Arc<dyn AbstractStream> = if source_format == sink_format {
            streams.make_stream(source.as_ref(), sink.as_ref(), sink_format)?
        } else {
            streams.make_input_transcoding_stream(
                source.as_ref(),
                sink.as_ref(),
                Arc::clone(&transform),
            )?
        };

        let connection = StreamConnection::new(source, sink, Arc::clone(&stream))?;
        Ok(Self {
            transform,
            stream,
            connection,
        })
    }

    pub fn enable(&self) {
        self.connection.enable();
    }

    pub fn disable(&self) {
        self.connection.disable();
    }

    pub fn is_enabled(&self) -> bool {
        self.connection.is_enabled()
    }

    /// The stream the source writes into.
    pub fn stream(&self) -> &Arc<dyn AbstractStream> {
        &self.stream
    }

    pub fn connection(&self) -> &StreamConnection {
        &self.connection
    }

    pub fn transform(&self) -> &Arc<dyn Transform> {
        &self.transform
    }

    /// Disable the route and detach its endpoints.
    pub fn close(self) {
        self.connection.destroy();
    }
}

impl fmt::Debug for AudioRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioRoute")
            .field("stream", &self.stream.id())
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio_format::AudioFormat;
    use crate::models::error::StreamError;
    use crate::models::stream_models::Capabilities;
    use crate::test_support::{bytes_to_samples, init_logging, samples_to_bytes, TestEndpoint};

    fn endpoint(
        name: &'static str,
        format: AudioFormat,
        max_block_size: usize,
    ) -> Arc<TestEndpoint> {
        Arc::new(TestEndpoint::with_capabilities(
            name,
            format,
            Capabilities {
                max_block_size,
                ..Capabilities::default()
            },
        ))
    }

    fn open(
        source: &Arc<TestEndpoint>,
        sink: &Arc<TestEndpoint>,
    ) -> Result<AudioRoute, NegotiationError> {
        AudioRoute::open(
            source.clone(),
            sink.clone(),
            &StreamFactory::default(),
            &TransformFactory,
        )
    }

    #[test]
    fn matching_formats_use_a_plain_stream() {
        let format = AudioFormat::new(16000, 16, 1);
        let source = endpoint("mic", format, 64);
        let sink = endpoint("app", format, 128);

        let route = open(&source, &sink).unwrap();

        let traits = route.stream().input_traits();
        assert_eq!(traits.block_size, 64);
        assert_eq!(traits, route.stream().output_traits());
        assert!(source.source_endpoint().is_connected());
        assert!(sink.sink_endpoint().is_connected());
    }

    #[test]
    fn mono_source_feeds_stereo_sink() {
        let source = endpoint("mic", AudioFormat::new(8000, 16, 1), 64);
        let sink = endpoint("speaker", AudioFormat::new(16000, 16, 2), 1024);

        let route = open(&source, &sink).unwrap();
        route.enable();

        let stream = route.stream();
        assert_eq!(stream.input_traits().block_size, 64);
        assert_eq!(stream.output_traits().block_size, 256);

        let mut block = vec![0u16; 32];
        block[0] = 7;
        block[1] = 9;
        stream.push(&samples_to_bytes(&block)).unwrap();

        let mut out = vec![0u8; 256];
        stream.pop(&mut out).unwrap();
        assert_eq!(&bytes_to_samples(&out)[..8], &[7, 7, 7, 7, 9, 9, 9, 9]);
    }

    #[test]
    fn enable_and_close_drive_the_endpoints() {
        let format = AudioFormat::new(16000, 16, 1);
        let source = endpoint("mic", format, 64);
        let sink = endpoint("app", format, 64);

        let route = open(&source, &sink).unwrap();
        route.enable();
        assert!(route.is_enabled());
        route.close();

        assert_eq!(source.calls(), vec!["mic.enable_input", "mic.disable_input"]);
        assert_eq!(sink.calls(), vec!["app.enable_output", "app.disable_output"]);
        assert!(!source.source_endpoint().is_connected());
    }

    #[test]
    fn unsupported_conversion_rejects_the_route() {
        init_logging();
        let source = endpoint("mic", AudioFormat::new(16000, 16, 1), 64);
        let sink = endpoint("app", AudioFormat::new(44100, 16, 1), 64);

        let result = open(&source, &sink);

        assert!(matches!(
            result,
            Err(NegotiationError::UnsupportedTranscoding { .. })
        ));
        assert!(!source.source_endpoint().is_connected());
        assert!(!sink.sink_endpoint().is_connected());
    }

    #[test]
    fn busy_endpoint_rejects_the_route() {
        let format = AudioFormat::new(16000, 16, 1);
        let source = endpoint("mic", format, 64);
        let first_sink = endpoint("app", format, 64);
        let second_sink = endpoint("recorder", format, 64);

        let _first = open(&source, &first_sink).unwrap();
        let result = open(&source, &second_sink);

        assert!(matches!(
            result,
            Err(NegotiationError::Stream(StreamError::AlreadyConnected))
        ));
    }
}
