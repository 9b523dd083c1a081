//! Recording doubles shared by the unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_format::AudioFormat;
use crate::models::error::StreamError;
use crate::models::stream_models::{Capabilities, ExecutionContext};
use crate::processing::span::Span;
use crate::traits::abstract_stream::{AbstractStream, Event, EventListener};
use crate::traits::allocator::{Allocation, Allocator, AllocatorKind};
use crate::traits::endpoint::{Endpoint, Sink, Source};
use crate::traits::transform::Transform;

/// Route `log` output to the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records every event it receives, with its context.
#[derive(Default)]
pub struct RecordingListener {
    received: Mutex<Vec<(Event, ExecutionContext)>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<Event> {
        self.received.lock().iter().map(|(event, _)| *event).collect()
    }

    pub fn contexts(&self) -> Vec<ExecutionContext> {
        self.received.lock().iter().map(|(_, context)| *context).collect()
    }
}

impl EventListener for RecordingListener {
    fn on_event(&self, _stream: &dyn AbstractStream, event: Event, context: ExecutionContext) {
        self.received.lock().push((event, context));
    }
}

/// Call log shared between endpoints, to check ordering across them.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Endpoint usable as a source, a sink, or both.
///
/// Records `enable_*`/`disable_*`/`on_data_*` calls as `"<name>.<method>"`.
pub struct TestEndpoint {
    name: &'static str,
    source: Endpoint,
    sink: Endpoint,
    source_format: AudioFormat,
    sink_format: AudioFormat,
    log: CallLog,
}

impl TestEndpoint {
    pub fn new(format: AudioFormat) -> Self {
        Self::with_capabilities("endpoint", format, Capabilities::default())
    }

    pub fn with_capabilities(
        name: &'static str,
        format: AudioFormat,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            name,
            source: Endpoint::new(capabilities),
            sink: Endpoint::new(capabilities),
            source_format: format,
            sink_format: format,
            log: CallLog::default(),
        }
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn record(&self, method: &str) {
        self.log.lock().push(format!("{}.{}", self.name, method));
    }
}

impl Source for TestEndpoint {
    fn source_endpoint(&self) -> &Endpoint {
        &self.source
    }

    fn source_format(&self) -> AudioFormat {
        self.source_format
    }

    fn enable_input(&self) {
        self.record("enable_input");
    }

    fn disable_input(&self) {
        self.record("disable_input");
    }

    fn on_data_receive(&self) {
        self.record("on_data_receive");
    }
}

impl Sink for TestEndpoint {
    fn sink_endpoint(&self) -> &Endpoint {
        &self.sink
    }

    fn sink_format(&self) -> AudioFormat {
        self.sink_format
    }

    fn enable_output(&self) {
        self.record("enable_output");
    }

    fn disable_output(&self) {
        self.record("disable_output");
    }

    fn on_data_send(&self) {
        self.record("on_data_send");
    }
}

/// Delegating allocator that remembers the address range of every allocation.
pub struct TrackingAllocator<A> {
    inner: A,
    ranges: Mutex<Vec<(usize, usize)>>,
}

impl<A: Allocator> TrackingAllocator<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            ranges: Mutex::new(Vec::new()),
        }
    }

    pub fn allocation_count(&self) -> usize {
        self.ranges.lock().len()
    }

    /// Whether `span` lies entirely inside one allocation made here.
    pub fn owns(&self, span: &Span) -> bool {
        let start = span.data() as usize;
        let end = start + span.len();
        self.ranges
            .lock()
            .iter()
            .any(|&(base, len)| start >= base && end <= base + len)
    }
}

impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn allocate(&self, size: usize) -> Result<Allocation, StreamError> {
        let allocation = self.inner.allocate(size)?;
        self.ranges
            .lock()
            .push((allocation.as_ptr() as usize, allocation.len()));
        Ok(allocation)
    }

    fn kind(&self) -> AllocatorKind {
        self.inner.kind()
    }
}

/// Bitwise NOT of every byte; keeps format and size.
pub struct InverseTransform;

impl Transform for InverseTransform {
    fn transform_in_place(&self, buffer: &mut [u8], input_size: usize) -> usize {
        for byte in &mut buffer[..input_size] {
            *byte = !*byte;
        }
        input_size
    }

    fn validate_input_format(&self, _input_format: &AudioFormat) -> bool {
        true
    }

    fn transform_format(&self, input_format: &AudioFormat) -> AudioFormat {
        *input_format
    }

    fn transform_format_inverted(&self, output_format: &AudioFormat) -> AudioFormat {
        *output_format
    }

    fn transform_block_size(&self, input_block_size: usize) -> usize {
        input_block_size
    }

    fn transform_block_size_inverted(&self, output_block_size: usize) -> usize {
        output_block_size
    }
}

pub fn samples_to_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|sample| sample.to_ne_bytes()).collect()
}

pub fn bytes_to_samples(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .collect()
}
