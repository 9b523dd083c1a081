use std::fmt;
use std::sync::Arc;

use crate::models::audio_format::AudioFormat;
use crate::models::config::StreamConfiguration;
use crate::models::error::NegotiationError;
use crate::models::stream_models::Capabilities;
use crate::processing::allocators::{NonCacheableAllocator, StandardAllocator};
use crate::processing::stream::Stream;
use crate::traits::allocator::Allocator;
use crate::traits::endpoint::{Sink, Source};
use crate::traits::transform::Transform;
use crate::transcode::input_transcode_proxy::InputTranscodeProxy;

/// Builds streams sized and allocated for the endpoints they connect.
///
/// Negotiation over the participants' [`Capabilities`]:
/// - DMA-safe memory if any participant uses DMA;
/// - block size range `[ceil_pow2(max of minimums), floor_pow2(min of maximums)]`;
/// - the block size is the top of that range.
pub struct StreamFactory {
    config: StreamConfiguration,
    standard_allocator: Arc<dyn Allocator>,
    dma_allocator: Arc<dyn Allocator>,
}

impl StreamFactory {
    pub fn new(config: StreamConfiguration) -> Result<Self, NegotiationError> {
        config
            .validate()
            .map_err(NegotiationError::InvalidConfiguration)?;
        Ok(Self {
            config,
            standard_allocator: Arc::new(StandardAllocator),
            dma_allocator: Arc::new(NonCacheableAllocator),
        })
    }

    /// Replace the memory strategies, e.g. with a platform non-cacheable pool.
    pub fn with_allocators(
        mut self,
        standard: Arc<dyn Allocator>,
        dma: Arc<dyn Allocator>,
    ) -> Self {
        self.standard_allocator = standard;
        self.dma_allocator = dma;
        self
    }

    pub fn config(&self) -> &StreamConfiguration {
        &self.config
    }

    /// Combine the capabilities of every participant into one feasible set.
    pub fn negotiate(capabilities: &[Capabilities]) -> Result<Capabilities, NegotiationError> {
        if capabilities.is_empty() {
            return Err(NegotiationError::NoParticipants);
        }

        let uses_dma = capabilities.iter().any(|c| c.uses_dma);
        let largest_min = capabilities
            .iter()
            .map(|c| c.min_block_size)
            .fold(0, usize::max);
        let smallest_max = capabilities
            .iter()
            .map(|c| c.max_block_size)
            .fold(usize::MAX, usize::min);

        let max_block_size = floor_power_of_two(smallest_max);
        let min_block_size = largest_min
            .checked_next_power_of_two()
            .ok_or(NegotiationError::InfeasibleBlockSize {
                min: largest_min,
                max: max_block_size,
            })?;

        if min_block_size > max_block_size {
            return Err(NegotiationError::InfeasibleBlockSize {
                min: min_block_size,
                max: max_block_size,
            });
        }

        let negotiated = Capabilities {
            uses_dma,
            min_block_size,
            max_block_size,
        };
        log::debug!(
            "Negotiated {} participants: blocks {}..={} bytes, dma: {}",
            capabilities.len(),
            min_block_size,
            max_block_size,
            uses_dma
        );
        Ok(negotiated)
    }

    /// Build a stream of `format` blocks between `source` and `sink`.
    pub fn make_stream(
        &self,
        source: &dyn Source,
        sink: &dyn Sink,
        format: AudioFormat,
    ) -> Result<Arc<Stream>, NegotiationError> {
        self.make_stream_from_capabilities(
            &[
                source.source_endpoint().capabilities(),
                sink.sink_endpoint().capabilities(),
            ],
            format,
        )
    }

    pub fn make_stream_from_capabilities(
        &self,
        capabilities: &[Capabilities],
        format: AudioFormat,
    ) -> Result<Arc<Stream>, NegotiationError> {
        let negotiated = Self::negotiate(capabilities)?;
        self.build_stream(&negotiated, format)
    }

    /// Build a stream that stores `transform`'s output, wrapped so that
    /// `source` writes in its own format.
    ///
    /// The source's block-size limits are mapped through the transform before
    /// negotiation, since the stream holds transformed blocks. The proxy
    /// workspace comes from the same allocator as the stream.
    pub fn make_input_transcoding_stream(
        &self,
        source: &dyn Source,
        sink: &dyn Sink,
        transform: Arc<dyn Transform>,
    ) -> Result<Arc<InputTranscodeProxy>, NegotiationError> {
        let source_format = source.source_format();
        let stored_format = transform.transform_format(&source_format);
        if !transform.validate_input_format(&source_format) {
            return Err(NegotiationError::UnsupportedTranscoding {
                source_format,
                sink_format: stored_format,
                reason: "transform does not accept the source format",
            });
        }

        let source_caps = source.source_endpoint().capabilities();
        let mapped = Capabilities {
            uses_dma: source_caps.uses_dma,
            min_block_size: transform.transform_block_size(source_caps.min_block_size),
            max_block_size: transform.transform_block_size(source_caps.max_block_size),
        };

        let negotiated = Self::negotiate(&[mapped, sink.sink_endpoint().capabilities()])?;
        let stream = self.build_stream(&negotiated, stored_format)?;
        let proxy = InputTranscodeProxy::new(
            stream,
            transform,
            self.allocator_for(&negotiated).as_ref(),
        )?;
        Ok(Arc::new(proxy))
    }

    fn allocator_for(&self, negotiated: &Capabilities) -> &Arc<dyn Allocator> {
        if negotiated.uses_dma {
            &self.dma_allocator
        } else {
            &self.standard_allocator
        }
    }

    fn build_stream(
        &self,
        negotiated: &Capabilities,
        format: AudioFormat,
    ) -> Result<Arc<Stream>, NegotiationError> {
        let stream = Stream::new(
            format,
            self.allocator_for(negotiated).as_ref(),
            negotiated.max_block_size,
            self.config.buffering_depth,
        )?
        .with_overflow_policy(self.config.overflow_policy)
        .with_execution_contexts(self.config.producer_context, self.config.consumer_context);

        Ok(Arc::new(stream))
    }
}

impl Default for StreamFactory {
    fn default() -> Self {
        Self {
            config: StreamConfiguration::default(),
            standard_allocator: Arc::new(StandardAllocator),
            dma_allocator: Arc::new(NonCacheableAllocator),
        }
    }
}

impl fmt::Debug for StreamFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamFactory")
            .field("config", &self.config)
            .field("standard_allocator", &self.standard_allocator.kind())
            .field("dma_allocator", &self.dma_allocator.kind())
            .finish()
    }
}

/// Largest power of two not above `value`; zero for zero.
fn floor_power_of_two(value: usize) -> usize {
    match value {
        0 => 0,
        _ => 1 << (usize::BITS - 1 - value.leading_zeros()),
    }
}
