//! # audio-stream-core
//!
//! Platform-agnostic audio streaming core library.
//!
//! Moves fixed-size PCM blocks from a producer endpoint to a consumer endpoint
//! through a ring-buffer stream, and converts sample rate and channel count on
//! the way when the two formats differ. Hardware drivers implement the
//! `Source`/`Sink` traits and plug into `AudioRoute`.
//!
//! ## Architecture
//!
//! ```text
//! audio-stream-core (this crate)
//! ├── traits/       ← AbstractStream, EventListener, Source, Sink, IOProxy, Transform, Allocator
//! ├── models/       ← AudioFormat, Capabilities, StreamConfiguration, StreamError, NegotiationError
//! ├── processing/   ← Stream ring buffer, Span, RingCursor, ListenerRegistry, allocators
//! ├── transcode/    ← Decimator, Interpolator, MonoToStereo, composite, TransformFactory, proxies
//! └── session/      ← StreamConnection, StreamFactory, queued events, AudioRoute
//! ```
//!
//! ## Data flow
//!
//! ```text
//! [Source] → push/reserve → [InputTranscodeProxy]? → [Stream] → pop/peek → [Sink]
//!                                                       │
//!                                        events → [StreamQueuedEventsListener] → task
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;
pub mod transcode;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root for convenience.
pub use models::audio_format::AudioFormat;
pub use models::config::{OverflowPolicy, StreamConfiguration};
pub use models::error::{NegotiationError, StreamError};
pub use models::state::ConnectionState;
pub use models::stream_models::{Capabilities, ExecutionContext, StreamId, Traits};
pub use processing::allocators::{NonCacheableAllocator, StandardAllocator};
pub use processing::listener_registry::ListenerHandle;
pub use processing::span::Span;
pub use processing::stream::Stream;
pub use session::connection::StreamConnection;
pub use session::queued_events::{QueuedEvent, StreamQueuedEventsListener};
pub use session::route::AudioRoute;
pub use session::stream_factory::StreamFactory;
pub use traits::abstract_stream::{AbstractStream, Event, EventListener};
pub use traits::allocator::{Allocation, Allocator, AllocatorKind};
pub use traits::endpoint::{Endpoint, IOProxy, Sink, Source};
pub use traits::transform::Transform;
pub use transcode::composite::TransformComposite;
pub use transcode::decimator::Decimator;
pub use transcode::factory::TransformFactory;
pub use transcode::input_transcode_proxy::InputTranscodeProxy;
pub use transcode::interpolator::Interpolator;
pub use transcode::mono_to_stereo::MonoToStereo;
pub use transcode::null_transform::NullTransform;
pub use transcode::stream_proxy::StreamProxy;
