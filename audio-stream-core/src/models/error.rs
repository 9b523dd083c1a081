use thiserror::Error;

use super::audio_format::AudioFormat;

/// Errors reported by stream operations at run time.
///
/// `Overflow`/`Underflow` are capacity errors and are also broadcast to the
/// stream's listeners. The remaining variants indicate protocol misuse by the
/// caller and are never broadcast.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    #[error("stream overflow")]
    Overflow,

    #[error("stream underflow")]
    Underflow,

    #[error("block size mismatch: expected {expected} bytes, got {actual}")]
    BlockSizeMismatch { expected: usize, actual: usize },

    #[error("a zero-copy write reservation is open")]
    WriteReservationOpen,

    #[error("a zero-copy peek is open")]
    PeekOpen,

    #[error("endpoint is already connected to a stream")]
    AlreadyConnected,

    #[error("failed to allocate {size} bytes")]
    AllocationFailed { size: usize },
}

/// Errors raised while setting up an audio route.
///
/// These are configuration errors: the route must be rejected, never started
/// with a degraded pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("no endpoint capabilities to negotiate")]
    NoParticipants,

    #[error("infeasible block size: minimum {min} exceeds maximum {max}")]
    InfeasibleBlockSize { min: usize, max: usize },

    #[error("invalid audio format: {0}")]
    InvalidFormat(AudioFormat),

    #[error("unsupported transcoding from {source_format} to {sink_format}: {reason}")]
    UnsupportedTranscoding {
        source_format: AudioFormat,
        sink_format: AudioFormat,
        reason: &'static str,
    },

    #[error("block size {block_size} cannot be produced by the transform")]
    BlockSizeNotTranscodable { block_size: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("stream setup failed: {0}")]
    Stream(#[from] StreamError),
}
