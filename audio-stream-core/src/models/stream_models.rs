use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audio_format::AudioFormat;

/// Block-size range and memory requirements declared by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// The endpoint moves data with DMA, so the stream buffer must be DMA-safe.
    pub uses_dma: bool,
    pub min_block_size: usize,
    pub max_block_size: usize,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            uses_dma: false,
            min_block_size: 1,
            max_block_size: usize::MAX,
        }
    }
}

/// What a stream side expects: the block size and the format of each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Traits {
    pub block_size: usize,
    pub format: AudioFormat,
}

/// Identity of a stream, reported alongside queued events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(Uuid);

impl StreamId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether a stream side runs in a task or in an interrupt handler.
///
/// Passed explicitly to event listeners; nothing in this crate tries to
/// detect it at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    #[default]
    Task,
    Interrupt,
}
