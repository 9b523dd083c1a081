use serde::{Deserialize, Serialize};

use super::error::NegotiationError;
use super::stream_models::ExecutionContext;

/// Default number of blocks buffered by a negotiated stream.
pub const DEFAULT_BUFFERING_DEPTH: usize = 24;

/// Default capacity of a queued events listener.
pub const DEFAULT_EVENT_QUEUE_DEPTH: usize = 16;

/// What `Stream::reserve` does when every block is already in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Fail the reservation and report `StreamOverflow`.
    #[default]
    Reject,

    /// Drop every unread block (including an open peek and pending
    /// reservations), restart the stream at the current peek boundary and
    /// hand out a fresh block there. `StreamOverflow` is still reported.
    ///
    /// Kept for compatibility with existing drivers; it silently throws away
    /// audio the consumer may be holding, so prefer `Reject`.
    DiscardUnread,
}

/// Configuration applied by `StreamFactory` when it builds streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfiguration {
    /// Number of blocks in each stream buffer (default: 24).
    pub buffering_depth: usize,

    /// Reservation behaviour on a full stream (default: reject).
    pub overflow_policy: OverflowPolicy,

    /// Context the producer side calls the stream from (default: task).
    pub producer_context: ExecutionContext,

    /// Context the consumer side calls the stream from (default: task).
    pub consumer_context: ExecutionContext,

    /// Capacity of queued events listeners built from this configuration (default: 16).
    pub event_queue_depth: usize,
}

impl StreamConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.buffering_depth == 0 {
            return Err("buffering depth must be at least one block".into());
        }
        if self.event_queue_depth == 0 {
            return Err("event queue depth must be at least one event".into());
        }
        Ok(())
    }

    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, NegotiationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| NegotiationError::InvalidConfiguration(e.to_string()))?;
        config.validate().map_err(NegotiationError::InvalidConfiguration)?;
        Ok(config)
    }
}

impl Default for StreamConfiguration {
    fn default() -> Self {
        Self {
            buffering_depth: DEFAULT_BUFFERING_DEPTH,
            overflow_policy: OverflowPolicy::Reject,
            producer_context: ExecutionContext::Task,
            consumer_context: ExecutionContext::Task,
            event_queue_depth: DEFAULT_EVENT_QUEUE_DEPTH,
        }
    }
}
