use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::models::config::StreamConfiguration;
use crate::models::stream_models::{ExecutionContext, StreamId};
use crate::traits::abstract_stream::{AbstractStream, Event, EventListener};

/// An event together with the stream that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedEvent {
    pub stream: StreamId,
    pub event: Event,
}

/// Listener that turns stream callbacks into a bounded queue read from a task.
///
/// `on_event` never waits: from interrupt context it only tries the lock, and
/// a full or contended queue drops the event. Drops are counted and logged.
pub struct StreamQueuedEventsListener {
    capacity: usize,
    queue: Mutex<VecDeque<QueuedEvent>>,
    available: Condvar,
    dropped: AtomicU64,
}

impl StreamQueuedEventsListener {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            available: Condvar::new(),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &StreamConfiguration) -> Self {
        Self::new(config.event_queue_depth)
    }

    /// Block until an event is queued or `timeout` elapses. Task context only.
    pub fn wait_for_event(&self, timeout: Duration) -> Option<QueuedEvent> {
        let deadline = Instant::now().checked_add(timeout);
        let mut queue = self.queue.lock();
        loop {
            if let Some(event) = queue.pop_front() {
                return Some(event);
            }
            match deadline {
                Some(deadline) => {
                    if self.available.wait_until(&mut queue, deadline).timed_out() {
                        return queue.pop_front();
                    }
                }
                None => self.available.wait(&mut queue),
            }
        }
    }

    /// Take the oldest queued event, if any, without waiting.
    pub fn get_event(&self) -> Option<QueuedEvent> {
        self.queue.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events lost because the queue was full or busy.
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn drop_event(&self, item: QueuedEvent, reason: &str) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        log::warn!(
            "Dropped {:?} from stream {}: event queue {}",
            item.event,
            item.stream,
            reason
        );
    }
}

impl EventListener for StreamQueuedEventsListener {
    fn on_event(&self, stream: &dyn AbstractStream, event: Event, context: ExecutionContext) {
        let item = QueuedEvent {
            stream: stream.id(),
            event,
        };

        let guard = match context {
            ExecutionContext::Interrupt => self.queue.try_lock(),
            ExecutionContext::Task => Some(self.queue.lock()),
        };
        let Some(mut queue) = guard else {
            self.drop_event(item, "busy");
            return;
        };
        if queue.len() >= self.capacity {
            drop(queue);
            self.drop_event(item, "full");
            return;
        }

        queue.push_back(item);
        drop(queue);
        self.available.notify_one();
    }
}
