use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::stream_models::ExecutionContext;
use crate::traits::abstract_stream::{AbstractStream, Event, EventListener};

/// Token returned by `register`, used to remove the registration later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

#[derive(Clone)]
struct Registration {
    handle: ListenerHandle,
    listener: Arc<dyn EventListener>,
}

/// Copy-on-write list of event listeners.
///
/// `broadcast` iterates over a snapshot, so listeners may register or
/// unregister (themselves included) from inside `on_event`.
pub struct ListenerRegistry {
    next_handle: AtomicU64,
    registrations: Mutex<Arc<[Registration]>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            registrations: Mutex::new(Arc::from(Vec::<Registration>::new())),
        }
    }

    pub fn register(&self, listener: Arc<dyn EventListener>) -> ListenerHandle {
        let handle = ListenerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let mut registrations = self.registrations.lock();
        let mut updated = registrations.to_vec();
        updated.push(Registration { handle, listener });
        *registrations = Arc::from(updated);
        handle
    }

    pub fn unregister(&self, handle: ListenerHandle) -> bool {
        let mut registrations = self.registrations.lock();
        if !registrations.iter().any(|r| r.handle == handle) {
            return false;
        }
        let updated: Vec<Registration> = registrations
            .iter()
            .filter(|r| r.handle != handle)
            .cloned()
            .collect();
        *registrations = Arc::from(updated);
        true
    }

    pub fn len(&self) -> usize {
        self.registrations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.lock().is_empty()
    }

    pub fn broadcast(&self, stream: &dyn AbstractStream, event: Event, context: ExecutionContext) {
        let snapshot = self.registrations.lock().clone();
        for registration in snapshot.iter() {
            registration.listener.on_event(stream, event, context);
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
