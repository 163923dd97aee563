// cockpit_core/src/tracking/subscription.rs

use crate::messages::TrackerEvent;
use std::sync::{Arc, Mutex, PoisonError, Weak};

pub type TrackerListener = Box<dyn FnMut(&TrackerEvent) + Send>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(u64, TrackerListener)>,
}

/// The listeners registered on a `DeviceTracker`.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    table: Arc<Mutex<ListenerTable>>,
}

impl ListenerRegistry {
    pub(crate) fn register(&self, listener: TrackerListener) -> Subscription {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let id = table.next_id;
        table.next_id += 1;
        table.entries.push((id, listener));
        Subscription {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Listeners must not subscribe or unsubscribe from inside the callback.
    pub(crate) fn notify(&self, events: &[TrackerEvent]) {
        if events.is_empty() {
            return;
        }
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, listener) in table.entries.iter_mut() {
            for event in events {
                listener(event);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

/// Keeps a tracker listener registered. Dropping it removes the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    table: Weak<Mutex<ListenerTable>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
            table.entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
