// Subscriber Registry

use crate::domain::Entity;
use std::sync::Arc;

/// Snapshot callback invoked after every committed entity change.
pub type SubscriberCallback = Arc<dyn Fn(&[Entity]) + Send + Sync>;

/// Registry of live subscribers, mutated only by the owning provider.
#[derive(Default)]
pub(super) struct SubscriberRegistry {
    next_id: u64,
    entries: Vec<(u64, SubscriberCallback)>,
}

impl SubscriberRegistry {
    pub(super) fn insert(&mut self, callback: SubscriberCallback) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push((id, callback));
        id
    }

    pub(super) fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    /// Clone the callback list so notification can run outside the state
    /// lock.
    pub(super) fn callbacks(&self) -> Vec<SubscriberCallback> {
        self.entries.iter().map(|(_, cb)| cb.clone()).collect()
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}
