//! Invalidation queue between the entity graph and a presentation layer.
//!
//! Deletes and filter passes push change events from wherever they happen;
//! a single consumer drains the queue and redraws what the events name.

use std::sync::{Mutex, PoisonError};

/// A change to the entity graph that invalidates presentation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The node no longer exists; any view of it is stale.
    NodeInvalidated(i64),
    /// A pending node received its coordinate fix.
    NodeMoved { way: Option<i64>, node: i64 },
    /// A node was appended to a way while recording.
    WayUpdated { way: i64, node: i64 },
    /// Recording of the way finished and its trace was refined.
    WayClosed(i64),
    /// Pending nodes without a fix were dropped in one sweep.
    InvalidsDiscarded,
}

/// Multi-producer, single-consumer queue of [`Change`] events.
///
/// Producers push through a shared reference from any thread; `drain`
/// atomically takes all queued events and resets the queue to empty.
#[derive(Debug, Default)]
pub struct ChangeQueue {
    events: Mutex<Vec<Change>>,
}

impl ChangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event.
    pub fn push(&self, change: Change) {
        self.lock().push(change);
    }

    /// Take all queued events, leaving the queue empty.
    pub fn drain(&self) -> Vec<Change> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Change>> {
        // a poisoned queue only ever holds plain event values
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
