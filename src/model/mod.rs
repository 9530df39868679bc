//! Entity graph for one recording session.
//!
//! A [`Track`] is the root aggregate: it owns its free POI [`Node`]s, its
//! [`Way`]s (which own their member nodes) and its [`Media`] references.
//! Nodes carry a non-owning back-reference to their way by id; all id
//! lookups are linear scans, which is fine at session scale (low
//! thousands of points).

pub mod media;
pub mod node;
pub mod track;
pub mod way;

pub use media::{Media, MediaKind};
pub use node::Node;
pub use track::{MapObject, Track, TrackInfo};
pub use way::Way;

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Local;

/// Allocator for process-unique entity ids.
///
/// Ids decrement from -1. The only contract callers may rely on is that
/// every allocated id is unique and stable for the lifetime of its
/// entity; neither sign nor ordering is guaranteed.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicI64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicI64::new(-1),
        }
    }

    /// Return a fresh id.
    pub fn allocate(&self) -> i64 {
        self.next.fetch_sub(1, Ordering::Relaxed)
    }

    /// Ensure future ids stay clear of `id` and anything above it.
    ///
    /// Called after loading a persisted track, whose entities keep their
    /// stored ids.
    pub fn reserve_below(&self, id: i64) {
        self.next.fetch_min(id - 1, Ordering::Relaxed);
    }
}

/// ISO-8601 timestamp of the current local time.
pub(crate) fn iso_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()
}

/// Timestamp of the current local time usable as a filename.
pub(crate) fn filename_timestamp() -> String {
    Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn allocated_ids_are_pairwise_distinct() {
        let ids = IdAllocator::new();
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(ids.allocate()));
        }
    }

    #[test]
    fn ids_stay_unique_across_threads() {
        let ids = Arc::new(IdAllocator::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let ids = Arc::clone(&ids);
            handles.push(thread::spawn(move || {
                (0..250).map(|_| ids.allocate()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn reserve_below_moves_past_loaded_ids() {
        let ids = IdAllocator::new();
        ids.reserve_below(-500);
        assert!(ids.allocate() <= -501);
    }

    #[test]
    fn reserve_below_never_moves_forward() {
        let ids = IdAllocator::new();
        for _ in 0..10 {
            ids.allocate();
        }
        ids.reserve_below(-1);
        assert!(ids.allocate() <= -11);
    }
}
