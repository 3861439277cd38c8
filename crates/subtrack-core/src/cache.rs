use std::time::{Duration, Instant};

use crate::models::Subscription;

/// Snapshot cache for the full subscription list.
///
/// One flat snapshot with a TTL, no per-record invalidation. Writes that
/// go through the store patch the snapshot in place while it is fresh;
/// anything else invalidates the whole thing. Staleness is purely
/// time-based - the store is the only writer in this system, so a fresh
/// snapshot can only be wrong by construction, never by a side channel.
///
/// This is an owned field of the store, not module state.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    snapshot: Option<Snapshot>,
}

#[derive(Debug)]
struct Snapshot {
    records: Vec<Subscription>,
    captured_at: Instant,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, snapshot: None }
    }

    /// The cached list, if a snapshot exists and is within TTL.
    pub fn get(&self) -> Option<&[Subscription]> {
        match &self.snapshot {
            Some(snap) if snap.captured_at.elapsed() < self.ttl => Some(&snap.records),
            _ => None,
        }
    }

    /// Replace the snapshot with a freshly loaded list.
    pub fn fill(&mut self, records: Vec<Subscription>) {
        self.snapshot = Some(Snapshot {
            records,
            captured_at: Instant::now(),
        });
    }

    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    /// Append a newly added record. Only applies while the snapshot is
    /// fresh; patching does not extend the capture time.
    pub fn append(&mut self, sub: Subscription) {
        self.patch(|records| records.push(sub));
    }

    /// Swap an updated record in by id.
    pub fn replace(&mut self, sub: Subscription) {
        self.patch(|records| {
            if let Some(existing) = records.iter_mut().find(|r| r.id == sub.id) {
                *existing = sub;
            }
        });
    }

    /// Drop a deleted record by id.
    pub fn remove(&mut self, id: &str) {
        self.patch(|records| records.retain(|r| r.id != id));
    }

    // Patch in place when fresh, otherwise throw the snapshot away - a
    // stale snapshot must never absorb writes and look current.
    fn patch<F: FnOnce(&mut Vec<Subscription>)>(&mut self, f: F) {
        match &mut self.snapshot {
            Some(snap) if snap.captured_at.elapsed() < self.ttl => f(&mut snap.records),
            Some(_) => self.snapshot = None,
            None => {}
        }
    }
}
