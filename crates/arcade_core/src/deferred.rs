//! One-shot deferred actions on a scene clock.
//!
//! Each action is due at an absolute time in microseconds and may name the
//! entity that owns it. Destroying the entity cancels its actions, and
//! tearing down the scene cancels everything, so a late action never touches
//! state that no longer exists.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Scene clock in microseconds.
pub type Clock = u64;

/// Identifies the entity an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

pub struct DeferredQueue<A> {
    inner: BinaryHeap<Deferred<A>>,
    cancelled: HashSet<TimerHandle>,
    next_id: u64,
}

struct Deferred<A> {
    due: Clock,
    handle: TimerHandle,
    owner: Option<OwnerId>,
    action: A,
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self {
            inner: BinaryHeap::new(),
            cancelled: HashSet::new(),
            next_id: 0,
        }
    }

    pub fn schedule(&mut self, due: Clock, owner: Option<OwnerId>, action: A) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.inner.push(Deferred {
            due,
            handle,
            owner,
            action,
        });
        handle
    }

    /// Returns false if the action already ran or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let pending = self
            .inner
            .iter()
            .any(|d| d.handle == handle && !self.cancelled.contains(&d.handle));
        if pending {
            self.cancelled.insert(handle);
        }
        pending
    }

    /// Cancels every pending action owned by `owner`, returning how many.
    pub fn cancel_owned_by(&mut self, owner: OwnerId) -> usize {
        let handles: Vec<TimerHandle> = self
            .inner
            .iter()
            .filter(|d| d.owner == Some(owner) && !self.cancelled.contains(&d.handle))
            .map(|d| d.handle)
            .collect();
        let count = handles.len();
        self.cancelled.extend(handles);
        count
    }

    pub fn clear(&mut self) {
        self.inner.clear();
        self.cancelled.clear();
    }

    pub fn pending(&self) -> usize {
        self.inner.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Removes and returns every live action due at or before `now`,
    /// earliest first. Actions due at the same time keep scheduling order.
    pub fn drain_due(&mut self, now: Clock) -> Vec<A> {
        let mut due = Vec::new();
        while let Some(next) = self.inner.peek() {
            if next.due > now {
                break;
            }
            let Some(item) = self.inner.pop() else {
                break;
            };
            if self.cancelled.remove(&item.handle) {
                continue;
            }
            due.push(item.action);
        }
        due
    }
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

// BinaryHeap is a max-heap: invert so the earliest due (then lowest id) pops first.
impl<A> Ord for Deferred<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.handle.0.cmp(&self.handle.0))
    }
}

impl<A> PartialOrd for Deferred<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> PartialEq for Deferred<A> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.handle == other.handle
    }
}

impl<A> Eq for Deferred<A> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_due_time() {
        let mut queue = DeferredQueue::new();
        queue.schedule(5, None, "pulse");
        for now in 0..10 {
            let fired = queue.drain_due(now);
            if now == 5 {
                assert_eq!(fired, vec!["pulse"]);
            } else {
                assert!(fired.is_empty(), "unexpected fire at {now}");
            }
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn late_drain_still_fires() {
        let mut queue = DeferredQueue::new();
        queue.schedule(100, None, 1);
        assert_eq!(queue.drain_due(250), vec![1]);
    }

    #[test]
    fn ordered_by_due_then_schedule_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(30, None, "c");
        queue.schedule(10, None, "a");
        queue.schedule(30, None, "d");
        queue.schedule(20, None, "b");
        assert_eq!(queue.drain_due(30), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn cancelled_handle_never_fires() {
        let mut queue = DeferredQueue::new();
        let keep = queue.schedule(10, None, "keep");
        let drop = queue.schedule(10, None, "drop");
        assert!(queue.cancel(drop));
        assert!(!queue.cancel(drop));
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.drain_due(10), vec!["keep"]);
        assert!(!queue.cancel(keep));
    }

    #[test]
    fn cancel_owned_by_only_hits_that_owner() {
        let player = OwnerId(1);
        let stars = OwnerId(2);
        let mut queue = DeferredQueue::new();
        queue.schedule(10, Some(player), "revert scale");
        queue.schedule(20, Some(stars), "respawn");
        queue.schedule(30, Some(player), "revert again");
        assert_eq!(queue.cancel_owned_by(player), 2);
        assert_eq!(queue.cancel_owned_by(player), 0);
        assert_eq!(queue.drain_due(100), vec!["respawn"]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue = DeferredQueue::new();
        queue.schedule(1, None, ());
        queue.schedule(2, Some(OwnerId(7)), ());
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.drain_due(u64::MAX).is_empty());
    }
}
