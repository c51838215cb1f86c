//! Circular doubly linked ring backed by [`SlotArena`].
//!
//! Every ring owns one permanently allocated sentinel node. The sentinel never
//! carries an entry; its `next` link points at the oldest entry and its `prev`
//! link at the newest, so both ends are reached in O(1) and no link is ever
//! optional.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────────────────────────────────┐
//!            ▼                                                  │
//!   ┌──────────────┐    ┌────────┐    ┌────────┐    ┌────────┐  │
//!   │   sentinel   │◄──►│ A (old)│◄──►│   B    │◄──►│ C (new)│◄─┘
//!   │  (slot 0)    │    └────────┘    └────────┘    └────────┘
//!   └──────────────┘
//!     next ─► oldest          prev ─► newest
//!
//!   empty ring: sentinel.next == sentinel.prev == sentinel
//! ```
//!
//! ## Operations
//! - `push_back(key, value)`: link a new node just before the sentinel
//! - `move_to_back(id)`: unlink + relink before the sentinel
//! - `remove(id)` / `pop_front()`: unlink + free the slot
//! - `next_id(id)`: single step used by cursors
//!
//! All of the above are O(1). `debug_validate_invariants()` is available in
//! debug/test builds; `check_invariants()` is always available.

use std::mem;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug, Clone)]
struct Node<K, V> {
    entry: Option<(K, V)>,
    prev: SlotId,
    next: SlotId,
}

/// Sentinel-anchored ring of `(K, V)` entries.
#[derive(Debug, Clone)]
pub struct SentinelRing<K, V> {
    arena: SlotArena<Node<K, V>>,
    sentinel: SlotId,
}

impl<K, V> SentinelRing<K, V> {
    /// Creates an empty ring holding only its sentinel.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty ring with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = SlotArena::with_capacity(capacity.saturating_add(1));
        let sentinel = Self::alloc_sentinel(&mut arena);
        Self { arena, sentinel }
    }

    fn alloc_sentinel(arena: &mut SlotArena<Node<K, V>>) -> SlotId {
        arena.insert_with(|id| Node {
            entry: None,
            prev: id,
            next: id,
        })
    }

    /// Handle of the sentinel node.
    #[inline]
    pub fn sentinel(&self) -> SlotId {
        self.sentinel
    }

    /// Number of entries, excluding the sentinel.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `id` names a live entry (never the sentinel).
    pub fn contains(&self, id: SlotId) -> bool {
        id != self.sentinel && self.arena.contains(id)
    }

    /// Handle of the oldest entry.
    #[inline]
    pub fn front_id(&self) -> Option<SlotId> {
        self.next_id(self.sentinel)
            .filter(|&next| next != self.sentinel)
    }

    /// Handle of the newest entry.
    #[inline]
    pub fn back_id(&self) -> Option<SlotId> {
        self.arena
            .get(self.sentinel)
            .map(|node| node.prev)
            .filter(|&prev| prev != self.sentinel)
    }

    /// Returns the handle linked after `id`; the sentinel marks the end.
    #[inline]
    pub fn next_id(&self, id: SlotId) -> Option<SlotId> {
        self.arena.get(id).map(|node| node.next)
    }

    /// Returns the handle linked before `id`; the sentinel marks the start.
    #[inline]
    pub fn prev_id(&self, id: SlotId) -> Option<SlotId> {
        self.arena.get(id).map(|node| node.prev)
    }

    #[inline]
    pub fn entry(&self, id: SlotId) -> Option<(&K, &V)> {
        self.arena
            .get(id)
            .and_then(|node| node.entry.as_ref())
            .map(|(k, v)| (k, v))
    }

    #[inline]
    pub fn value_mut(&mut self, id: SlotId) -> Option<&mut V> {
        self.arena
            .get_mut(id)
            .and_then(|node| node.entry.as_mut())
            .map(|(_, v)| v)
    }

    pub fn front(&self) -> Option<(&K, &V)> {
        self.front_id().and_then(|id| self.entry(id))
    }

    pub fn back(&self) -> Option<(&K, &V)> {
        self.back_id().and_then(|id| self.entry(id))
    }

    /// Links a new entry at the newest position and returns its handle.
    pub fn push_back(&mut self, key: K, value: V) -> SlotId {
        let id = self.arena.insert(Node {
            entry: Some((key, value)),
            prev: self.sentinel,
            next: self.sentinel,
        });
        self.attach_back(id);
        id
    }

    /// Overwrites the value of `id` in place, leaving links untouched.
    pub fn replace_value(&mut self, id: SlotId, value: V) -> Option<V> {
        self.value_mut(id).map(|slot| mem::replace(slot, value))
    }

    /// Relinks `id` at the newest position; `false` if `id` is not an entry.
    pub fn move_to_back(&mut self, id: SlotId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.back_id() == Some(id) {
            return true;
        }
        self.detach(id);
        self.attach_back(id);
        true
    }

    /// Unlinks `id`, frees its slot, and returns the entry.
    pub fn remove(&mut self, id: SlotId) -> Option<(K, V)> {
        if !self.contains(id) {
            return None;
        }
        self.detach(id);
        self.arena.remove(id).and_then(|node| node.entry)
    }

    /// Removes and returns the oldest entry.
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        let id = self.front_id()?;
        self.remove(id)
    }

    /// Drops every entry and relinks the sentinel to itself.
    ///
    /// The sentinel handle survives; entry handles issued before the clear no
    /// longer resolve.
    pub fn clear(&mut self) {
        let sentinel = self.sentinel;
        let mut current = self.arena.get(sentinel).map(|node| node.next);
        while let Some(id) = current.filter(|&id| id != sentinel) {
            current = self.arena.remove(id).map(|node| node.next);
        }
        if let Some(node) = self.arena.get_mut(sentinel) {
            node.prev = sentinel;
            node.next = sentinel;
        }
    }

    /// Iterates entries from oldest to newest.
    pub fn iter(&self) -> RingIter<'_, K, V> {
        RingIter {
            ring: self,
            current: self.sentinel,
            remaining: self.len(),
        }
    }

    fn detach(&mut self, id: SlotId) {
        let (prev, next) = match self.arena.get(id) {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        if let Some(prev_node) = self.arena.get_mut(prev) {
            prev_node.next = next;
        }
        if let Some(next_node) = self.arena.get_mut(next) {
            next_node.prev = prev;
        }
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = id;
            node.next = id;
        }
    }

    fn attach_back(&mut self, id: SlotId) {
        let sentinel = self.sentinel;
        let old_back = match self.arena.get(sentinel) {
            Some(node) => node.prev,
            None => return,
        };
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = old_back;
            node.next = sentinel;
        }
        if let Some(back_node) = self.arena.get_mut(old_back) {
            back_node.next = id;
        }
        if let Some(sentinel_node) = self.arena.get_mut(sentinel) {
            sentinel_node.prev = id;
        }
    }

    /// Verifies the ring links and the entry count.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let sentinel = self
            .arena
            .get(self.sentinel)
            .ok_or_else(|| InvariantError::new("sentinel slot is missing"))?;
        if sentinel.entry.is_some() {
            return Err(InvariantError::new("sentinel carries an entry"));
        }

        let mut count = 0usize;
        let mut current = self.sentinel;
        loop {
            let node = self
                .arena
                .get(current)
                .ok_or_else(|| InvariantError::new("ring links to a freed slot"))?;
            let next = self
                .arena
                .get(node.next)
                .ok_or_else(|| InvariantError::new("next link points to a freed slot"))?;
            if next.prev != current {
                return Err(InvariantError::new("next.prev does not point back"));
            }
            let prev = self
                .arena
                .get(node.prev)
                .ok_or_else(|| InvariantError::new("prev link points to a freed slot"))?;
            if prev.next != current {
                return Err(InvariantError::new("prev.next does not point back"));
            }

            current = node.next;
            if current == self.sentinel {
                break;
            }
            if self.arena.get(current).is_some_and(|n| n.entry.is_none()) {
                return Err(InvariantError::new("entry node without an entry"));
            }
            count += 1;
            if count > self.len() {
                return Err(InvariantError::new("ring is longer than the arena"));
            }
        }

        if count != self.len() {
            return Err(InvariantError::new(format!(
                "ring walk found {count} entries, arena holds {}",
                self.len()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("ring invariant violated: {err}");
        }
    }
}

impl<K, V> Default for SentinelRing<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ring entries, oldest to newest.
pub struct RingIter<'a, K, V> {
    ring: &'a SentinelRing<K, V>,
    current: SlotId,
    remaining: usize,
}

impl<'a, K, V> Iterator for RingIter<'a, K, V> {
    type Item = (SlotId, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.ring.next_id(self.current)?;
        if next == self.ring.sentinel {
            return None;
        }
        self.current = next;
        self.remaining = self.remaining.saturating_sub(1);
        let (k, v) = self.ring.entry(next)?;
        Some((next, k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for RingIter<'_, K, V> {}
