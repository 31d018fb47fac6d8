//! Recency List Module
//!
//! Intrusive doubly-linked list of resident entries plus the key index.
//! Nodes live in an [`EntryPool`] and link to each other by [`EntryId`], so
//! every splice is O(1).
//!
//! - Head = most recently used
//! - Tail = least recently used
//!
//! A key is in the index iff its entry is linked into the list.

use std::collections::HashMap;

use crate::cache::{CacheEntry, EntryId, EntryPool};

// == Recency List ==
#[derive(Debug)]
pub struct RecencyList<V> {
    pool: EntryPool<V>,
    index: HashMap<String, EntryId>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
}

impl<V> RecencyList<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            pool: EntryPool::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    // == Lookup ==
    pub fn find(&self, key: &str) -> Option<EntryId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, id: EntryId) -> Option<&CacheEntry<V>> {
        self.pool.get(id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut CacheEntry<V>> {
        self.pool.get_mut(id)
    }

    #[cfg(test)]
    pub(crate) fn head(&self) -> Option<EntryId> {
        self.head
    }

    #[cfg(test)]
    pub(crate) fn tail(&self) -> Option<EntryId> {
        self.tail
    }

    // == Insert Front ==
    /// Acquires a pool cell for `entry` and links it as the new head.
    pub fn insert_front(&mut self, entry: CacheEntry<V>) -> EntryId {
        let id = self.pool.acquire(entry);
        self.push_front(id);
        id
    }

    // == Remove ==
    /// Unlinks the entry and hands its cell back to the pool.
    pub fn remove(&mut self, id: EntryId) -> Option<CacheEntry<V>> {
        if !self.unlink(id) {
            return None;
        }
        self.pool.release(id)
    }

    // == Move To Front ==
    /// Marks an entry as most recently used.
    pub fn move_to_front(&mut self, id: EntryId) {
        if self.head == Some(id) {
            return;
        }
        if self.unlink(id) {
            self.push_front(id);
        }
    }

    // == Pop Back ==
    /// Unlinks and returns the least recently used entry.
    pub fn pop_back(&mut self) -> Option<CacheEntry<V>> {
        let id = self.tail?;
        self.remove(id)
    }

    // == Clear ==
    /// Drops every entry and resets both ends; pool cells are kept for reuse.
    pub fn clear(&mut self) {
        self.index.clear();
        self.pool.release_all();
        self.head = None;
        self.tail = None;
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterates resident entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    /// Links an unlinked cell at the head and registers its key.
    fn push_front(&mut self, id: EntryId) {
        let old_head = self.head;
        let Some(entry) = self.pool.get_mut(id) else {
            return;
        };
        entry.prev = None;
        entry.next = old_head;
        self.index.insert(entry.key.clone(), id);

        match old_head.and_then(|head| self.pool.get_mut(head)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    /// Detaches a cell from the chain and the index, leaving it allocated.
    ///
    /// Returns `false` if `id` does not refer to a live cell.
    fn unlink(&mut self, id: EntryId) -> bool {
        let Some(entry) = self.pool.get_mut(id) else {
            return false;
        };
        let (prev, next) = (entry.prev.take(), entry.next.take());
        self.index.remove(&entry.key);

        match prev {
            Some(prev) => {
                if let Some(node) = self.pool.get_mut(prev) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(node) = self.pool.get_mut(next) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        true
    }

    // == Invariant Check ==
    /// Walks the chain in both directions and checks it against the index.
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        assert_eq!(self.head.is_none(), self.tail.is_none());
        assert_eq!(self.index.len(), self.pool.len());

        let mut count = 0;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let entry = self.pool.get(id).expect("linked id must be live");
            assert_eq!(entry.prev, prev, "broken prev link at {:?}", id);
            assert_eq!(self.index.get(&entry.key), Some(&id));
            prev = Some(id);
            current = entry.next;
            count += 1;
            assert!(count <= self.index.len(), "cycle in recency list");
        }
        assert_eq!(prev, self.tail);
        assert_eq!(count, self.index.len());
    }
}

impl<V> Default for RecencyList<V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
pub struct Iter<'a, V> {
    list: &'a RecencyList<V>,
    current: Option<EntryId>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (EntryId, &'a CacheEntry<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let entry = self.list.pool.get(id)?;
        self.current = entry.next;
        Some((id, entry))
    }
}
