//! Entry Pool Module
//!
//! Arena of entry cells addressed by stable handles. Released cells go on a
//! free list and are handed out again before the arena grows.

use crate::cache::CacheEntry;

/// Stable handle to a cell in the [`EntryPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    #[cfg(test)]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

// == Entry Pool ==
#[derive(Debug)]
pub struct EntryPool<V> {
    cells: Vec<Option<CacheEntry<V>>>,
    free: Vec<usize>,
    live: usize,
}

impl<V> EntryPool<V> {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    // == Acquire ==
    /// Stores `entry` in a recycled cell when one is free, otherwise in a new one.
    pub fn acquire(&mut self, entry: CacheEntry<V>) -> EntryId {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.cells[idx] = Some(entry);
                idx
            }
            None => {
                self.cells.push(Some(entry));
                self.cells.len() - 1
            }
        };
        self.live += 1;
        EntryId(idx)
    }

    // == Release ==
    /// Takes the entry out of its cell and returns the cell to the free list.
    pub fn release(&mut self, id: EntryId) -> Option<CacheEntry<V>> {
        let entry = self.cells.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.live -= 1;
        Some(entry)
    }

    pub fn get(&self, id: EntryId) -> Option<&CacheEntry<V>> {
        self.cells.get(id.0).and_then(|cell| cell.as_ref())
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut CacheEntry<V>> {
        self.cells.get_mut(id.0).and_then(|cell| cell.as_mut())
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total cells ever allocated, occupied or free.
    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.cells.len()
    }

    // == Release All ==
    /// Empties every occupied cell while keeping the cells for reuse.
    pub fn release_all(&mut self) {
        self.free.clear();
        for (idx, cell) in self.cells.iter_mut().enumerate() {
            *cell = None;
            self.free.push(idx);
        }
        self.live = 0;
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (EntryId, &CacheEntry<V>)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.as_ref().map(|entry| (EntryId(idx), entry)))
    }
}

impl<V> Default for EntryPool<V> {
    fn default() -> Self {
        Self::new()
    }
}
