// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded cache of synthesized gap items.
//!
//! Gap items are keyed by (channel index, run start block) so every lookup
//! inside one empty run resolves to the identical entry, which is what lets
//! hosts keep focus and animation state on a filler while scrolling.
//! Besides the caller-driven eviction of
//! [`GridModel::free_channel_memory`](crate::GridModel::free_channel_memory),
//! the cache holds a capacity bound with least-recently-used eviction, so a
//! long scrolling session over sparse data cannot grow it without limit.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::entry::EntryId;

/// (channel index, run start block).
pub(crate) type GapKey = (usize, usize);

#[derive(Clone, Debug)]
pub(crate) struct GapCache {
    items: HashMap<GapKey, EntryId>,
    /// Keys from least to most recently used.
    order: VecDeque<GapKey>,
    capacity: usize,
}

impl GapCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            items: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the cached entry for `key`, creating it via `create` on a
    /// miss.
    ///
    /// A hit refreshes the key's recency. On a miss that overflows the
    /// capacity, the least recently used item is evicted and returned; the
    /// caller owns freeing its arena slot and purging its cells.
    pub(crate) fn get_or_insert(
        &mut self,
        key: GapKey,
        create: impl FnOnce() -> EntryId,
    ) -> (EntryId, Option<(GapKey, EntryId)>) {
        if let Some(&id) = self.items.get(&key) {
            self.touch(key);
            return (id, None);
        }

        let id = create();
        self.items.insert(key, id);
        self.order.push_back(key);

        let mut evicted = None;
        if self.items.len() > self.capacity
            && let Some(old_key) = self.order.pop_front()
            && let Some(old_id) = self.items.remove(&old_key)
        {
            evicted = Some((old_key, old_id));
        }
        (id, evicted)
    }

    /// Drops every cached gap of a channel for which `keep` returns
    /// `false`, returning the evicted items.
    pub(crate) fn evict_channels(
        &mut self,
        keep: impl Fn(usize) -> bool,
    ) -> Vec<(GapKey, EntryId)> {
        let mut evicted = Vec::new();
        self.items.retain(|&(channel, start_block), &mut id| {
            if keep(channel) {
                true
            } else {
                evicted.push(((channel, start_block), id));
                false
            }
        });
        let items = &self.items;
        self.order.retain(|key| items.contains_key(key));
        evicted
    }

    /// Empties the cache, returning everything it held.
    pub(crate) fn take_all(&mut self) -> Vec<(GapKey, EntryId)> {
        self.order.clear();
        self.items.drain().collect()
    }

    fn touch(&mut self, key: GapKey) {
        if let Some(pos) = self.order.iter().position(|&k| k == key) {
            self.order.remove(pos);
            self.order.push_back(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GapCache;
    use crate::entry::EntryId;

    fn id(slot: u32) -> EntryId {
        EntryId::new(slot, 1)
    }

    #[test]
    fn hit_returns_the_cached_identity() {
        let mut cache = GapCache::new(4);
        let (first, _) = cache.get_or_insert((0, 2), || id(1));
        let (second, evicted) = cache.get_or_insert((0, 2), || id(99));
        assert_eq!(first, second);
        assert!(evicted.is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn overflow_evicts_the_least_recently_used() {
        let mut cache = GapCache::new(2);
        cache.get_or_insert((0, 0), || id(1));
        cache.get_or_insert((0, 5), || id(2));

        let (_, evicted) = cache.get_or_insert((1, 0), || id(3));
        assert_eq!(evicted, Some(((0, 0), id(1))));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn a_hit_refreshes_recency() {
        let mut cache = GapCache::new(2);
        cache.get_or_insert((0, 0), || id(1));
        cache.get_or_insert((0, 5), || id(2));
        // Touch the older key; the newer one is now first in line.
        cache.get_or_insert((0, 0), || id(99));

        let (_, evicted) = cache.get_or_insert((1, 0), || id(3));
        assert_eq!(evicted, Some(((0, 5), id(2))));
    }

    #[test]
    fn channel_eviction_reports_what_was_dropped() {
        let mut cache = GapCache::new(8);
        cache.get_or_insert((0, 0), || id(1));
        cache.get_or_insert((1, 0), || id(2));
        cache.get_or_insert((2, 4), || id(3));

        let mut evicted = cache.evict_channels(|channel| channel == 1);
        evicted.sort_unstable_by_key(|(key, _)| *key);
        assert_eq!(evicted, [((0, 0), id(1)), ((2, 4), id(3))]);
        assert_eq!(cache.len(), 1);

        // The survivor is still reachable afterwards.
        let (kept, _) = cache.get_or_insert((1, 0), || id(99));
        assert_eq!(kept, id(2));
    }

    #[test]
    fn take_all_empties_the_cache() {
        let mut cache = GapCache::new(8);
        cache.get_or_insert((0, 0), || id(1));
        cache.get_or_insert((3, 7), || id(2));

        let mut drained = cache.take_all();
        drained.sort_unstable_by_key(|(key, _)| *key);
        assert_eq!(drained, [((0, 0), id(1)), ((3, 7), id(2))]);
        assert_eq!(cache.len(), 0);

        // Zero-capacity requests are clamped so the cache stays usable.
        let mut tiny = GapCache::new(0);
        let (kept, evicted) = tiny.get_or_insert((0, 0), || id(1));
        assert_eq!(kept, id(1));
        assert!(evicted.is_none());
        assert_eq!(tiny.capacity(), 1);
    }
}
