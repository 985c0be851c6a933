// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Model-owned items and the slot arena that stores them.

use alloc::vec::Vec;

use guidegrid_blocks::{TimeSpan, Timestamp};

use crate::channel::{BroadcastId, ChannelId};

/// Identifier for an item owned by the grid model.
///
/// This is a small, copyable handle that stays stable across lookups but
/// becomes invalid when the underlying slot is reused. It consists of a slot
/// index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On eviction, the slot is freed; any existing `EntryId` that pointed to
///   that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a
///   new, distinct `EntryId`.
///
/// Stale ids never alias a different live item because the generation must
/// match; [`GridModel::entry`](crate::GridModel::entry) returns `None` for
/// them. `u32` is ample for practical lifetimes; behavior on generation
/// overflow is unspecified.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntryId(pub(crate) u32, pub(crate) u32);

impl EntryId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// What an [`Entry`] stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// A real broadcast from the guide data.
    Programme {
        /// Channel the broadcast airs on.
        channel: ChannelId,
        /// External identity of the broadcast.
        broadcast: BroadcastId,
    },
    /// Synthesized filler covering a run of blocks with no guide data.
    Gap {
        /// Channel the filler row belongs to.
        channel: ChannelId,
    },
    /// One coarse time-axis span of the ruler row.
    Ruler,
}

/// An item owned by the grid model.
///
/// Carries the item kind, its wall-clock range clipped to the grid window,
/// and the inclusive block span it occupies on the time axis. For
/// programmes the block span can be narrower than the clipped times when a
/// later overlapping broadcast won the contested blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    kind: EntryKind,
    start: Timestamp,
    end: Timestamp,
    start_block: usize,
    end_block: usize,
}

impl Entry {
    pub(crate) fn new(
        kind: EntryKind,
        start: Timestamp,
        end: Timestamp,
        start_block: usize,
        end_block: usize,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            start_block,
            end_block,
        }
    }

    /// The item kind.
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Start of the item, clipped to the grid window.
    #[must_use]
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// End of the item (exclusive), clipped to the grid window.
    #[must_use]
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Clipped duration of the item.
    #[must_use]
    pub fn duration(&self) -> TimeSpan {
        self.end - self.start
    }

    /// First block the item occupies.
    #[must_use]
    pub fn start_block(&self) -> usize {
        self.start_block
    }

    /// Last block the item occupies (inclusive).
    #[must_use]
    pub fn end_block(&self) -> usize {
        self.end_block
    }

    /// Returns `true` for synthesized gap fillers.
    #[must_use]
    pub fn is_gap(&self) -> bool {
        matches!(self.kind, EntryKind::Gap { .. })
    }

    /// The channel this item belongs to, if any.
    ///
    /// Ruler spans belong to the time axis, not to a channel.
    #[must_use]
    pub fn channel(&self) -> Option<ChannelId> {
        match self.kind {
            EntryKind::Programme { channel, .. } | EntryKind::Gap { channel } => Some(channel),
            EntryKind::Ruler => None,
        }
    }

    /// The external broadcast identity, for programme items.
    #[must_use]
    pub fn broadcast(&self) -> Option<BroadcastId> {
        match self.kind {
            EntryKind::Programme { broadcast, .. } => Some(broadcast),
            _ => None,
        }
    }

    pub(crate) fn set_window(&mut self, start: Timestamp, end: Timestamp) {
        self.start = start;
        self.end = end;
    }

    pub(crate) fn set_blocks(&mut self, start_block: usize, end_block: usize) {
        self.start_block = start_block;
        self.end_block = end_block;
    }
}

/// Slot storage for [`Entry`] values addressed by [`EntryId`].
#[derive(Clone, Debug, Default)]
pub(crate) struct EntryArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

impl EntryArena {
    pub(crate) fn insert(&mut self, entry: Entry) -> EntryId {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some(entry);
            return EntryId::new(idx, slot.generation);
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "slot counts stay far below u32::MAX for any practical guide window"
        )]
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            entry: Some(entry),
        });
        EntryId::new(idx, 1)
    }

    pub(crate) fn get(&self, id: EntryId) -> Option<&Entry> {
        self.slots
            .get(id.idx())
            .filter(|slot| slot.generation == id.1)
            .and_then(|slot| slot.entry.as_ref())
    }

    /// Frees the slot behind `id`, returning the entry it held.
    ///
    /// Stale ids and already-freed slots are no-ops.
    pub(crate) fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        let entry = slot.entry.take()?;
        self.free.push(id.0);
        self.live -= 1;
        Some(entry)
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live
    }
}
