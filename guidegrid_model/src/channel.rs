// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channel identities and per-channel programme schedules.
//!
//! A schedule is the source of truth for one channel row: the sorted,
//! non-overlapping list of quantized programme entries that the derived
//! grid cells and gap items are rebuilt from. Schedules are built once per
//! model construction and never evicted.

use alloc::vec::Vec;

use guidegrid_blocks::BlockTimeline;
use guidegrid_blocks::Timestamp;

use crate::entry::{Entry, EntryArena, EntryId, EntryKind};

/// External identity of a channel row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(u32);

impl ChannelId {
    /// Wraps a raw channel identifier from the guide data provider.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// External identity of a broadcast, unique within its channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BroadcastId(u32);

impl BroadcastId {
    /// Wraps a raw broadcast identifier from the guide data provider.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// One programme as delivered by the guide data provider.
///
/// The wall-clock range is half-open. Items partially overlapping the grid
/// window are clipped to it at ingestion; items fully outside it, and items
/// too short to fill a whole block, are dropped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProgrammeItem {
    /// Channel the programme airs on.
    pub channel: ChannelId,
    /// Identity of the broadcast, unique within its channel.
    pub broadcast: BroadcastId,
    /// Start of the programme.
    pub start: Timestamp,
    /// End of the programme (exclusive).
    pub end: Timestamp,
}

/// One schedule slot: an arena entry plus the search keys kept inline.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ScheduleEntry {
    pub(crate) entry: EntryId,
    pub(crate) broadcast: BroadcastId,
    pub(crate) start_block: usize,
    pub(crate) end_block: usize,
}

/// Sorted, non-overlapping programme entries of one channel row.
#[derive(Clone, Debug)]
pub(crate) struct ChannelSchedule {
    id: ChannelId,
    entries: Vec<ScheduleEntry>,
}

impl ChannelSchedule {
    /// Quantizes, clips, and sanitizes one channel's programmes, inserting
    /// the survivors into the arena.
    ///
    /// Overlaps are resolved latest-wins: a later item claims the contested
    /// blocks and the earlier item's span is truncated in front of it (or
    /// the earlier item is dropped entirely when nothing remains). Among
    /// items starting in the same block, the last one in input order wins.
    pub(crate) fn build(
        id: ChannelId,
        items: &[ProgrammeItem],
        timeline: &BlockTimeline,
        arena: &mut EntryArena,
    ) -> Self {
        struct Candidate {
            item: ProgrammeItem,
            start_block: usize,
            end_block: usize,
        }

        let mut candidates: Vec<Candidate> = items
            .iter()
            .filter_map(|item| {
                let (start_block, end_block) = timeline.block_span(item.start, item.end)?;
                Some(Candidate {
                    item: *item,
                    start_block,
                    end_block,
                })
            })
            .collect();
        // Stable by start block, so input order breaks ties below.
        candidates.sort_by_key(|c| c.start_block);

        let mut sanitized: Vec<Candidate> = Vec::with_capacity(candidates.len());
        for cand in candidates {
            while let Some(prev) = sanitized.last_mut() {
                if prev.start_block == cand.start_block {
                    sanitized.pop();
                    continue;
                }
                if prev.end_block >= cand.start_block {
                    // Sorted order makes cand.start_block strictly greater
                    // here, so at least one block always remains.
                    prev.end_block = cand.start_block - 1;
                }
                break;
            }
            sanitized.push(cand);
        }

        let entries = sanitized
            .into_iter()
            .map(|cand| {
                let start = cand.item.start.max(timeline.start());
                let end = cand.item.end.min(timeline.end());
                let entry = arena.insert(Entry::new(
                    EntryKind::Programme {
                        channel: id,
                        broadcast: cand.item.broadcast,
                    },
                    start,
                    end,
                    cand.start_block,
                    cand.end_block,
                ));
                ScheduleEntry {
                    entry,
                    broadcast: cand.item.broadcast,
                    start_block: cand.start_block,
                    end_block: cand.end_block,
                }
            })
            .collect();

        Self { id, entries }
    }

    pub(crate) fn id(&self) -> ChannelId {
        self.id
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry_at(&self, index: usize) -> Option<&ScheduleEntry> {
        self.entries.get(index)
    }

    pub(crate) fn entry_ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.iter().map(|e| e.entry)
    }

    /// Returns the schedule entry whose block span contains `block`, if any.
    pub(crate) fn covering(&self, block: usize) -> Option<&ScheduleEntry> {
        let after = self
            .entries
            .partition_point(|e| e.start_block <= block);
        let candidate = self.entries.get(after.checked_sub(1)?)?;
        (candidate.end_block >= block).then_some(candidate)
    }

    /// Returns the maximal run of empty blocks containing `block`.
    ///
    /// Both bounds are inclusive. Callers must only ask for blocks no
    /// schedule entry covers.
    pub(crate) fn gap_run(&self, block: usize, block_count: usize) -> (usize, usize) {
        debug_assert!(
            self.covering(block).is_none(),
            "gap run requested for a covered block"
        );
        let after = self
            .entries
            .partition_point(|e| e.start_block <= block);
        let run_start = after
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map_or(0, |prev| prev.end_block + 1);
        let run_end = self
            .entries
            .get(after)
            .map_or(block_count.saturating_sub(1), |next| next.start_block - 1);
        (run_start, run_end)
    }

    /// Position of `broadcast` within the schedule, if present.
    pub(crate) fn position_of_broadcast(&self, broadcast: BroadcastId) -> Option<usize> {
        self.entries.iter().position(|e| e.broadcast == broadcast)
    }
}
