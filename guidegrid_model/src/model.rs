// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The grid model: channel rows, lazy cells, gap synthesis, and eviction.

use alloc::vec;
use alloc::vec::Vec;

use guidegrid_blocks::{BLOCK, BlockTimeline, Timestamp};
use hashbrown::HashMap;

use crate::cell::{CellIndex, GridCell};
use crate::channel::{BroadcastId, ChannelId, ChannelSchedule, ProgrammeItem};
use crate::entry::{Entry, EntryArena, EntryId, EntryKind};
use crate::gap::GapCache;

/// Construction parameters for a [`GridModel`].
///
/// The page hints describe the initially visible viewport; they drive the
/// eager pre-population of cells and the sizing of the gap cache, not any
/// hard bound on later lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct GridParams {
    /// Start of the grid window.
    pub grid_start: Timestamp,
    /// End of the grid window (exclusive).
    pub grid_end: Timestamp,
    /// First channel row of the initially visible page.
    pub first_channel: usize,
    /// Number of channel rows per page.
    pub channels_per_page: usize,
    /// First block of the initially visible page.
    pub first_block: usize,
    /// Number of blocks per page.
    pub blocks_per_page: usize,
    /// Width of one ruler span, in blocks.
    pub ruler_unit: usize,
    /// Rendered width of one block, in pixels.
    pub block_size: f32,
    /// Skips pre-populating the visible page so the first paint stays
    /// cheap; everything is then materialized on demand.
    pub first_open: bool,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            grid_start: Timestamp::from_unix_seconds(0),
            grid_end: Timestamp::from_unix_seconds(0),
            first_channel: 0,
            channels_per_page: 10,
            first_block: 0,
            blocks_per_page: 36,
            ruler_unit: 12,
            block_size: 40.0,
            first_open: false,
        }
    }
}

/// A sparse channel-by-block grid over guide data.
///
/// The model owns the quantized programme schedules (the source of truth)
/// and derives everything else lazily: layout cells per (channel, block)
/// coordinate, gap fillers for runs without data, and ruler spans. Derived
/// state can be evicted at any time through the `free_*` operations and is
/// rebuilt on the next lookup.
///
/// Replacing the guide data means constructing a fresh model and assigning
/// it; there is no in-place re-initialization, which also makes a reload
/// atomic from the host's point of view.
#[derive(Clone, Debug)]
pub struct GridModel {
    timeline: BlockTimeline,
    channels: Vec<ChannelSchedule>,
    channel_index: HashMap<ChannelId, usize>,
    arena: EntryArena,
    cells: CellIndex,
    gaps: GapCache,
    rulers: Vec<Option<EntryId>>,
    ruler_unit: usize,
    block_size: f32,
    revision: u64,
}

impl GridModel {
    /// Builds a model from ordered channels and their programme items.
    ///
    /// Channel order defines the row indices. Programme items referencing a
    /// channel not in `channels` are dropped; the rest are clipped to the
    /// grid window and quantized (see [`ProgrammeItem`]). A channel without
    /// any surviving items still occupies a row and resolves entirely to
    /// gap fillers.
    ///
    /// Unless [`GridParams::first_open`] is set, cells and gap items for
    /// the page described by the params are materialized eagerly.
    #[must_use]
    pub fn new(
        channels: impl IntoIterator<Item = ChannelId>,
        programmes: impl IntoIterator<Item = ProgrammeItem>,
        params: &GridParams,
    ) -> Self {
        let timeline = BlockTimeline::new(params.grid_start, params.grid_end);

        let channel_ids: Vec<ChannelId> = channels.into_iter().collect();
        let mut channel_index = HashMap::with_capacity(channel_ids.len());
        for (row, &id) in channel_ids.iter().enumerate() {
            channel_index.entry(id).or_insert(row);
        }

        let mut buckets: Vec<Vec<ProgrammeItem>> = vec![Vec::new(); channel_ids.len()];
        for item in programmes {
            if let Some(&row) = channel_index.get(&item.channel) {
                buckets[row].push(item);
            }
        }

        let mut arena = EntryArena::default();
        let schedules: Vec<ChannelSchedule> = channel_ids
            .iter()
            .zip(&buckets)
            .map(|(&id, bucket)| ChannelSchedule::build(id, bucket, &timeline, &mut arena))
            .collect();

        let gap_capacity = 4_usize
            .saturating_mul(params.channels_per_page.max(1))
            .saturating_mul(params.blocks_per_page.max(1))
            .max(64);

        let mut model = Self {
            timeline,
            channels: schedules,
            channel_index,
            arena,
            cells: CellIndex::default(),
            gaps: GapCache::new(gap_capacity),
            rulers: vec![None; timeline.ruler_count(params.ruler_unit.max(1))],
            ruler_unit: params.ruler_unit.max(1),
            block_size: params.block_size,
            revision: 0,
        };

        if !params.first_open && !model.timeline.is_empty() {
            let channel_end = params
                .first_channel
                .saturating_add(params.channels_per_page)
                .min(model.channels.len());
            let block_end = params
                .first_block
                .saturating_add(params.blocks_per_page)
                .min(model.timeline.block_count());
            for channel in params.first_channel..channel_end {
                for block in params.first_block..block_end {
                    if !model.cells.contains(channel, block) {
                        model.materialize(channel, block);
                    }
                }
            }
        }

        model
    }

    /// The quantized time axis of this model.
    ///
    /// All block arithmetic (time-to-block conversion, now-marker math,
    /// ruler geometry, start padding) lives on the timeline; the model adds
    /// only the channel axis and the caches on top of it.
    #[must_use]
    pub fn timeline(&self) -> &BlockTimeline {
        &self.timeline
    }

    /// Number of whole blocks on the time axis.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.timeline.block_count()
    }

    /// Start of the grid window.
    #[must_use]
    pub fn grid_start(&self) -> Timestamp {
        self.timeline.start()
    }

    /// End of the grid window (exclusive).
    #[must_use]
    pub fn grid_end(&self) -> Timestamp {
        self.timeline.end()
    }

    /// Returns `true` if the window quantizes to zero blocks.
    ///
    /// Lookups on such a model return `None`; hosts are expected to check
    /// this before driving a grid from it.
    #[must_use]
    pub fn is_zero_duration(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Rendered width of one block, in pixels.
    #[must_use]
    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Number of channel rows.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if the model has any channel rows.
    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.channels.is_empty()
    }

    /// The channel identity of row `index`.
    #[must_use]
    pub fn channel(&self, index: usize) -> Option<ChannelId> {
        self.channels.get(index).map(|schedule| schedule.id())
    }

    /// Number of programme entries in row `channel`'s schedule.
    #[must_use]
    pub fn programme_count(&self, channel: usize) -> usize {
        self.channels.get(channel).map_or(0, ChannelSchedule::len)
    }

    /// Iterates row `channel`'s programme entries in schedule order.
    pub fn programmes(&self, channel: usize) -> impl Iterator<Item = EntryId> + '_ {
        self.channels
            .get(channel)
            .into_iter()
            .flat_map(|schedule| schedule.entry_ids())
    }

    /// Resolves an [`EntryId`] to its entry, or `None` if it went stale.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.arena.get(id)
    }

    /// Returns the item occupying a (channel, block) coordinate.
    ///
    /// Inside the grid bounds this never comes back empty: a coordinate no
    /// programme covers resolves to a gap filler spanning the whole empty
    /// run, so callers always have something to render. The first lookup in
    /// a span materializes cells for the full span; repeat lookups are map
    /// hits and, without intervening eviction or invalidation, return the
    /// identical id.
    ///
    /// Out-of-bounds coordinates are a caller error: they trip a debug
    /// assertion and return `None` in release builds (zero-duration models
    /// simply return `None`).
    pub fn grid_item(&mut self, channel: usize, block: usize) -> Option<EntryId> {
        self.grid_cell(channel, block).map(GridCell::entry)
    }

    /// Returns the materialized cell at a coordinate.
    ///
    /// The bulk form of [`GridModel::grid_item`] and the width getters:
    /// renderers that want the occupying entry, its span, and both widths
    /// take them in one lookup. Bounds behave as for `grid_item`.
    pub fn grid_cell(&mut self, channel: usize, block: usize) -> Option<&GridCell> {
        if self.is_zero_duration() {
            return None;
        }
        let in_bounds = channel < self.channels.len() && block < self.timeline.block_count();
        debug_assert!(in_bounds, "grid coordinate ({channel}, {block}) out of bounds");
        if !in_bounds {
            return None;
        }
        if !self.cells.contains(channel, block) {
            self.materialize(channel, block);
        }
        self.cells.get(channel, block)
    }

    /// First block of the span occupying a coordinate.
    pub fn grid_item_start_block(&mut self, channel: usize, block: usize) -> Option<usize> {
        self.grid_cell(channel, block).map(GridCell::start_block)
    }

    /// Last block (inclusive) of the span occupying a coordinate.
    pub fn grid_item_end_block(&mut self, channel: usize, block: usize) -> Option<usize> {
        self.grid_cell(channel, block).map(GridCell::end_block)
    }

    /// Current width of the cell at a coordinate, in pixels.
    pub fn grid_item_width(&mut self, channel: usize, block: usize) -> Option<f32> {
        self.grid_cell(channel, block).map(GridCell::width)
    }

    /// Width of the occupying item's full span at materialization.
    pub fn grid_item_origin_width(&mut self, channel: usize, block: usize) -> Option<f32> {
        self.grid_cell(channel, block).map(GridCell::origin_width)
    }

    /// Adjusts the current width of the cell at one coordinate.
    ///
    /// Only the addressed coordinate changes; other cells of the same span
    /// keep their widths, so layout code can progressively narrow a
    /// partially visible item without re-deriving it. The origin width
    /// stays available for restoring.
    pub fn set_grid_item_width(&mut self, channel: usize, block: usize, width: f32) {
        if self.grid_cell(channel, block).is_none() {
            return;
        }
        if let Some(cell) = self.cells.get_mut(channel, block)
            && cell.width() != width
        {
            cell.set_width(width);
            self.bump_revision();
        }
    }

    /// Returns the gap filler covering a coordinate, if no programme does.
    ///
    /// The filler spans the maximal run of empty blocks around `block` and
    /// is cached by its run start, so any lookup inside the run yields the
    /// identical id until eviction. Returns `None` when a programme covers
    /// the coordinate.
    pub fn gap_item(&mut self, channel: usize, block: usize) -> Option<EntryId> {
        let id = self.grid_item(channel, block)?;
        self.arena.get(id).is_some_and(Entry::is_gap).then_some(id)
    }

    /// Locates a broadcast, optionally offset within its channel schedule.
    ///
    /// Resolves `channel` to its row, finds the entry with `broadcast` in
    /// that row's schedule, steps `event_offset` entries forward or
    /// backward, and returns the target's (row, start block). `None` when
    /// the channel or broadcast is unknown or the offset leaves the
    /// schedule.
    #[must_use]
    pub fn find_channel_and_block(
        &self,
        channel: ChannelId,
        broadcast: BroadcastId,
        event_offset: isize,
    ) -> Option<(usize, usize)> {
        let row = *self.channel_index.get(&channel)?;
        let schedule = &self.channels[row];
        let position = schedule.position_of_broadcast(broadcast)?;
        let target = position.checked_add_signed(event_offset)?;
        let slot = schedule.entry_at(target)?;
        Some((row, slot.start_block))
    }

    /// Returns the ruler span item at `index`, materializing it on demand.
    ///
    /// Ruler items cover [`GridModel::ruler_unit`] blocks each (the final
    /// one may be shorter) and live independently of programme data.
    pub fn ruler_item(&mut self, index: usize) -> Option<EntryId> {
        if index >= self.rulers.len() {
            return None;
        }
        if let Some(id) = self.rulers[index] {
            return Some(id);
        }
        let span = self.timeline.ruler_span(index, self.ruler_unit)?;
        let id = self.arena.insert(Entry::new(
            EntryKind::Ruler,
            span.start,
            span.end,
            span.start_block,
            span.end_block,
        ));
        self.rulers[index] = Some(id);
        Some(id)
    }

    /// Number of ruler spans covering the window.
    #[must_use]
    pub fn ruler_count(&self) -> usize {
        self.rulers.len()
    }

    /// Width of one ruler span, in blocks.
    #[must_use]
    pub fn ruler_unit(&self) -> usize {
        self.ruler_unit
    }

    /// Drops cached cells and gap items of channels outside the keep range.
    ///
    /// Both bounds are inclusive. An inverted range is treated as wrapped:
    /// rows at or above `keep_start` and rows at or below `keep_end` are
    /// kept, which matches a carousel-style channel list. Schedules are
    /// never touched; later lookups rebuild equal-valued cells.
    pub fn free_channel_memory(&mut self, keep_start: usize, keep_end: usize) {
        let keep = move |channel: usize| {
            if keep_start <= keep_end {
                keep_start <= channel && channel <= keep_end
            } else {
                channel >= keep_start || channel <= keep_end
            }
        };
        let mut dropped = self.cells.retain(|channel, _| keep(channel));
        for (_, id) in self.gaps.evict_channels(keep) {
            self.arena.remove(id);
            dropped += 1;
        }
        if dropped > 0 {
            self.bump_revision();
        }
    }

    /// Drops cached cells outside a block range, within a channel range.
    ///
    /// All bounds are inclusive. Gap items and channels outside
    /// `[first_channel, last_channel]` stay untouched; in particular a gap's
    /// identity survives this trim and re-lookup only re-materializes its
    /// cells. This is the per-scroll trim for the programme area, while
    /// [`GridModel::free_channel_memory`] handles leaving channels behind.
    pub fn free_programme_memory(
        &mut self,
        first_channel: usize,
        last_channel: usize,
        first_block: usize,
        last_block: usize,
    ) {
        let dropped = self.cells.retain(|channel, block| {
            !(first_channel <= channel
                && channel <= last_channel
                && (block < first_block || block > last_block))
        });
        if dropped > 0 {
            self.bump_revision();
        }
    }

    /// Drops ruler items whose span lies entirely outside a block range.
    ///
    /// Both bounds are inclusive block indices. Dropped items are rebuilt
    /// on the next [`GridModel::ruler_item`] call for their index.
    pub fn free_ruler_memory(&mut self, keep_start: usize, keep_end: usize) {
        let mut dropped = 0;
        for index in 0..self.rulers.len() {
            let Some(id) = self.rulers[index] else {
                continue;
            };
            let Some(span) = self.timeline.ruler_span(index, self.ruler_unit) else {
                continue;
            };
            if span.end_block < keep_start || span.start_block > keep_end {
                self.arena.remove(id);
                self.rulers[index] = None;
                dropped += 1;
            }
        }
        if dropped > 0 {
            self.bump_revision();
        }
    }

    /// Invalidates all derived spatial state.
    ///
    /// Cells and gap items are dropped (their ids go stale) and rebuilt on
    /// the next lookup; schedules, channels, and ruler items survive. Every
    /// call bumps the revision, so hosts can use it as a redraw signal.
    pub fn set_invalid(&mut self) {
        self.cells.clear();
        for (_, id) in self.gaps.take_all() {
            self.arena.remove(id);
        }
        self.bump_revision();
    }

    /// Returns `true` if a coordinate currently has a materialized cell.
    ///
    /// Unlike the lookups this never materializes anything, which makes it
    /// the probe for verifying eviction behavior.
    #[must_use]
    pub fn has_cached_cell(&self, channel: usize, block: usize) -> bool {
        self.cells.contains(channel, block)
    }

    /// Monotonically increasing change counter.
    ///
    /// Bumped by invalidation, by evictions that actually dropped
    /// something, and by width writes that changed a value. Lazy
    /// materialization does not bump it; rebuilding a cell yields an
    /// equal-valued result, which no observer needs to react to.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Snapshot of the model's shape and cache occupancy.
    #[must_use]
    pub fn debug_info(&self) -> GridModelDebugInfo {
        GridModelDebugInfo {
            channels: self.channels.len(),
            blocks: self.timeline.block_count(),
            rulers: self.rulers.len(),
            cached_cells: self.cells.len(),
            cached_gaps: self.gaps.len(),
            cached_rulers: self.rulers.iter().filter(|slot| slot.is_some()).count(),
            gap_capacity: self.gaps.capacity(),
            live_entries: self.arena.live_count(),
            revision: self.revision,
            zero_duration: self.timeline.is_empty(),
        }
    }

    /// Computes the item for one coordinate and fills cells for its span.
    fn materialize(&mut self, channel: usize, block: usize) {
        let Some(schedule) = self.channels.get(channel) else {
            return;
        };

        if let Some(slot) = schedule.covering(block) {
            let (entry, first, last) = (slot.entry, slot.start_block, slot.end_block);
            self.fill_span(channel, entry, first, last);
            return;
        }

        let (run_start, run_end) = schedule.gap_run(block, self.timeline.block_count());
        let channel_id = schedule.id();
        let timeline = self.timeline;
        let arena = &mut self.arena;
        let (gap_id, evicted) = self.gaps.get_or_insert((channel, run_start), || {
            let mut item = create_gap_item(channel_id, &timeline);
            let end = if run_end + 1 >= timeline.block_count() {
                timeline.end()
            } else {
                timeline.start_of_block(run_end) + BLOCK
            };
            item.set_window(timeline.start_of_block(run_start), end);
            item.set_blocks(run_start, run_end);
            arena.insert(item)
        });
        if let Some(((old_channel, _), old_id)) = evicted
            && let Some(old) = arena.remove(old_id)
        {
            self.cells
                .remove_span(old_channel, old.start_block(), old.end_block());
        }
        self.fill_span(channel, gap_id, run_start, run_end);
    }

    /// Inserts cells for every not-yet-present coordinate of a span.
    ///
    /// Existing cells are left alone so width adjustments survive partial
    /// re-materialization after a trim.
    fn fill_span(&mut self, channel: usize, entry: EntryId, start_block: usize, end_block: usize) {
        let origin_width = (end_block - start_block + 1) as f32 * self.block_size;
        for block in start_block..=end_block {
            if !self.cells.contains(channel, block) {
                self.cells.insert(
                    channel,
                    block,
                    GridCell::new(entry, origin_width, start_block, end_block),
                );
            }
        }
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl Default for GridModel {
    /// An empty model: no channels, zero-duration window.
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), &GridParams::default())
    }
}

/// Zero-span filler template; the lookup path extends it with the run it
/// covers before caching.
fn create_gap_item(channel: ChannelId, timeline: &BlockTimeline) -> Entry {
    Entry::new(
        EntryKind::Gap { channel },
        timeline.start(),
        timeline.start(),
        0,
        0,
    )
}

/// Snapshot of a [`GridModel`]'s shape and cache occupancy.
#[derive(Clone, Debug)]
pub struct GridModelDebugInfo {
    /// Number of channel rows.
    pub channels: usize,
    /// Number of blocks on the time axis.
    pub blocks: usize,
    /// Number of ruler spans covering the window.
    pub rulers: usize,
    /// Materialized (channel, block) cells.
    pub cached_cells: usize,
    /// Cached gap items.
    pub cached_gaps: usize,
    /// Materialized ruler items.
    pub cached_rulers: usize,
    /// Capacity bound of the gap cache.
    pub gap_capacity: usize,
    /// Live items in the entry arena (programmes, gaps, rulers).
    pub live_entries: usize,
    /// Current change counter.
    pub revision: u64,
    /// Whether the window quantizes to zero blocks.
    pub zero_duration: bool,
}
