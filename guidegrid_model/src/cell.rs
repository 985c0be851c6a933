// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Materialized layout state per (channel, block) coordinate.

use hashbrown::HashMap;

use crate::entry::EntryId;

/// Layout state of one materialized (channel, block) coordinate.
///
/// Every coordinate of an item's block span gets its own cell sharing the
/// same [`EntryId`] and origin width, but each cell's current width can be
/// adjusted independently, so renderers can narrow a partially visible
/// item without touching the rest of its span.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridCell {
    entry: EntryId,
    origin_width: f32,
    width: f32,
    start_block: usize,
    end_block: usize,
}

impl GridCell {
    pub(crate) fn new(
        entry: EntryId,
        origin_width: f32,
        start_block: usize,
        end_block: usize,
    ) -> Self {
        Self {
            entry,
            origin_width,
            width: origin_width,
            start_block,
            end_block,
        }
    }

    /// The item occupying this coordinate.
    #[must_use]
    pub fn entry(&self) -> EntryId {
        self.entry
    }

    /// Width of the item's full block span at materialization, in pixels.
    #[must_use]
    pub fn origin_width(&self) -> f32 {
        self.origin_width
    }

    /// Current width at this coordinate, in pixels.
    ///
    /// Starts equal to [`GridCell::origin_width`] and is mutated per
    /// coordinate via
    /// [`GridModel::set_grid_item_width`](crate::GridModel::set_grid_item_width).
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// First block of the occupying item's span.
    #[must_use]
    pub fn start_block(&self) -> usize {
        self.start_block
    }

    /// Last block of the occupying item's span (inclusive).
    #[must_use]
    pub fn end_block(&self) -> usize {
        self.end_block
    }

    pub(crate) fn set_width(&mut self, width: f32) {
        self.width = width;
    }
}

/// Sparse map from (channel index, block index) to materialized cells.
///
/// Absence means "not yet computed", never "guaranteed empty"; the
/// per-channel schedules are the source of truth cells are rebuilt from.
#[derive(Clone, Debug, Default)]
pub(crate) struct CellIndex {
    cells: HashMap<(usize, usize), GridCell>,
}

impl CellIndex {
    pub(crate) fn get(&self, channel: usize, block: usize) -> Option<&GridCell> {
        self.cells.get(&(channel, block))
    }

    pub(crate) fn get_mut(&mut self, channel: usize, block: usize) -> Option<&mut GridCell> {
        self.cells.get_mut(&(channel, block))
    }

    pub(crate) fn contains(&self, channel: usize, block: usize) -> bool {
        self.cells.contains_key(&(channel, block))
    }

    pub(crate) fn insert(&mut self, channel: usize, block: usize, cell: GridCell) {
        self.cells.insert((channel, block), cell);
    }

    /// Drops the cells of one channel across an inclusive block span.
    pub(crate) fn remove_span(&mut self, channel: usize, start_block: usize, end_block: usize) {
        for block in start_block..=end_block {
            self.cells.remove(&(channel, block));
        }
    }

    /// Keeps only cells for which `keep` returns `true`; returns how many
    /// were dropped.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(usize, usize) -> bool) -> usize {
        let before = self.cells.len();
        self.cells.retain(|&(channel, block), _| keep(channel, block));
        before - self.cells.len()
    }

    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.cells.len();
        self.cells.clear();
        dropped
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }
}
