// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quantization of a wall-clock window into fixed-duration blocks.

use crate::scalar::{TimeSpan, Timestamp};

/// Duration of one grid block.
pub const BLOCK: TimeSpan = TimeSpan::from_minutes(5);

/// Hard cap on the number of blocks in one grid window.
///
/// 33 days of 5-minute blocks: 31 days of upcoming data, one day of past
/// data, and one day of fillers.
pub const MAX_BLOCKS: usize = 33 * 24 * 60 / 5;

/// A wall-clock window quantized into consecutive 5-minute blocks.
///
/// Blocks are indexed `0..block_count()`. Block `b` covers the half-open
/// range `[start + b * BLOCK, start + (b + 1) * BLOCK)`. The mapping is
/// deterministic and reversible, so reloading the same window reproduces
/// the same indices.
///
/// A window shorter than one block (or inverted) quantizes to zero blocks;
/// block queries on such a timeline return index `0`, which callers are
/// expected to rule out up front via [`BlockTimeline::is_empty`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockTimeline {
    start: Timestamp,
    end: Timestamp,
    block_count: usize,
}

impl BlockTimeline {
    /// Creates a timeline over `[start, end)`.
    ///
    /// The block count is the number of whole blocks that fit in the window,
    /// capped at [`MAX_BLOCKS`]; a trailing partial block is not counted.
    #[must_use]
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        let block_count = if end > start {
            let blocks = (end - start).as_seconds() / BLOCK.as_seconds();
            usize::try_from(blocks).map_or(MAX_BLOCKS, |b| b.min(MAX_BLOCKS))
        } else {
            0
        };
        Self {
            start,
            end,
            block_count,
        }
    }

    /// Start of the window.
    #[must_use]
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// End of the window (exclusive).
    #[must_use]
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Number of whole blocks in the window.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Returns `true` if the window quantizes to zero blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.block_count == 0
    }

    /// Returns `true` if `time` lies within `[start, end)`.
    #[must_use]
    pub fn contains(&self, time: Timestamp) -> bool {
        self.start <= time && time < self.end
    }

    /// Returns the block containing `time`.
    ///
    /// The offset from the window start is floored to a block index and
    /// clamped into `[0, block_count)`, so times before the window resolve
    /// to the first block and times past it to the last. Monotonic in `time`.
    #[must_use]
    #[inline]
    pub fn block_at(&self, time: Timestamp) -> usize {
        let offset = (time - self.start).as_seconds();
        self.clamp_block(offset.div_euclid(BLOCK.as_seconds()))
    }

    /// Returns the wall-clock start of `block`.
    ///
    /// Out-of-range blocks are clamped to the last valid block first, so the
    /// round trip `block_at(start_of_block(b)) == b` holds for all valid `b`.
    #[must_use]
    #[inline]
    pub fn start_of_block(&self, block: usize) -> Timestamp {
        let block = block.min(self.block_count.saturating_sub(1));
        self.start + BLOCK * to_i64(block)
    }

    /// Returns the first block an event starting at `start` occupies.
    ///
    /// Uses ceiling division: an event that begins mid-block is shown from
    /// the next whole block, so a cell never claims a block it only grazes.
    #[must_use]
    pub fn first_event_block(&self, start: Timestamp) -> usize {
        let offset = (start - self.start).as_seconds();
        let span = BLOCK.as_seconds();
        let block = if offset <= 0 {
            0
        } else {
            (offset + span - 1) / span
        };
        self.clamp_block(block)
    }

    /// Returns the last block an event ending at `end` occupies.
    ///
    /// Event ranges are half-open, so this is the block containing the final
    /// instant `end - 1s`. An event ending exactly on a block boundary does
    /// not spill into the following block, and back-to-back events meet with
    /// no phantom gap block between them.
    #[must_use]
    pub fn last_event_block(&self, end: Timestamp) -> usize {
        self.block_at(end - TimeSpan::from_seconds(1))
    }

    /// Quantizes an event `[start, end)` to its inclusive block span.
    ///
    /// Times are effectively clipped to the window by clamping. Returns
    /// `None` for events outside the window, inverted events, and events so
    /// short that no whole block contains them.
    #[must_use]
    pub fn block_span(&self, start: Timestamp, end: Timestamp) -> Option<(usize, usize)> {
        if self.block_count == 0 || end <= start || end <= self.start || start >= self.end {
            return None;
        }
        let first = self.first_event_block(start);
        let last = self.last_event_block(end);
        (first <= last).then_some((first, last))
    }

    /// Returns the block containing the given current time.
    #[must_use]
    pub fn now_block(&self, now: Timestamp) -> usize {
        self.block_at(now)
    }

    /// Returns the pixel offset of the now marker inside its block.
    ///
    /// `block_size` is the rendered width of one block; the result lies in
    /// `[0, block_size]` and is `0.0` on an empty timeline.
    #[must_use]
    pub fn page_now_offset(&self, now: Timestamp, block_size: f32) -> f32 {
        if self.block_count == 0 {
            return 0.0;
        }
        let within = (now - self.start_of_block(self.block_at(now))).as_seconds();
        let within = within.clamp(0, BLOCK.as_seconds());
        within as f32 / BLOCK.as_seconds() as f32 * block_size
    }

    /// Returns the offset of the window start from the top-of-hour block
    /// lattice.
    ///
    /// Zero when the start sits on a lattice point (for example `:00`,
    /// `:05`, `:30`); otherwise the sub-block remainder. Renderers use this
    /// to pad the ruler so labels stay aligned with wall-clock times.
    #[must_use]
    pub fn grid_start_padding(&self) -> TimeSpan {
        let into_hour = self.start.as_unix_seconds().rem_euclid(3600);
        TimeSpan::from_seconds(into_hour % BLOCK.as_seconds())
    }

    /// Number of ruler spans of `unit_blocks` needed to cover the window.
    ///
    /// The final span may be shorter than a full unit. A zero unit is
    /// treated as one block.
    #[must_use]
    pub fn ruler_count(&self, unit_blocks: usize) -> usize {
        debug_assert!(unit_blocks > 0, "ruler unit must be at least one block");
        self.block_count.div_ceil(unit_blocks.max(1))
    }

    /// Returns the `index`-th ruler span of `unit_blocks`, or `None` past
    /// the end of the window.
    #[must_use]
    pub fn ruler_span(&self, index: usize, unit_blocks: usize) -> Option<RulerSpan> {
        let unit = unit_blocks.max(1);
        let start_block = index.checked_mul(unit)?;
        if start_block >= self.block_count {
            return None;
        }
        let end_block = (start_block + unit).min(self.block_count) - 1;
        Some(RulerSpan {
            start_block,
            end_block,
            start: self.start + BLOCK * to_i64(start_block),
            end: self.start + BLOCK * to_i64(end_block + 1),
        })
    }

    /// Iterates the ruler spans of `unit_blocks` covering the window.
    pub fn ruler_spans(&self, unit_blocks: usize) -> impl Iterator<Item = RulerSpan> + '_ {
        (0..self.ruler_count(unit_blocks))
            .filter_map(move |index| self.ruler_span(index, unit_blocks))
    }

    /// Clamps a signed block index into `[0, block_count)`.
    fn clamp_block(&self, block: i64) -> usize {
        let last = self.block_count.saturating_sub(1);
        if block <= 0 {
            0
        } else {
            usize::try_from(block).map_or(last, |b| b.min(last))
        }
    }
}

/// One coarse time-axis span, `unit_blocks` wide except possibly the last.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RulerSpan {
    /// First block covered by the span.
    pub start_block: usize,
    /// Last block covered by the span (inclusive).
    pub end_block: usize,
    /// Wall-clock start of the span.
    pub start: Timestamp,
    /// Wall-clock end of the span (exclusive).
    pub end: Timestamp,
}

fn to_i64(block: usize) -> i64 {
    i64::try_from(block).unwrap_or(i64::MAX)
}
