// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=guidegrid_blocks --heading-base-level=0

//! Guidegrid Blocks: time-to-block quantization for program guide grids.
//!
//! This crate provides the small, deterministic core that maps wall-clock
//! time onto the fixed 5-minute block axis of an EPG grid. It is intended to
//! be shared by grid models, renderers, and window-policy code without
//! pulling in any of them.
//!
//! The core concepts are:
//!
//! - [`Timestamp`] and [`TimeSpan`]: second-resolution time scalars, exact
//!   under block arithmetic.
//! - [`BlockTimeline`]: a `[start, end)` window quantized into consecutive
//!   blocks of [`BLOCK`] duration, capped at [`MAX_BLOCKS`], with clamped
//!   floor/ceiling conversions in both directions.
//! - [`RulerSpan`]: coarse time-axis spans (typically an hour wide) derived
//!   from the same lattice, for ruler rows.
//!
//! Quantization follows the conventions of broadcast guide data: event
//! ranges are half-open, an event starting mid-block occupies the next whole
//! block ([`BlockTimeline::first_event_block`]), and an event ending exactly
//! on a boundary does not leak into the following block
//! ([`BlockTimeline::last_event_block`]). The mapping is reversible
//! ([`BlockTimeline::block_at`] / [`BlockTimeline::start_of_block`]) and
//! stable across reloads of the same window.
//!
//! ## Minimal example
//!
//! ```rust
//! use guidegrid_blocks::{BlockTimeline, Timestamp};
//!
//! // A two-hour window starting at the epoch: 24 five-minute blocks.
//! let tl = BlockTimeline::new(
//!     Timestamp::from_unix_seconds(0),
//!     Timestamp::from_unix_seconds(2 * 3600),
//! );
//! assert_eq!(tl.block_count(), 24);
//!
//! // An event from 00:10 to 00:40 occupies blocks 2 through 7.
//! let start = Timestamp::from_unix_seconds(10 * 60);
//! let end = Timestamp::from_unix_seconds(40 * 60);
//! assert_eq!(tl.block_span(start, end), Some((2, 7)));
//!
//! // 00:40 itself already belongs to the next block.
//! assert_eq!(tl.block_at(end), 8);
//! ```
//!
//! Times never come from a clock inside this crate; "now" is always an
//! argument, so hosts own time policy and tests stay deterministic. This
//! crate is `no_std` and allocation-free.

#![no_std]

mod scalar;
mod timeline;

pub use scalar::{TimeSpan, Timestamp};
pub use timeline::{BLOCK, BlockTimeline, MAX_BLOCKS, RulerSpan};
