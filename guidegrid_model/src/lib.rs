// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=guidegrid_model --heading-base-level=0

//! Guidegrid Model: a channel-by-block grid model for program guides.
//!
//! This crate turns flat guide data (channels plus broadcasts with
//! wall-clock times) into the two-dimensional structure an EPG grid
//! renders: channel rows crossed with the 5-minute block axis of
//! [`guidegrid_blocks`]. It owns no rendering and no clock; hosts drive it
//! with coordinates and get stable item handles back.
//!
//! The core concepts are:
//!
//! - [`GridModel`]: the grid itself. Quantized per-channel schedules are
//!   its source of truth; everything spatial derives from them on demand.
//! - [`GridParams`]: the grid window plus viewport hints used for eager
//!   pre-population and cache sizing.
//! - [`ProgrammeItem`], [`ChannelId`], [`BroadcastId`]: the flat input
//!   rows. Overlaps are sanitized on construction; the later-starting
//!   broadcast wins contested blocks.
//! - [`Entry`] and [`EntryId`]: grid items (programmes, synthesized gap
//!   fillers, ruler spans) behind generational handles that go stale on
//!   eviction instead of dangling.
//! - [`GridCell`]: per-coordinate layout state, a current width the host
//!   may adjust plus the origin width to restore from.
//!
//! Lookups never come back empty inside the grid: a coordinate without
//! guide data resolves to a gap filler spanning the whole empty run.
//! Derived state is just cache. The `free_*` operations and
//! [`GridModel::set_invalid`] drop it wholesale, and the next lookup
//! rebuilds an equal-valued result; only changes an observer can see bump
//! [`GridModel::revision`].
//!
//! ## Minimal example
//!
//! ```rust
//! use guidegrid_blocks::Timestamp;
//! use guidegrid_model::{BroadcastId, ChannelId, GridModel, GridParams, ProgrammeItem};
//!
//! let channel = ChannelId::new(7);
//! let params = GridParams {
//!     grid_start: Timestamp::from_unix_seconds(0),
//!     grid_end: Timestamp::from_unix_seconds(2 * 3600),
//!     ..GridParams::default()
//! };
//! let programmes = [ProgrammeItem {
//!     channel,
//!     broadcast: BroadcastId::new(1),
//!     start: Timestamp::from_unix_seconds(10 * 60),
//!     end: Timestamp::from_unix_seconds(40 * 60),
//! }];
//! let mut model = GridModel::new([channel], programmes, &params);
//!
//! // 00:10..00:40 quantizes to blocks 2 through 7 of row 0.
//! let item = model.grid_item(0, 4).unwrap();
//! let entry = model.entry(item).unwrap();
//! assert_eq!(entry.broadcast(), Some(BroadcastId::new(1)));
//! assert_eq!((entry.start_block(), entry.end_block()), (2, 7));
//!
//! // The uncovered run before it resolves to one gap filler.
//! let gap = model.gap_item(0, 0).unwrap();
//! assert!(model.entry(gap).unwrap().is_gap());
//!
//! // Lookups are stable until eviction or invalidation.
//! assert_eq!(model.grid_item(0, 7), Some(item));
//! ```
//!
//! Whatever notion of "now" the host has stays outside: now-marker math
//! lives on [`GridModel::timeline`] and takes the current time as an
//! argument. This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cell;
mod channel;
mod entry;
mod gap;
mod model;

pub use cell::GridCell;
pub use channel::{BroadcastId, ChannelId, ProgrammeItem};
pub use entry::{Entry, EntryId, EntryKind};
pub use model::{GridModel, GridModelDebugInfo, GridParams};
