// Copyright 2025 the Guidegrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `guidegrid_blocks` + `guidegrid_model`.

use criterion::{
    BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use guidegrid_blocks::{BlockTimeline, Timestamp};
use guidegrid_model::{BroadcastId, ChannelId, GridModel, GridParams, ProgrammeItem};

const SEED: u64 = 0x6416_0000_0000_0001;

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_usize(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        (self.next_u32() as usize) % upper_exclusive
    }
}

/// Builds `channels` rows of back-to-back programmes over an `hours`-long
/// window, with ~20% of slots left empty so gap synthesis stays exercised.
fn build_guide(channels: u32, hours: i64, seed: u64) -> (Vec<ChannelId>, Vec<ProgrammeItem>) {
    let mut rng = Lcg::new(seed);
    let window_end = hours * 3600;
    let ids: Vec<ChannelId> = (0..channels).map(ChannelId::new).collect();
    let mut items = Vec::new();
    let mut broadcast = 0_u32;

    for &channel in &ids {
        let mut clock = 0_i64;
        while clock < window_end {
            // 15 minutes to 105 minutes, in 5-minute steps.
            let slots = 3 + rng.gen_range_usize(19) as i64;
            let end = (clock + slots * 300).min(window_end);
            if rng.gen_range_usize(10) < 8 {
                items.push(ProgrammeItem {
                    channel,
                    broadcast: BroadcastId::new(broadcast),
                    start: Timestamp::from_unix_seconds(clock),
                    end: Timestamp::from_unix_seconds(end),
                });
                broadcast += 1;
            }
            clock = end;
        }
    }
    (ids, items)
}

fn guide_params(hours: i64) -> GridParams {
    GridParams {
        grid_start: Timestamp::from_unix_seconds(0),
        grid_end: Timestamp::from_unix_seconds(hours * 3600),
        ..GridParams::default()
    }
}

fn scan_page(model: &mut GridModel, first_block: usize) {
    let channels = model.channel_count().min(10);
    let end_block = (first_block + 36).min(model.block_count());
    for channel in 0..channels {
        for block in first_block..end_block {
            black_box(model.grid_item(channel, block));
        }
    }
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("guidegrid_model/construction");

    // The 33-day case is the largest window the block axis admits.
    for &(channels, hours) in &[(50_u32, 24_i64), (200, 24), (50, 33 * 24)] {
        let (ids, items) = build_guide(channels, hours, SEED);
        group.throughput(Throughput::Elements(items.len() as u64));

        group.bench_function(format!("eager(ch={channels},h={hours})"), |b| {
            let params = guide_params(hours);
            b.iter_batched(
                || (ids.clone(), items.clone()),
                |(ids, items)| black_box(GridModel::new(ids, items, &params)),
                BatchSize::LargeInput,
            );
        });

        // Hypothesis: with `first_open` construction cost is dominated by
        // schedule building and independent of the page size.
        group.bench_function(format!("first_open(ch={channels},h={hours})"), |b| {
            let params = GridParams {
                first_open: true,
                ..guide_params(hours)
            };
            b.iter_batched(
                || (ids.clone(), items.clone()),
                |(ids, items)| black_box(GridModel::new(ids, items, &params)),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_page_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("guidegrid_model/page_scan");

    for &(channels, hours) in &[(50_u32, 24_i64), (200, 33 * 24)] {
        let (ids, items) = build_guide(channels, hours, SEED);

        // Cold: every lookup of the page materializes spans and fillers.
        group.bench_function(format!("cold(ch={channels},h={hours})"), |b| {
            let params = GridParams {
                first_open: true,
                ..guide_params(hours)
            };
            b.iter_batched(
                || GridModel::new(ids.clone(), items.clone(), &params),
                |mut model| {
                    scan_page(&mut model, 0);
                    model
                },
                BatchSize::LargeInput,
            );
        });

        // Hot: the page is cached, lookups are pure map hits.
        let mut model = GridModel::new(ids.clone(), items.clone(), &guide_params(hours));
        group.bench_function(format!("hot(ch={channels},h={hours})"), |b| {
            b.iter(|| scan_page(&mut model, 0));
        });
    }

    group.finish();
}

fn bench_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("guidegrid_model/scroll");
    group.sample_size(30);

    // Page through the window, trimming everything behind the viewport the
    // way a host does while the user scrolls forward in time.
    for &(channels, hours) in &[(50_u32, 24_i64), (50, 33 * 24)] {
        let (ids, items) = build_guide(channels, hours, SEED);
        let params = GridParams {
            first_open: true,
            ..guide_params(hours)
        };

        group.bench_function(format!("trim_and_rescan(ch={channels},h={hours})"), |b| {
            b.iter_batched(
                || GridModel::new(ids.clone(), items.clone(), &params),
                |mut model| {
                    let pages = (model.block_count() / 36).min(8);
                    let last_channel = model.channel_count() - 1;
                    for page in 0..pages {
                        let first = page * 36;
                        let last = (first + 35).min(model.block_count() - 1);
                        scan_page(&mut model, first);
                        model.free_programme_memory(0, last_channel, first, last);
                    }
                    model
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("guidegrid_model/find");

    let (ids, items) = build_guide(200, 24, SEED);
    let targets: Vec<(ChannelId, BroadcastId)> = items
        .iter()
        .step_by(17)
        .map(|item| (item.channel, item.broadcast))
        .collect();
    let model = GridModel::new(ids, items, &guide_params(24));

    group.throughput(Throughput::Elements(targets.len() as u64));
    group.bench_function("hit(ch=200,h=24)", |b| {
        b.iter(|| {
            for &(channel, broadcast) in &targets {
                black_box(model.find_channel_and_block(channel, broadcast, 0));
            }
        });
    });

    group.finish();
}

fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("guidegrid_blocks/quantize");

    let timeline = BlockTimeline::new(
        Timestamp::from_unix_seconds(0),
        Timestamp::from_unix_seconds(33 * 24 * 3600),
    );
    let mut rng = Lcg::new(SEED);
    let ranges: Vec<(Timestamp, Timestamp)> = (0..4096)
        .map(|_| {
            let start = rng.gen_range_usize(33 * 24 * 3600) as i64;
            let duration = (3 + rng.gen_range_usize(19)) as i64 * 300;
            (
                Timestamp::from_unix_seconds(start),
                Timestamp::from_unix_seconds(start + duration),
            )
        })
        .collect();

    group.throughput(Throughput::Elements(ranges.len() as u64));
    group.bench_function("block_span(33d)", |b| {
        b.iter(|| {
            for &(start, end) in &ranges {
                black_box(timeline.block_span(start, end));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_construction,
    bench_page_scan,
    bench_scroll,
    bench_find,
    bench_quantize
);
criterion_main!(benches);
