//! Criterion micro-benchmarks for append, find and remove.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use utlvec_bench::{element_stream, fill, Profile, CELLS_1K, PROFILES};
use utlvec_buffer::RawGrowableBuffer;
use utlvec_test_utils::HeaderFixture;

fn overlay(fixture: &HeaderFixture, profile: &Profile) -> RawGrowableBuffer {
    // SAFETY: the fixture outlives every buffer built over it.
    let buf = unsafe { RawGrowableBuffer::from_raw(fixture.as_ptr(), profile.element_size) };
    buf.unwrap()
}

/// Benchmark: append a whole profile into an empty header, growth included.
fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    for profile in PROFILES {
        let stream = element_stream(&profile, 42);
        group.bench_function(profile.name, |b| {
            b.iter(|| {
                let fixture = HeaderFixture::native();
                let mut buf = overlay(&fixture, &profile);
                fill(&mut buf, &stream).unwrap();
                black_box(buf.count());
            });
        });
    }
    group.finish();
}

/// Benchmark: append into a header whose grow hint is the final size, so
/// only one reallocation happens.
fn bench_append_presized(c: &mut Criterion) {
    let profile = CELLS_1K;
    let stream = element_stream(&profile, 42);
    c.bench_function("append_presized_cells_1k", |b| {
        b.iter(|| {
            let fixture = HeaderFixture::with_grow_size(profile.elements as i32);
            let mut buf = overlay(&fixture, &profile);
            fill(&mut buf, &stream).unwrap();
            black_box(buf.allocation_count());
        });
    });
}

/// Benchmark: find the last element (worst-case linear scan).
fn bench_find_last(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_last");
    for profile in PROFILES {
        let stream = element_stream(&profile, 42);
        let fixture = HeaderFixture::native();
        let mut buf = overlay(&fixture, &profile);
        fill(&mut buf, &stream).unwrap();
        let needle = stream[stream.len() - profile.element_size..].to_vec();

        group.bench_function(profile.name, |b| {
            b.iter(|| black_box(buf.find(black_box(&needle)).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: remove from the front until empty (every removal shifts).
fn bench_remove_front(c: &mut Criterion) {
    let profile = CELLS_1K;
    let stream = element_stream(&profile, 42);
    c.bench_function("remove_front_cells_1k", |b| {
        b.iter_batched(
            || {
                let fixture = HeaderFixture::native();
                let mut buf = overlay(&fixture, &profile);
                fill(&mut buf, &stream).unwrap();
                // Buffer first: it must drop before the header it overlays.
                (buf, fixture)
            },
            |(mut buf, fixture)| {
                while !buf.is_empty() {
                    buf.remove_at(0).unwrap();
                }
                black_box(buf.count());
                drop(buf);
                drop(fixture);
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: remove_all on a full buffer, then refill (store is kept).
fn bench_remove_all_refill(c: &mut Criterion) {
    let profile = CELLS_1K;
    let stream = element_stream(&profile, 42);
    let fixture = HeaderFixture::native();
    let mut buf = overlay(&fixture, &profile);
    fill(&mut buf, &stream).unwrap();

    c.bench_function("remove_all_refill_cells_1k", |b| {
        b.iter(|| {
            buf.remove_all().unwrap();
            fill(&mut buf, &stream).unwrap();
            black_box(buf.count());
        });
    });
}

criterion_group!(
    benches,
    bench_append,
    bench_append_presized,
    bench_find_last,
    bench_remove_front,
    bench_remove_all_refill
);
criterion_main!(benches);
