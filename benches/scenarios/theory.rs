//! Benchmarks for lookups the UI runs every frame.

use std::hint::black_box;

use criterion::Criterion;
use tonebook::instrument::{resolve, OctaveRange};
use tonebook::keyboard::KeyboardLayout;
use tonebook::theory::{calculate_interval, generate_notes, note_from_frequency};

pub fn bench_theory(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/theory");

    group.bench_function("note_from_frequency", |b| {
        b.iter(|| note_from_frequency(black_box(261.63)))
    });

    let notes = generate_notes(1, 7);
    group.bench_function("interval_grid", |b| {
        b.iter(|| {
            let mut total = 0u32;
            for a in notes.iter().step_by(7) {
                for n in &notes {
                    total += calculate_interval(black_box(a), n) as u32;
                }
            }
            total
        })
    });

    let piano = resolve("piano");
    group.bench_function("nearest_sample", |b| {
        b.iter(|| {
            notes
                .iter()
                .filter_map(|n| piano.nearest_sample(black_box(n)))
                .count()
        })
    });

    let layout = KeyboardLayout::new(OctaveRange::new(1, 7).unwrap_or_default(), 3.0, 2.0);
    group.bench_function("key_at", |b| {
        b.iter(|| {
            (0..150)
                .filter_map(|x| layout.key_at(black_box(x as f32 + 0.5), 0.3))
                .count()
        })
    });

    group.finish();
}
