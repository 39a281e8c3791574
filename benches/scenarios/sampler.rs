//! Benchmarks for the sampler engine with many sounding voices.
//!
//! Chords are the heaviest case the widgets produce: the interval explorer
//! plays two notes at once, and fast keyboard playing leaves releasing
//! voices stacked up.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use rtrb::RingBuffer;
use tonebook::sampler::{PlayerMessage, SampleBuffer, SampleSet, SamplerEngine};
use tonebook::theory::{generate_notes, NoteId};

use crate::BLOCK_SIZES;

fn sample_set() -> Arc<SampleSet> {
    let mut set = SampleSet::new("bench");
    // Two seconds of a decaying partial per recorded note
    let data: Vec<f32> = (0..96_000)
        .map(|i| (i as f32 * 0.05).sin() * (-(i as f32) / 48_000.0).exp())
        .collect();
    for note in generate_notes(3, 5).into_iter().step_by(3) {
        set.insert(note, SampleBuffer::new(data.clone(), 48_000));
    }
    Arc::new(set)
}

pub fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/sampler");
    let samples = sample_set();
    let notes: Vec<NoteId> = generate_notes(3, 5);

    for &voices in &[2usize, 8, 24] {
        for &size in BLOCK_SIZES {
            let (mut tx, rx) = RingBuffer::new(64);
            let mut engine = SamplerEngine::new(48_000.0, voices, rx);
            let _ = tx.push(PlayerMessage::LoadSamples(Arc::clone(&samples)));
            for note in notes.iter().take(voices) {
                let _ = tx.push(PlayerMessage::NoteOn {
                    note: *note,
                    velocity: 0.8,
                });
            }
            let mut buffer = vec![0.0f32; size];
            engine.render_block(&mut buffer);

            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        engine.render_block(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}
