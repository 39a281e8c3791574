//! Benchmarks for the ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonebook::dsp::{Envelope, RenderCtx};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![1.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::adsr(0.1, 0.1, 0.7, 0.3);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.apply(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Sampler envelope held at sustain
        let mut env = Envelope::sampler();
        env.note_on();
        for _ in 0..10_000 {
            env.next_sample(&ctx);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.apply(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
