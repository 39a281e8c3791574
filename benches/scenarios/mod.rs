//! Benchmarks for realistic workloads.

mod sampler;
mod theory;

pub use sampler::bench_sampler;
pub use theory::bench_theory;
