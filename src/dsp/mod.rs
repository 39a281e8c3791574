//! Low-level DSP primitives used by the sampler and the synthesized widgets.
//!
//! These components are allocation-free and realtime-safe, so they can be
//! embedded directly inside voice structs.

/// Rendering parameters shared by every block.
pub mod context;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Oscillator waveforms.
pub mod oscillator;

pub use context::RenderCtx;
pub use envelope::{Envelope, EnvelopeState};
pub use oscillator::{OscillatorBlock, Waveform};

pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
