#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f32::consts::TAU;
use std::fmt;

use super::context::RenderCtx;

/*
Oscillator
==========

The synthesized widgets (metronome clicks, the frequency explorer's tone,
the waveform visualizer) use a plain oscillator instead of samples.

Sine: a single frequency with no harmonics. Smooth, hollow.
Square: odd harmonics only, falling off as 1/n. Hollow, woody.
Sawtooth: every harmonic, falling off as 1/n. Bright, buzzy.
Triangle: odd harmonics falling off as 1/n². Soft, between sine and square.

Phase is kept in [0, 1) and advanced by frequency / sample_rate per
sample, so the waveform functions only need to map one cycle.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    /// Value of the waveform at `phase` (one cycle per 0.0..1.0).
    pub fn value_at(self, phase: f32) -> f32 {
        let phase = phase.rem_euclid(1.0);
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }

    /// Cycle Sine → Square → Sawtooth → Triangle → Sine
    pub fn next(self) -> Self {
        match self {
            Waveform::Sine => Waveform::Square,
            Waveform::Square => Waveform::Sawtooth,
            Waveform::Sawtooth => Waveform::Triangle,
            Waveform::Triangle => Waveform::Sine,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Sawtooth)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Switch shape without a phase jump.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Fill `out` with the waveform at `ctx.frequency`, scaled by velocity.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let step = ctx.frequency / ctx.sample_rate;
        for sample in out.iter_mut() {
            *sample = self.waveform.value_at(self.phase) * ctx.velocity;
            self.phase = (self.phase + step).rem_euclid(1.0);
        }
    }
}
