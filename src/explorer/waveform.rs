use std::time::{Duration, Instant};

use super::{Action, ToneGate, WidgetState};
use crate::dsp::{OscillatorBlock, RenderCtx, Waveform};
use crate::sampler::ToneSpec;

/// Samples drawn for one waveform preview
pub const WINDOW_LEN: usize = 256;

/// Shows what a waveform looks like and lets it be heard.
#[derive(Debug, Clone)]
pub struct WaveformExplorer {
    waveform: Waveform,
    frequency: f32,
    sample_rate: f32,
    tone_length: Duration,
    gate: ToneGate,
}

impl WaveformExplorer {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency: frequency.clamp(20.0, 20_000.0),
            sample_rate: 48_000.0,
            tone_length: Duration::from_millis(1500),
            gate: ToneGate::default(),
        }
    }

    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate.max(1.0);
        self
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn cycle_waveform(&mut self) {
        self.waveform = self.waveform.next();
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        if frequency.is_finite() {
            self.frequency = frequency.clamp(20.0, 20_000.0);
        }
    }

    /// One window of the current waveform, starting at phase zero.
    ///
    /// [`WINDOW_LEN`] is the preview size the front end uses.
    pub fn render_window(&self, len: usize) -> Vec<f32> {
        let mut out = vec![0.0; len];
        let ctx = RenderCtx::from_freq(self.sample_rate, self.frequency, 1.0);
        OscillatorBlock::new(self.waveform).render(&mut out, &ctx);
        out
    }

    /// Whole cycles visible in a window of `len` samples
    pub fn cycles_in(&self, len: usize) -> f32 {
        len as f32 * self.frequency / self.sample_rate
    }

    /// Relative amplitude of the first `count` harmonics.
    pub fn harmonics(&self, count: usize) -> Vec<f32> {
        (1..=count)
            .map(|n| {
                let n_f = n as f32;
                let odd = n % 2 == 1;
                match self.waveform {
                    Waveform::Sine => {
                        if n == 1 {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    Waveform::Square if odd => 1.0 / n_f,
                    Waveform::Sawtooth => 1.0 / n_f,
                    Waveform::Triangle if odd => 1.0 / (n_f * n_f),
                    _ => 0.0,
                }
            })
            .collect()
    }

    pub fn state(&self) -> WidgetState {
        self.gate.state()
    }

    pub fn play(&mut self, now: Instant) -> Vec<Action> {
        let length = self.tone_length.as_secs_f32();
        let spec = ToneSpec::tone(self.frequency, self.waveform, length);
        self.gate.play(now, spec)
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        self.gate.tick(now)
    }

    pub fn stop(&mut self) -> Vec<Action> {
        self.gate.stop()
    }
}

impl Default for WaveformExplorer {
    fn default() -> Self {
        Self::new(Waveform::Sine, 220.0)
    }
}
