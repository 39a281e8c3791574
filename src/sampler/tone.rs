use crate::dsp::{Envelope, OscillatorBlock, RenderCtx, Waveform};

/// Shape of a synthesized one-shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency: f32,
    pub waveform: Waveform,
    /// Gate length in seconds
    pub duration: f32,
    pub velocity: f32,
    /// Percussive envelope instead of a sustained one
    pub percussive: bool,
}

impl ToneSpec {
    pub fn tone(frequency: f32, waveform: Waveform, duration: f32) -> Self {
        Self {
            frequency,
            waveform,
            duration,
            velocity: 0.5,
            percussive: false,
        }
    }

    /// Short click used by the metronome.
    pub fn click(frequency: f32, velocity: f32) -> Self {
        Self {
            frequency,
            waveform: Waveform::Sine,
            duration: 0.03,
            velocity,
            percussive: true,
        }
    }
}

/// Oscillator voice that gates itself off after a fixed length.
#[derive(Debug, Clone)]
pub struct ToneVoice {
    osc: OscillatorBlock,
    envelope: Envelope,
    ctx: RenderCtx,
    gate_samples: u32,
    active: bool,
}

impl ToneVoice {
    pub fn new() -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            envelope: Envelope::click(),
            ctx: RenderCtx::from_freq(48_000.0, 440.0, 0.0),
            gate_samples: 0,
            active: false,
        }
    }

    pub fn start(&mut self, spec: &ToneSpec, sample_rate: f32) {
        self.osc = OscillatorBlock::new(spec.waveform);
        self.envelope = if spec.percussive {
            Envelope::click()
        } else {
            Envelope::adsr(0.005, 0.05, 0.8, 0.08)
        };
        self.ctx = RenderCtx::from_freq(sample_rate, spec.frequency, spec.velocity.clamp(0.0, 1.0));
        self.gate_samples = (spec.duration.max(0.0) * sample_rate) as u32;
        self.active = true;
        self.envelope.note_on();
    }

    /// Cut the gate short; the envelope still fades out.
    pub fn release(&mut self) {
        self.gate_samples = 0;
        self.envelope.note_off(&self.ctx);
    }

    pub fn render_add(&mut self, out: &mut [f32], scratch: &mut [f32]) {
        if !self.active {
            return;
        }
        let scratch = &mut scratch[..out.len()];
        self.osc.render(scratch, &self.ctx);

        for (o, s) in out.iter_mut().zip(scratch.iter()) {
            if self.gate_samples == 0 {
                self.envelope.note_off(&self.ctx);
            } else {
                self.gate_samples -= 1;
            }
            *o += s * self.envelope.next_sample(&self.ctx);
        }

        if !self.envelope.is_active() {
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for ToneVoice {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_stops_after_its_gate() {
        let mut voice = ToneVoice::new();
        voice.start(&ToneSpec::tone(440.0, Waveform::Square, 0.01), 48_000.0);

        let mut out = vec![0.0; 256];
        let mut scratch = vec![0.0; 256];
        voice.render_add(&mut out, &mut scratch);
        assert!(out.iter().any(|s| s.abs() > 0.0));

        // 10ms gate + 80ms release
        for _ in 0..40 {
            out.fill(0.0);
            voice.render_add(&mut out, &mut scratch);
        }
        assert!(!voice.is_active());
    }

    #[test]
    fn click_is_short() {
        let mut voice = ToneVoice::new();
        voice.start(&ToneSpec::click(1500.0, 1.0), 48_000.0);
        let mut out = vec![0.0; 4096];
        let mut scratch = vec![0.0; 4096];
        voice.render_add(&mut out, &mut scratch);
        assert!(!voice.is_active());
    }
}
