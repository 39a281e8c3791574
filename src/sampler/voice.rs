use std::sync::Arc;

use super::buffer::SampleBuffer;
use crate::dsp::{Envelope, RenderCtx};
use crate::theory::note::NoteId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Key held, sample playing
    Releasing, // Key released, envelope fading out
}

/// One sounding note: reads a recorded sample at a pitch-shifted rate.
#[derive(Debug, Clone)]
pub struct SamplerVoice {
    note: Option<NoteId>,
    state: VoiceState,
    age: u64,
    velocity: f32,
    buffer: Option<Arc<SampleBuffer>>,
    /// Fractional read position in the sample buffer
    position: f64,
    /// Samples advanced per output sample (pitch shift × rate conversion)
    step: f64,
    envelope: Envelope,
}

impl SamplerVoice {
    pub fn new() -> Self {
        Self {
            note: None,
            state: VoiceState::Free,
            age: 0,
            velocity: 0.0,
            buffer: None,
            position: 0.0,
            step: 1.0,
            envelope: Envelope::sampler(),
        }
    }

    /// Start playing `buffer` shifted by `shift` semitones.
    pub fn start(
        &mut self,
        note: NoteId,
        buffer: Arc<SampleBuffer>,
        shift: i32,
        velocity: f32,
        output_rate: f32,
        age: u64,
    ) {
        let pitch_ratio = 2.0_f64.powf(shift as f64 / 12.0);
        let rate_ratio = buffer.sample_rate as f64 / output_rate.max(1.0) as f64;

        self.note = Some(note);
        self.state = VoiceState::Active;
        self.age = age;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.step = pitch_ratio * rate_ratio;
        self.position = 0.0;
        self.buffer = Some(buffer);
        self.envelope.note_on();
    }

    pub fn release(&mut self, output_rate: f32) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            let ctx = RenderCtx::from_freq(output_rate, 0.0, self.velocity);
            self.envelope.note_off(&ctx);
        }
    }

    /// Mix this voice into `out`.
    pub fn render_add(&mut self, out: &mut [f32], output_rate: f32) {
        let Some(buffer) = self.buffer.clone() else {
            return;
        };
        let ctx = RenderCtx::from_freq(output_rate, 0.0, self.velocity);

        for sample in out.iter_mut() {
            if self.position >= buffer.len() as f64 {
                // Sample ran out before the key was released
                self.free();
                return;
            }
            let gain = self.envelope.next_sample(&ctx) * self.velocity;
            *sample += buffer.read_interpolated(self.position) * gain;
            self.position += self.step;
        }

        if self.state == VoiceState::Releasing && !self.envelope.is_active() {
            self.free();
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = None;
        self.buffer = None;
        self.envelope.reset();
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn note(&self) -> Option<NoteId> {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}

impl Default for SamplerVoice {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> NoteId {
        text.parse().unwrap()
    }

    #[test]
    fn octave_shift_doubles_read_speed() {
        let buffer = Arc::new(SampleBuffer::new(vec![0.5; 1000], 48_000));
        let mut voice = SamplerVoice::new();
        voice.start(note("C5"), buffer, 12, 1.0, 48_000.0, 0);

        let mut out = vec![0.0; 100];
        voice.render_add(&mut out, 48_000.0);
        assert!((voice.position - 200.0).abs() < 1e-9);
        assert!(voice.is_active());
    }

    #[test]
    fn voice_frees_itself_when_sample_ends() {
        let buffer = Arc::new(SampleBuffer::new(vec![0.5; 10], 48_000));
        let mut voice = SamplerVoice::new();
        voice.start(note("C4"), buffer, 0, 1.0, 48_000.0, 0);

        let mut out = vec![0.0; 64];
        voice.render_add(&mut out, 48_000.0);
        assert!(voice.is_free());
        assert!(out[20..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn release_fades_to_free() {
        let buffer = Arc::new(SampleBuffer::new(vec![0.5; 200_000], 48_000));
        let mut voice = SamplerVoice::new();
        voice.start(note("C4"), buffer, 0, 1.0, 48_000.0, 0);

        let mut out = vec![0.0; 1024];
        voice.render_add(&mut out, 48_000.0);
        voice.release(48_000.0);
        assert_eq!(voice.state(), VoiceState::Releasing);

        // Release is 0.6s = 28800 samples
        for _ in 0..30 {
            out.fill(0.0);
            voice.render_add(&mut out, 48_000.0);
        }
        assert!(voice.is_free());
    }
}
