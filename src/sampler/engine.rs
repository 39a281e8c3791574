use std::sync::Arc;

use rtrb::Consumer;
use tracing::trace;

use super::{
    loader::SampleSet,
    message::PlayerMessage,
    tone::{ToneSpec, ToneVoice},
    voice::{SamplerVoice, VoiceState},
};
use crate::MAX_BLOCK_SIZE;

/// Commands for synthesized one-shots (clicks, reference tones).
#[derive(Debug, Clone, Copy)]
pub enum ToneMessage {
    Play(ToneSpec),
    StopAll,
}

/// Audio-thread side of the playback adapter.
///
/// Owns a fixed pool of sample voices and tone voices. Messages arrive
/// over lock-free ring buffers and are applied at the start of each block.
pub struct SamplerEngine {
    sample_rate: f32,
    voices: Vec<SamplerVoice>,
    tones: Vec<ToneVoice>,
    samples: Option<Arc<SampleSet>>,
    rx: Consumer<PlayerMessage>,
    tone_rx: Option<Consumer<ToneMessage>>,
    scratch: Vec<f32>,
    frame_counter: u64,
}

impl SamplerEngine {
    pub fn new(sample_rate: f32, max_voices: usize, rx: Consumer<PlayerMessage>) -> Self {
        Self {
            sample_rate,
            voices: (0..max_voices.max(1)).map(|_| SamplerVoice::new()).collect(),
            tones: (0..8).map(|_| ToneVoice::new()).collect(),
            samples: None,
            rx,
            tone_rx: None,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
            frame_counter: 0,
        }
    }

    /// Also accept synthesized tones from `tone_rx`.
    pub fn with_tones(mut self, tone_rx: Consumer<ToneMessage>) -> Self {
        self.tone_rx = Some(tone_rx);
        self
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Instrument currently installed, if any.
    pub fn instrument(&self) -> Option<&'static str> {
        self.samples.as_ref().map(|s| s.instrument)
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
            + self.tones.iter().filter(|t| t.is_active()).count()
    }

    /// Render one block. `out.len()` must not exceed [`MAX_BLOCK_SIZE`].
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.process_messages();

        out.fill(0.0);
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.render_add(out, self.sample_rate);
            }
        }
        for tone in &mut self.tones {
            tone.render_add(out, &mut self.scratch);
        }

        self.frame_counter += out.len() as u64;
    }

    fn process_messages(&mut self) {
        while let Ok(msg) = self.rx.pop() {
            match msg {
                PlayerMessage::LoadSamples(set) => {
                    self.release_all();
                    self.samples = Some(set);
                }
                PlayerMessage::Unload => {
                    self.release_all();
                    self.samples = None;
                }
                PlayerMessage::NoteOn { note, velocity } => {
                    let Some(samples) = self.samples.clone() else {
                        trace!(%note, "note on with no instrument installed");
                        continue;
                    };
                    let Some((_, shift, buffer)) = samples.nearest(&note) else {
                        continue;
                    };
                    let buffer = Arc::clone(buffer);
                    let age = self.frame_counter;
                    let sample_rate = self.sample_rate;
                    if let Some(voice) = self.allocate_voice() {
                        voice.start(note, buffer, shift, velocity, sample_rate, age);
                    }
                }
                PlayerMessage::NoteOff { note } => {
                    let sample_rate = self.sample_rate;
                    for voice in self
                        .voices
                        .iter_mut()
                        .filter(|v| v.note() == Some(note) && v.state() == VoiceState::Active)
                    {
                        voice.release(sample_rate);
                    }
                }
                PlayerMessage::AllNotesOff => self.release_all(),
            }
        }

        let Some(tone_rx) = self.tone_rx.as_mut() else {
            return;
        };
        while let Ok(msg) = tone_rx.pop() {
            match msg {
                ToneMessage::Play(spec) => {
                    let sample_rate = self.sample_rate;
                    let slot = self
                        .tones
                        .iter()
                        .position(|t| !t.is_active())
                        .unwrap_or(0);
                    self.tones[slot].start(&spec, sample_rate);
                }
                ToneMessage::StopAll => {
                    for tone in &mut self.tones {
                        tone.release();
                    }
                }
            }
        }
    }

    fn release_all(&mut self) {
        for voice in &mut self.voices {
            voice.release(self.sample_rate);
        }
    }

    fn allocate_voice(&mut self) -> Option<&mut SamplerVoice> {
        // First pass: find free voice index
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(&mut self.voices[idx]);
        }

        // Second pass: steal oldest releasing voice, then oldest overall
        let steal_idx = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by_key(|(_, v)| v.age())
            .or_else(|| self.voices.iter().enumerate().min_by_key(|(_, v)| v.age()))
            .map(|(idx, _)| idx);

        steal_idx.map(|idx| &mut self.voices[idx])
    }
}
