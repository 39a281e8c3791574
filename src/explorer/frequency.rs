use std::time::{Duration, Instant};

use super::{Action, ToneGate, WidgetState};
use crate::dsp::Waveform;
use crate::sampler::ToneSpec;
use crate::theory::frequency::{cents_offset, note_frequency, note_from_frequency, FrequencyError};
use crate::theory::note::NoteId;

pub const MIN_FREQUENCY: f64 = 20.0;
pub const MAX_FREQUENCY: f64 = 20_000.0;
pub const TONE_LENGTH: Duration = Duration::from_secs(2);

/// Nearest note to a frequency and how far off it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyReading {
    pub frequency: f64,
    pub note: NoteId,
    /// -50..=50
    pub cents: f64,
}

impl FrequencyReading {
    pub fn of(frequency: f64) -> Result<Self, FrequencyError> {
        Ok(Self {
            frequency,
            note: note_from_frequency(frequency)?,
            cents: cents_offset(frequency)?,
        })
    }

    pub fn is_in_tune(&self) -> bool {
        self.cents.abs() < 5.0
    }
}

#[derive(Debug, Clone)]
pub struct FrequencyExplorer {
    frequency: f64,
    waveform: Waveform,
    tone_length: Duration,
    gate: ToneGate,
}

impl FrequencyExplorer {
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency: clamp_frequency(frequency),
            waveform: Waveform::Sine,
            tone_length: TONE_LENGTH,
            gate: ToneGate::default(),
        }
    }

    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn tone_length(mut self, length: Duration) -> Self {
        self.tone_length = length;
        self
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Clamped to the audible range. Non-finite input is ignored.
    pub fn set_frequency(&mut self, frequency: f64) {
        if frequency.is_finite() {
            self.frequency = clamp_frequency(frequency);
        }
    }

    /// Move by a number of equal-tempered semitones (fractions allowed).
    pub fn nudge(&mut self, semitones: f64) {
        self.set_frequency(self.frequency * 2.0_f64.powf(semitones / 12.0));
    }

    /// Jump to the exact pitch of the nearest note.
    pub fn snap_to_note(&mut self) {
        if let Ok(note) = note_from_frequency(self.frequency) {
            self.frequency = note_frequency(&note);
        }
    }

    pub fn reading(&self) -> Result<FrequencyReading, FrequencyError> {
        FrequencyReading::of(self.frequency)
    }

    pub fn state(&self) -> WidgetState {
        self.gate.state()
    }

    /// Start the tone; replaces one already playing.
    pub fn play(&mut self, now: Instant) -> Vec<Action> {
        let length = self.tone_length.as_secs_f32();
        let spec = ToneSpec::tone(self.frequency as f32, self.waveform, length);
        self.gate.play(now, spec)
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        self.gate.tick(now)
    }

    pub fn stop(&mut self) -> Vec<Action> {
        self.gate.stop()
    }
}

impl Default for FrequencyExplorer {
    fn default() -> Self {
        Self::new(440.0)
    }
}

fn clamp_frequency(frequency: f64) -> f64 {
    frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY)
}
