//! Interactive explorers.
//!
//! Each explorer is a closed unit with its own timer state:
//!
//!   Idle ──play()/start()──→ Playing ──last step / stop()──→ Idle
//!
//! None of them touch audio directly. The owner calls `tick(now)` once per
//! frame and performs the returned [`Action`]s; `stop()` cancels whatever
//! is still pending.

pub mod frequency;
pub mod interval;
pub mod metronome;
pub mod waveform;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub use frequency::{FrequencyExplorer, FrequencyReading};
pub use interval::IntervalExplorer;
pub use metronome::Metronome;
pub use waveform::WaveformExplorer;

use crate::playback::NotePlayer;
use crate::sampler::ToneSpec;
use crate::theory::note::NoteId;
use crate::theory::time_signature::Accent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Idle,
    Playing,
}

/// Something an explorer wants done now.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Trigger sampled notes together
    Play(Vec<NoteId>),
    /// Start a synthesized tone
    Tone(ToneSpec),
    /// Silence synthesized tones
    StopTones,
    /// Metronome beat (zero-based within the bar)
    Beat {
        beat: u8,
        accent: Accent,
        click: ToneSpec,
    },
    /// The explorer went back to idle on its own
    Finished,
}

impl Action {
    /// Perform note actions on `player`; tone actions are handed back.
    pub fn perform(self, player: &mut dyn NotePlayer) -> Option<Action> {
        match self {
            Action::Play(notes) => {
                player.play_notes(&notes);
                None
            }
            other => Some(other),
        }
    }
}

/// Steps scheduled at fixed instants, drained in order.
#[derive(Debug, Clone)]
pub(crate) struct Timeline<A> {
    steps: VecDeque<(Instant, A)>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self {
            steps: VecDeque::new(),
        }
    }
}

impl<A> Timeline<A> {
    /// Append a step. Steps must be pushed in time order.
    pub(crate) fn push(&mut self, at: Instant, step: A) {
        debug_assert!(self.steps.back().map_or(true, |(last, _)| *last <= at));
        self.steps.push_back((at, step));
    }

    /// Remove and return every step due at `now`.
    pub(crate) fn due(&mut self, now: Instant) -> Vec<A> {
        let mut due = Vec::new();
        while self.steps.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, step)) = self.steps.pop_front() {
                due.push(step);
            }
        }
        due
    }

    pub(crate) fn clear(&mut self) {
        self.steps.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A single tone with a fixed length, shared by the tone-based explorers.
///
/// Holds the whole play, tick and stop cycle: replacing a sounding tone
/// stops it first, and the gate reports `Finished` once when it runs out.
#[derive(Debug, Clone, Default)]
pub(crate) struct ToneGate {
    ends_at: Option<Instant>,
}

impl ToneGate {
    pub(crate) fn state(&self) -> WidgetState {
        if self.ends_at.is_some() {
            WidgetState::Playing
        } else {
            WidgetState::Idle
        }
    }

    /// Start `spec`, cutting off a tone that is still sounding.
    pub(crate) fn play(&mut self, now: Instant, spec: ToneSpec) -> Vec<Action> {
        let mut actions = self.stop();
        self.ends_at = Some(now + Duration::from_secs_f32(spec.duration.max(0.0)));
        actions.push(Action::Tone(spec));
        actions
    }

    /// `Finished` once, when the tone has run its length.
    pub(crate) fn tick(&mut self, now: Instant) -> Vec<Action> {
        if self.ends_at.is_some_and(|end| now >= end) {
            self.ends_at = None;
            vec![Action::Finished]
        } else {
            Vec::new()
        }
    }

    /// Close early; `StopTones` only if a tone was playing.
    pub(crate) fn stop(&mut self) -> Vec<Action> {
        match self.ends_at.take() {
            Some(_) => vec![Action::StopTones],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::Waveform;

    #[test]
    fn timeline_drains_due_steps_in_order() {
        let start = Instant::now();
        let mut timeline = Timeline::default();
        timeline.push(start, 'a');
        timeline.push(start + Duration::from_millis(10), 'b');
        timeline.push(start + Duration::from_millis(20), 'c');

        assert_eq!(timeline.due(start + Duration::from_millis(15)), vec!['a', 'b']);
        assert_eq!(timeline.due(start + Duration::from_millis(15)), Vec::<char>::new());
        assert_eq!(timeline.due(start + Duration::from_millis(30)), vec!['c']);
        assert!(timeline.is_empty());
    }

    #[test]
    fn tone_gate_finishes_once() {
        let start = Instant::now();
        let spec = ToneSpec::tone(440.0, Waveform::Sine, 1.0);
        let mut gate = ToneGate::default();

        assert_eq!(gate.play(start, spec), vec![Action::Tone(spec)]);
        assert_eq!(gate.state(), WidgetState::Playing);
        assert!(gate.tick(start).is_empty());
        assert_eq!(gate.tick(start + Duration::from_secs(1)), vec![Action::Finished]);
        assert!(gate.tick(start + Duration::from_secs(2)).is_empty());
        assert!(gate.stop().is_empty());
    }

    #[test]
    fn replaying_stops_the_sounding_tone() {
        let start = Instant::now();
        let spec = ToneSpec::tone(220.0, Waveform::Square, 2.0);
        let mut gate = ToneGate::default();
        gate.play(start, spec);

        let actions = gate.play(start + Duration::from_millis(500), spec);
        assert_eq!(actions, vec![Action::StopTones, Action::Tone(spec)]);
        assert!(gate.tick(start + Duration::from_secs(2)).is_empty());
        assert_eq!(gate.tick(start + Duration::from_millis(2500)), vec![Action::Finished]);
    }
}
