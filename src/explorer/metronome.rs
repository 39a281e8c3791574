use std::time::{Duration, Instant};

use tracing::debug;

use super::{Action, WidgetState};
use crate::sampler::ToneSpec;
use crate::theory::time_signature::{Accent, TimeSignature};

pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 300.0;

/// Click sound for each accent level: (frequency Hz, velocity)
fn click_for(accent: Accent) -> ToneSpec {
    match accent {
        Accent::High => ToneSpec::click(1600.0, 1.0),
        Accent::Mid => ToneSpec::click(1200.0, 0.75),
        Accent::Low => ToneSpec::click(900.0, 0.5),
    }
}

/// Click track for a time signature.
///
/// Loops until stopped, or for a fixed number of bars. Beats are emitted
/// at most one per `tick`; when the owner falls behind by more than a
/// beat the grid restarts from `now` instead of bursting clicks.
#[derive(Debug, Clone)]
pub struct Metronome {
    bpm: f64,
    time_signature: TimeSignature,
    accents: Vec<Accent>,
    bars: Option<u32>,
    next_beat_at: Option<Instant>,
    beat: u8,
    bar: u32,
}

impl Metronome {
    pub fn new(bpm: f64, time_signature: TimeSignature) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            time_signature,
            accents: time_signature.accent_pattern(),
            bars: None,
            next_beat_at: None,
            beat: 0,
            bar: 0,
        }
    }

    /// Stop by itself after `bars` bars.
    pub fn bars(mut self, bars: u32) -> Self {
        self.bars = Some(bars.max(1));
        self
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Takes effect from the next beat.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    /// Change meter; a running metronome restarts at beat one.
    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        self.time_signature = time_signature;
        self.accents = time_signature.accent_pattern();
        self.beat = 0;
    }

    pub fn accents(&self) -> &[Accent] {
        &self.accents
    }

    /// Beat that will sound next, zero-based
    pub fn current_beat(&self) -> u8 {
        self.beat
    }

    pub fn completed_bars(&self) -> u32 {
        self.bar
    }

    pub fn interval(&self) -> Duration {
        self.time_signature.pulse_interval(self.bpm)
    }

    pub fn state(&self) -> WidgetState {
        if self.next_beat_at.is_some() {
            WidgetState::Playing
        } else {
            WidgetState::Idle
        }
    }

    /// First beat sounds on the next `tick(now)`.
    pub fn start(&mut self, now: Instant) {
        debug!(bpm = self.bpm, meter = %self.time_signature, "metronome start");
        self.beat = 0;
        self.bar = 0;
        self.next_beat_at = Some(now);
    }

    pub fn toggle(&mut self, now: Instant) {
        match self.state() {
            WidgetState::Idle => self.start(now),
            WidgetState::Playing => self.stop(),
        }
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        let Some(due) = self.next_beat_at else {
            return Vec::new();
        };
        if now < due {
            return Vec::new();
        }

        let beat = self.beat;
        let accent = self.accents.get(beat as usize).copied().unwrap_or(Accent::Low);
        let mut actions = vec![Action::Beat {
            beat,
            accent,
            click: click_for(accent),
        }];

        self.beat += 1;
        if self.beat as usize >= self.accents.len() {
            self.beat = 0;
            self.bar += 1;
            if self.bars.is_some_and(|limit| self.bar >= limit) {
                self.next_beat_at = None;
                actions.push(Action::Finished);
                return actions;
            }
        }

        let interval = self.interval();
        let next = due + interval;
        self.next_beat_at = Some(if next + interval <= now { now + interval } else { next });
        actions
    }

    pub fn stop(&mut self) {
        self.next_beat_at = None;
        self.beat = 0;
    }
}

impl Default for Metronome {
    fn default() -> Self {
        Self::new(100.0, TimeSignature::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accents_of(actions: &[Action]) -> Vec<Accent> {
        actions
            .iter()
            .filter_map(|action| match action {
                Action::Beat { accent, .. } => Some(*accent),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn clicks_follow_accent_pattern() {
        let start = Instant::now();
        let mut metronome = Metronome::new(120.0, TimeSignature::SIX_EIGHT);
        let step = metronome.interval();
        assert_eq!(step, Duration::from_millis(500));

        metronome.start(start);
        let mut heard = Vec::new();
        for i in 0..6 {
            heard.extend(accents_of(&metronome.tick(start + step * i)));
        }
        assert_eq!(
            heard,
            vec![Accent::High, Accent::Low, Accent::Low, Accent::Mid, Accent::Low, Accent::Low]
        );
        assert_eq!(metronome.completed_bars(), 1);
        assert_eq!(metronome.state(), WidgetState::Playing);
    }

    #[test]
    fn nothing_between_beats() {
        let start = Instant::now();
        let mut metronome = Metronome::new(60.0, TimeSignature::FOUR_FOUR);
        metronome.start(start);
        assert_eq!(metronome.tick(start).len(), 1);
        assert!(metronome.tick(start + Duration::from_millis(500)).is_empty());
        assert_eq!(metronome.current_beat(), 1);
    }

    #[test]
    fn bar_limit_finishes() {
        let start = Instant::now();
        let mut metronome = Metronome::new(120.0, TimeSignature::TWO_FOUR).bars(1);
        metronome.start(start);
        metronome.tick(start);
        let last = metronome.tick(start + Duration::from_millis(500));
        assert_eq!(last.last(), Some(&Action::Finished));
        assert_eq!(metronome.state(), WidgetState::Idle);
        assert!(metronome.tick(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn falling_behind_resyncs_instead_of_bursting() {
        let start = Instant::now();
        let mut metronome = Metronome::new(120.0, TimeSignature::FOUR_FOUR);
        metronome.start(start);
        metronome.tick(start);
        let late = start + Duration::from_secs(5);
        assert_eq!(metronome.tick(late).len(), 1);
        assert!(metronome.tick(late + Duration::from_millis(100)).is_empty());
        assert_eq!(metronome.tick(late + Duration::from_millis(500)).len(), 1);
    }

    #[test]
    fn stop_and_bpm_limits() {
        let start = Instant::now();
        let mut metronome = Metronome::default();
        metronome.toggle(start);
        assert_eq!(metronome.state(), WidgetState::Playing);
        metronome.toggle(start);
        assert_eq!(metronome.state(), WidgetState::Idle);
        assert!(metronome.tick(start).is_empty());

        metronome.set_bpm(1000.0);
        assert_eq!(metronome.bpm(), MAX_BPM);
    }
}
