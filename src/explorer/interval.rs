use std::time::{Duration, Instant};

use tracing::debug;

use super::{Action, Timeline, WidgetState};
use crate::theory::interval::{compound_interval, Interval};
use crate::theory::note::{NoteError, NoteId};

/// Gap between the melodic steps of an interval demo
pub const STEP_GAP: Duration = Duration::from_millis(700);

/// Plays two notes apart, then together.
///
/// One `play()` schedules: lower note, upper note, both notes, then back
/// to idle one gap after the chord.
#[derive(Debug, Clone)]
pub struct IntervalExplorer {
    lower: NoteId,
    upper: NoteId,
    gap: Duration,
    timeline: Timeline<Action>,
}

impl IntervalExplorer {
    /// Notes may be given in either order.
    pub fn new(a: NoteId, b: NoteId) -> Self {
        let (lower, upper) = ordered(a, b);
        Self {
            lower,
            upper,
            gap: STEP_GAP,
            timeline: Timeline::default(),
        }
    }

    /// Start from `root` and go up by `interval`.
    pub fn from_root(root: NoteId, interval: Interval) -> Result<Self, NoteError> {
        let upper = root.transpose(interval.semitones() as i32)?;
        Ok(Self::new(root, upper))
    }

    pub fn gap(mut self, gap: Duration) -> Self {
        self.gap = gap;
        self
    }

    pub fn lower(&self) -> NoteId {
        self.lower
    }

    pub fn upper(&self) -> NoteId {
        self.upper
    }

    /// Change the notes. Stops any demo in progress.
    pub fn set_notes(&mut self, a: NoteId, b: NoteId) {
        self.stop();
        (self.lower, self.upper) = ordered(a, b);
    }

    /// Interval class of the pair
    pub fn interval(&self) -> Interval {
        compound_interval(&self.lower, &self.upper).0
    }

    /// Whole octaves between the notes, beyond the interval class
    pub fn octaves(&self) -> u32 {
        compound_interval(&self.lower, &self.upper).1
    }

    pub fn describe(&self) -> String {
        let interval = self.interval();
        match self.octaves() {
            0 => format!("{} → {}: {}", self.lower, self.upper, interval),
            n => format!(
                "{} → {}: {} (+{} octave{})",
                self.lower,
                self.upper,
                interval,
                n,
                if n == 1 { "" } else { "s" }
            ),
        }
    }

    pub fn state(&self) -> WidgetState {
        if self.timeline.is_empty() {
            WidgetState::Idle
        } else {
            WidgetState::Playing
        }
    }

    /// Restarts from the first step if already playing.
    pub fn play(&mut self, now: Instant) {
        self.timeline.clear();
        debug!(lower = %self.lower, upper = %self.upper, "interval demo");
        self.timeline.push(now, Action::Play(vec![self.lower]));
        self.timeline.push(now + self.gap, Action::Play(vec![self.upper]));
        self.timeline
            .push(now + self.gap * 2, Action::Play(vec![self.lower, self.upper]));
        self.timeline.push(now + self.gap * 3, Action::Finished);
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        self.timeline.due(now)
    }

    pub fn stop(&mut self) {
        self.timeline.clear();
    }
}

fn ordered(a: NoteId, b: NoteId) -> (NoteId, NoteId) {
    if a.midi() <= b.midi() {
        (a, b)
    } else {
        (b, a)
    }
}
