#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fmt;
use std::time::Duration;

/// Strength of a metronome click.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    /// Downbeat of the bar
    High,
    /// Start of a later beat group
    Mid,
    Low,
}

/// Time signature with support for simple and compound meters
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    /// Number of beats per bar (numerator)
    pub numerator: u8,
    /// Note value that gets one beat (denominator: 4 = quarter, 8 = eighth)
    pub denominator: u8,
    /// Number of pulses grouped per felt beat
    /// Simple meters: 1 (2/4, 3/4, 4/4)
    /// Compound meters: 3 (6/8, 9/8, 12/8)
    pub grouping: u8,
}

impl TimeSignature {
    /// Standard 4/4 time (simple meter)
    pub const FOUR_FOUR: TimeSignature = TimeSignature {
        numerator: 4,
        denominator: 4,
        grouping: 1,
    };

    /// 3/4 time (waltz, simple meter)
    pub const THREE_FOUR: TimeSignature = TimeSignature {
        numerator: 3,
        denominator: 4,
        grouping: 1,
    };

    /// 2/4 time (march)
    pub const TWO_FOUR: TimeSignature = TimeSignature {
        numerator: 2,
        denominator: 4,
        grouping: 1,
    };

    /// 6/8 time (compound duple meter)
    pub const SIX_EIGHT: TimeSignature = TimeSignature {
        numerator: 6,
        denominator: 8,
        grouping: 3,
    };

    /// 9/8 time (compound triple meter)
    pub const NINE_EIGHT: TimeSignature = TimeSignature {
        numerator: 9,
        denominator: 8,
        grouping: 3,
    };

    /// 12/8 time (compound quadruple meter)
    pub const TWELVE_EIGHT: TimeSignature = TimeSignature {
        numerator: 12,
        denominator: 8,
        grouping: 3,
    };

    /// Create a time signature, inferring the beat grouping.
    ///
    /// Eighth-note meters whose numerator is a multiple of three (above
    /// three) are compound: 6/8, 9/8, 12/8. Everything else is simple.
    pub fn new(numerator: u8, denominator: u8) -> Self {
        let numerator = numerator.max(1);
        let grouping = if denominator == 8 && numerator > 3 && numerator % 3 == 0 {
            3
        } else {
            1
        };
        Self {
            numerator,
            denominator,
            grouping,
        }
    }

    /// Get the total duration of one bar in ticks
    /// Formula: (numerator / denominator) * (4 * ppq)
    pub fn bar_ticks(&self, ppq: u32) -> u32 {
        (self.numerator as u32 * 4 * ppq) / self.denominator.max(1) as u32
    }

    /// Felt beats per bar: 2 for 6/8, 3 for 9/8, 4 for 4/4
    pub fn felt_beats_per_bar(&self) -> u8 {
        if self.grouping > 1 && self.numerator % self.grouping == 0 {
            self.numerator / self.grouping
        } else {
            self.numerator
        }
    }

    pub fn is_compound(&self) -> bool {
        self.grouping == 3
    }

    pub fn is_simple(&self) -> bool {
        !self.is_compound()
    }

    /// Human name of the meter, e.g. "compound duple"
    pub fn meter_name(&self) -> String {
        let count = match self.felt_beats_per_bar() {
            2 => "duple",
            3 => "triple",
            4 => "quadruple",
            _ => "irregular",
        };
        let kind = if self.is_compound() { "compound" } else { "simple" };
        format!("{kind} {count}")
    }

    /// Accent for every pulse of one bar.
    ///
    /// Compound: first pulse High, first pulse of every later group Mid.
    /// Simple: first beat High; even meters of four or more beats put a
    /// Mid accent on the middle beat. A bar with no beats has no accents.
    pub fn accent_pattern(&self) -> Vec<Accent> {
        let beats = self.numerator as usize;
        if beats == 0 {
            return Vec::new();
        }
        let mut accents = vec![Accent::Low; beats];
        if self.is_compound() {
            let group = self.grouping as usize;
            for start in (group..beats).step_by(group) {
                accents[start] = Accent::Mid;
            }
        } else if beats >= 4 && beats % 2 == 0 {
            accents[beats / 2] = Accent::Mid;
        }
        accents[0] = Accent::High;
        accents
    }

    /// Time between pulses when `bpm` counts the denominator note value.
    pub fn pulse_interval(&self, bpm: f64) -> Duration {
        Duration::from_secs_f64(60.0 / bpm.max(1.0))
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Accent::{High, Low, Mid};

    #[test]
    fn test_four_four_meter() {
        let ts = TimeSignature::FOUR_FOUR;
        let ppq = 480;

        // 4/4 bar = 4 quarter notes = 4 * 480 = 1920 ticks
        assert_eq!(ts.bar_ticks(ppq), 1920);
        assert_eq!(ts.felt_beats_per_bar(), 4);
        assert!(ts.is_simple());
        assert_eq!(ts.accent_pattern(), vec![High, Low, Mid, Low]);
    }

    #[test]
    fn empty_bar_has_no_accents() {
        let ts = TimeSignature {
            numerator: 0,
            denominator: 8,
            grouping: 3,
        };
        assert!(ts.accent_pattern().is_empty());
    }

    #[test]
    fn test_six_eight_meter() {
        let ts = TimeSignature::new(6, 8);
        assert_eq!(ts, TimeSignature::SIX_EIGHT);

        // 6/8 bar = 6 eighth notes = 6 * (480/2) = 1440 ticks
        assert_eq!(ts.bar_ticks(480), 1440);
        assert_eq!(ts.felt_beats_per_bar(), 2);
        assert!(ts.is_compound());
        assert_eq!(ts.meter_name(), "compound duple");
        assert_eq!(ts.accent_pattern(), vec![High, Low, Low, Mid, Low, Low]);
    }

    #[test]
    fn test_twelve_eight_meter() {
        let ts = TimeSignature::new(12, 8);
        assert_eq!(ts.felt_beats_per_bar(), 4);
        let accents = ts.accent_pattern();
        assert_eq!(accents[0], High);
        assert_eq!(accents[3], Mid);
        assert_eq!(accents[6], Mid);
        assert_eq!(accents[9], Mid);
        assert_eq!(accents.iter().filter(|a| **a == Low).count(), 8);
    }

    #[test]
    fn test_three_four_meter() {
        let ts = TimeSignature::THREE_FOUR;
        assert_eq!(ts.bar_ticks(480), 1440);
        assert_eq!(ts.meter_name(), "simple triple");
        assert_eq!(ts.accent_pattern(), vec![High, Low, Low]);
    }

    #[test]
    fn three_eight_stays_simple() {
        let ts = TimeSignature::new(3, 8);
        assert!(ts.is_simple());
        assert_eq!(ts.accent_pattern(), vec![High, Low, Low]);
    }

    #[test]
    fn pulse_interval_follows_bpm() {
        let ts = TimeSignature::FOUR_FOUR;
        assert_eq!(ts.pulse_interval(120.0), Duration::from_millis(500));
        assert_eq!(ts.pulse_interval(60.0), Duration::from_secs(1));
    }
}
