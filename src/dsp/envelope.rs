use super::{context::RenderCtx, MIN_TIME};

/*
Gain envelope
=============

Every sampled note and every synthesized click is shaped by one of these.
Key down starts Attack, key up starts Release.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Attack, Decay and Release are each a straight Ramp between two levels,
measured in whole samples, so every segment lands exactly on its target.
Ramps start from whatever level the envelope is at: releasing a key in
the middle of the attack fades from there.

The sample rate is only known while rendering, so Attack and Decay ramps
are built on their first sample. Release gets its rate from note_off.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    /// Held until note_off; a zero sustain level ends the note instead
    Sustain,
    Release,
}

/// Linear segment from `from` to `to` over `len` samples.
#[derive(Debug, Clone, Copy)]
struct Ramp {
    from: f32,
    to: f32,
    len: u32,
    pos: u32,
}

impl Ramp {
    fn new(from: f32, to: f32, seconds: f32, sample_rate: f32) -> Self {
        Self {
            from,
            to,
            len: (seconds * sample_rate).round().max(1.0) as u32,
            pos: 0,
        }
    }

    fn step(&mut self) -> f32 {
        self.pos = (self.pos + 1).min(self.len);
        let t = self.pos as f32 / self.len as f32;
        self.from + (self.to - self.from) * t
    }

    fn is_done(&self) -> bool {
        self.pos >= self.len
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,

    stage: EnvelopeState,
    level: f32,
    ramp: Option<Ramp>,
}

impl Envelope {
    /// Times in seconds, sustain as a level in 0.0..=1.0.
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(MIN_TIME),
            decay: decay.max(MIN_TIME),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(MIN_TIME),
            stage: EnvelopeState::Idle,
            level: 0.0,
            ramp: None,
        }
    }

    /// Shape used for recorded instruments: near-instant attack, full
    /// sustain, a gentle release.
    pub fn sampler() -> Self {
        Self::adsr(0.005, 0.1, 1.0, 0.6)
    }

    /// Short percussive shape for metronome clicks.
    pub fn click() -> Self {
        Self::adsr(0.001, 0.02, 0.0, 0.01)
    }

    /// Key down. Restarts from silence even if the envelope was sounding.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.ramp = None;
    }

    /// Key up. Ignored when idle or already releasing.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }
        self.stage = EnvelopeState::Release;
        self.ramp = Some(Ramp::new(self.level, 0.0, self.release, ctx.sample_rate));
    }

    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        match self.stage {
            EnvelopeState::Idle => self.level = 0.0,
            EnvelopeState::Sustain => self.level = self.sustain,
            EnvelopeState::Attack | EnvelopeState::Decay | EnvelopeState::Release => {
                let mut ramp = match self.ramp.take() {
                    Some(ramp) => ramp,
                    None => self.segment(ctx.sample_rate),
                };
                self.level = ramp.step();
                if ramp.is_done() {
                    self.advance();
                } else {
                    self.ramp = Some(ramp);
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Multiply a block of audio by the envelope.
    pub fn apply(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample *= self.next_sample(ctx);
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.ramp = None;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    fn segment(&self, sample_rate: f32) -> Ramp {
        match self.stage {
            EnvelopeState::Attack => Ramp::new(self.level, 1.0, self.attack, sample_rate),
            EnvelopeState::Decay => Ramp::new(self.level, self.sustain, self.decay, sample_rate),
            _ => Ramp::new(self.level, 0.0, self.release, sample_rate),
        }
    }

    /// Move on once the current ramp has landed.
    fn advance(&mut self) {
        self.stage = match self.stage {
            EnvelopeState::Attack => EnvelopeState::Decay,
            EnvelopeState::Decay if self.sustain > 0.0 => EnvelopeState::Sustain,
            _ => {
                self.level = 0.0;
                EnvelopeState::Idle
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0)
    }

    fn render_samples(env: &mut Envelope, samples: usize) {
        let ctx = ctx();
        for _ in 0..samples {
            env.next_sample(&ctx);
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2);
        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize + 1);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(0.01, 0.05, sustain, 0.2);
        env.note_on();
        render_samples(&mut env, ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - sustain).abs() < 0.05, "sustain level should be held");
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.05, 0.5, release);
        env.note_on();
        render_samples(&mut env, 20);

        env.note_off(&ctx());
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert!(env.level() <= 0.001, "release should fall back to zero");
        assert!(!env.is_active());
    }

    #[test]
    fn note_off_while_idle_is_ignored() {
        let mut env = Envelope::sampler();
        env.note_off(&ctx());
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn click_finishes_without_note_off() {
        let mut env = Envelope::click();
        env.note_on();
        render_samples(&mut env, 100);
        assert!(!env.is_active());
    }
}
