//! Playback adapter - one sample-backed instrument at a time.
//!
//! The adapter lives on the UI thread. Sample loading runs on a worker
//! thread and reports back over a ring buffer; sounding notes are sent to
//! the audio thread as [`PlayerMessage`]s. Nothing here blocks.
//!
//! Load states:
//!
//!   Unloaded ──load()──→ Loading ──ok──→ Ready
//!                           │
//!                           └──err──→ Error ──3s──→ Degraded
//!
//! `Degraded` accepts notes like `Ready` does; the audio side may simply
//! have nothing to play.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info, warn};

use super::notice::{Notice, NoticeBoard, NOTICE_DURATION};
use super::player::NotePlayer;
use crate::instrument::catalog::{resolve, InstrumentDescriptor};
use crate::sampler::{load_instrument, LoadError, PlayerMessage, SampleLoader, SampleSet};
use crate::theory::note::NoteId;

/// Time an error state lasts before the player unblocks itself
pub const ERROR_RECOVERY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Error,
    /// Recovered from an error without samples
    Degraded,
}

impl LoadState {
    pub fn is_playable(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Degraded)
    }
}

/// Playback adapter configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Directory or URL prefix holding one sub-directory per instrument
    pub base_url: String,
    /// How long a triggered note sounds before it is released
    pub note_length: Duration,
    pub velocity: f32,
    pub error_recovery: Duration,
    pub notice_duration: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_url: "samples".to_string(),
            note_length: Duration::from_secs(1),
            velocity: 0.8,
            error_recovery: ERROR_RECOVERY,
            notice_duration: NOTICE_DURATION,
        }
    }
}

impl PlayerConfig {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn note_length(mut self, note_length: Duration) -> Self {
        self.note_length = note_length;
        self
    }

    pub fn velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity.clamp(0.0, 1.0);
        self
    }
}

type LoadResult = Result<SampleSet, LoadError>;

pub struct InstrumentPlayer {
    config: PlayerConfig,
    loader: Arc<dyn SampleLoader>,
    /// Link to the audio thread; None when audio never started
    tx: Option<Producer<PlayerMessage>>,
    state: LoadState,
    instrument: &'static InstrumentDescriptor,
    pending: Option<Consumer<LoadResult>>,
    error_since: Option<Instant>,
    /// Sounding notes and when each is due for release
    sounding: BTreeMap<NoteId, Instant>,
    notices: NoticeBoard,
    now: Instant,
}

impl InstrumentPlayer {
    pub fn new(
        config: PlayerConfig,
        loader: Arc<dyn SampleLoader>,
        tx: Option<Producer<PlayerMessage>>,
    ) -> Self {
        Self {
            config,
            loader,
            tx,
            state: LoadState::Unloaded,
            instrument: resolve("piano"),
            pending: None,
            error_since: None,
            sounding: BTreeMap::new(),
            notices: NoticeBoard::default(),
            now: Instant::now(),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn instrument(&self) -> &'static InstrumentDescriptor {
        self.instrument
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Replace the current instrument.
    ///
    /// Any in-flight load is abandoned and the previous instrument's notes
    /// are released. Unknown names fall back to the default range with no
    /// samples, so the load ends in `Error` and then `Degraded`.
    pub fn load(&mut self, name: &str, now: Instant) {
        self.now = now;
        let descriptor = resolve(name);

        // Dropping the consumer discards whatever the old worker produces
        self.pending = None;
        self.sounding.clear();
        self.send(PlayerMessage::Unload);

        self.instrument = descriptor;
        self.state = LoadState::Loading;
        self.error_since = None;
        info!(instrument = descriptor.name, "loading instrument");

        let (producer, consumer) = RingBuffer::<LoadResult>::new(1);
        self.pending = Some(consumer);

        let loader = Arc::clone(&self.loader);
        let base_url = instrument_url(&self.config.base_url, descriptor.name);
        let spawned = thread::Builder::new()
            .name(format!("load-{}", descriptor.name))
            .spawn(move || {
                let mut producer = producer;
                let result = load_instrument(descriptor, loader.as_ref(), &base_url);
                let _ = producer.push(result);
            });

        if let Err(e) = spawned {
            self.pending = None;
            self.fail(format!("Could not start loading {}: {e}", descriptor.name), now);
        }
    }

    /// Advance timers and collect load results. Call once per UI frame.
    pub fn poll(&mut self, now: Instant) {
        self.now = now;
        self.collect_load_result(now);

        if self.state == LoadState::Error
            && self
                .error_since
                .is_some_and(|since| now.duration_since(since) >= self.config.error_recovery)
        {
            info!(instrument = self.instrument.name, "recovering from load error");
            self.state = LoadState::Degraded;
            self.error_since = None;
        }

        let due: Vec<NoteId> = self
            .sounding
            .iter()
            .filter(|(_, &release_at)| release_at <= now)
            .map(|(note, _)| *note)
            .collect();
        for note in due {
            self.sounding.remove(&note);
            self.send(PlayerMessage::NoteOff { note });
        }

        self.notices.expire(now);
    }

    /// The audio device could not be opened or started.
    ///
    /// Playback stays enabled; it just produces no sound.
    pub fn report_audio_failure(&mut self, error: &str, now: Instant) {
        warn!(error, "audio output unavailable");
        self.tx = None;
        self.notices.raise(
            format!("Audio unavailable: {error}"),
            now,
            self.config.notice_duration,
        );
    }

    /// Release everything, e.g. when the widget is closed.
    pub fn stop_all(&mut self) {
        self.sounding.clear();
        self.send(PlayerMessage::AllNotesOff);
    }

    fn collect_load_result(&mut self, now: Instant) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };

        match pending.pop() {
            Ok(Ok(set)) => {
                self.pending = None;
                info!(
                    instrument = set.instrument,
                    samples = set.len(),
                    "instrument ready"
                );
                self.send(PlayerMessage::LoadSamples(Arc::new(set)));
                self.state = LoadState::Ready;
            }
            Ok(Err(e)) => {
                self.pending = None;
                self.fail(format!("Could not load {}: {e}", self.instrument.name), now);
            }
            Err(_) if pending.is_abandoned() => {
                self.pending = None;
                self.fail(format!("Loading {} stopped unexpectedly", self.instrument.name), now);
            }
            Err(_) => {}
        }
    }

    fn fail(&mut self, message: String, now: Instant) {
        warn!(instrument = self.instrument.name, "{message}");
        self.state = LoadState::Error;
        self.error_since = Some(now);
        self.notices.raise(message, now, self.config.notice_duration);
    }

    fn send(&mut self, msg: PlayerMessage) {
        if let Some(tx) = self.tx.as_mut() {
            if tx.push(msg).is_err() {
                warn!("audio message queue full, dropping message");
            }
        }
    }
}

impl NotePlayer for InstrumentPlayer {
    fn play_note(&mut self, note: &NoteId) {
        if !self.state.is_playable() {
            debug!(%note, state = ?self.state, "ignoring note, instrument not ready");
            return;
        }
        self.sounding.insert(*note, self.now + self.config.note_length);
        self.send(PlayerMessage::NoteOn {
            note: *note,
            velocity: self.config.velocity,
        });
    }

    fn stop_note(&mut self, note: &NoteId) {
        if self.sounding.remove(note).is_some() {
            self.send(PlayerMessage::NoteOff { note: *note });
        }
    }

    fn is_note_available(&self, note: &NoteId) -> bool {
        self.instrument.is_available(note)
    }

    fn sounding_notes(&self) -> Vec<NoteId> {
        self.sounding.keys().copied().collect()
    }
}

/// Directory of one instrument's samples: `<base_url>/<instrument>`.
fn instrument_url(base_url: &str, instrument: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.is_empty() {
        instrument.to_string()
    } else {
        format!("{base}/{instrument}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SampleBuffer;
    use std::sync::{mpsc, Mutex};

    struct SilentLoader;

    impl SampleLoader for SilentLoader {
        fn load(&self, _path: &str) -> Result<SampleBuffer, LoadError> {
            Ok(SampleBuffer::new(vec![0.0; 16], 48_000))
        }
    }

    /// Blocks every load until the sender is dropped.
    struct GatedLoader {
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl SampleLoader for GatedLoader {
        fn load(&self, _path: &str) -> Result<SampleBuffer, LoadError> {
            let _ = self.gate.lock().unwrap().recv();
            Ok(SampleBuffer::new(vec![0.0; 16], 48_000))
        }
    }

    struct BrokenLoader;

    impl SampleLoader for BrokenLoader {
        fn load(&self, path: &str) -> Result<SampleBuffer, LoadError> {
            Err(LoadError::NotFound(path.to_string()))
        }
    }

    fn note(text: &str) -> NoteId {
        text.parse().unwrap()
    }

    /// Poll until the worker thread reports back.
    fn settle(player: &mut InstrumentPlayer, now: Instant) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while player.state() == LoadState::Loading && Instant::now() < deadline {
            player.poll(now);
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn play_before_load_is_a_no_op() {
        let (tx, mut rx) = RingBuffer::new(16);
        let mut player = InstrumentPlayer::new(PlayerConfig::default(), Arc::new(SilentLoader), Some(tx));

        player.play_note(&note("C4"));
        assert!(player.sounding_notes().is_empty());
        assert!(rx.pop().is_err());
    }

    #[test]
    fn play_while_loading_is_a_no_op() {
        let (release, gate) = mpsc::channel::<()>();
        let loader = Arc::new(GatedLoader {
            gate: Mutex::new(gate),
        });
        let (tx, mut rx) = RingBuffer::new(16);
        let mut player = InstrumentPlayer::new(PlayerConfig::default(), loader, Some(tx));
        let start = Instant::now();

        player.load("xylophone", start);
        player.poll(start);
        assert_eq!(player.state(), LoadState::Loading);
        assert!(matches!(rx.pop(), Ok(PlayerMessage::Unload)));

        player.play_note(&note("C4"));
        assert!(player.sounding_notes().is_empty());
        assert!(rx.pop().is_err());

        drop(release);
        settle(&mut player, start);
        assert_eq!(player.state(), LoadState::Ready);
        assert!(matches!(rx.pop(), Ok(PlayerMessage::LoadSamples(_))));
    }

    #[test]
    fn loads_then_plays_and_releases() {
        let (tx, mut rx) = RingBuffer::new(64);
        let mut player = InstrumentPlayer::new(PlayerConfig::default(), Arc::new(SilentLoader), Some(tx));
        let start = Instant::now();

        player.load("cello", start);
        assert_eq!(player.state(), LoadState::Loading);
        settle(&mut player, start);
        assert_eq!(player.state(), LoadState::Ready);

        player.play_note(&note("C4"));
        assert_eq!(player.sounding_notes(), vec![note("C4")]);

        // Released automatically after the note length
        player.poll(start + Duration::from_secs(2));
        assert!(player.sounding_notes().is_empty());

        // Stopping an already finished note does nothing
        player.stop_note(&note("C4"));

        let messages: Vec<_> = std::iter::from_fn(|| rx.pop().ok()).collect();
        assert!(matches!(messages[0], PlayerMessage::Unload));
        assert!(matches!(messages[1], PlayerMessage::LoadSamples(_)));
        assert!(matches!(messages[2], PlayerMessage::NoteOn { .. }));
        assert!(matches!(messages[3], PlayerMessage::NoteOff { .. }));
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn load_error_recovers_after_delay() {
        let mut player = InstrumentPlayer::new(PlayerConfig::default(), Arc::new(BrokenLoader), None);
        let start = Instant::now();

        player.load("violin", start);
        settle(&mut player, start);
        assert_eq!(player.state(), LoadState::Error);
        assert!(player.notice().is_some());

        player.play_note(&note("A4"));
        assert!(player.sounding_notes().is_empty());

        player.poll(start + Duration::from_secs(1));
        assert_eq!(player.state(), LoadState::Error);

        player.poll(start + ERROR_RECOVERY);
        assert_eq!(player.state(), LoadState::Degraded);
        assert!(player.notice().is_none());

        player.play_note(&note("A4"));
        assert_eq!(player.sounding_notes(), vec![note("A4")]);
    }

    #[test]
    fn unknown_instrument_degrades_instead_of_blocking() {
        let mut player = InstrumentPlayer::new(PlayerConfig::default(), Arc::new(SilentLoader), None);
        let start = Instant::now();

        player.load("theremin", start);
        settle(&mut player, start);
        assert_eq!(player.state(), LoadState::Error);
        assert!(!player.instrument().is_known());

        player.poll(start + Duration::from_secs(4));
        assert!(player.state().is_playable());
    }

    #[test]
    fn stop_note_releases_early() {
        let (tx, _rx) = RingBuffer::new(64);
        let mut player = InstrumentPlayer::new(PlayerConfig::default(), Arc::new(SilentLoader), Some(tx));
        let start = Instant::now();
        player.load("piano", start);
        settle(&mut player, start);

        player.play_notes(&[note("C4"), note("E4"), note("G4")]);
        assert_eq!(player.sounding_notes().len(), 3);

        player.stop_note(&note("E4"));
        assert_eq!(player.sounding_notes(), vec![note("C4"), note("G4")]);
        assert!(player.is_note_available(&note("E4")));
    }

    #[test]
    fn audio_failure_raises_notice_but_keeps_state() {
        let mut player = InstrumentPlayer::new(PlayerConfig::default(), Arc::new(SilentLoader), None);
        let start = Instant::now();
        player.report_audio_failure("no output device", start);
        assert_eq!(player.state(), LoadState::Unloaded);
        assert!(player.notice().unwrap().message.contains("no output device"));

        player.poll(start + NOTICE_DURATION);
        assert!(player.notice().is_none());
    }
}
