//! TUI module for tonebook
//!
//! One keyboard shared by every panel, the current explorer, and live
//! visualization of the audio output.

mod explorers;
mod keyboard;
mod spectrum;
mod status;
mod waveform;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use tracing::{debug, warn};

use tonebook::{
    explorer::{waveform::WINDOW_LEN, Action, FrequencyExplorer, IntervalExplorer, Metronome, WaveformExplorer, WidgetState},
    instrument::{instruments, lookup},
    keyboard::{Keyboard, KeyboardLayout},
    playback::{InstrumentPlayer, NotePlayer},
    sampler::ToneMessage,
    theory::{Accent, NoteId, PitchClass, TimeSignature},
};

use super::app::VIS_BUFFER_SIZE;
use explorers::render_panel;
use keyboard::render_keyboard;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats};
use waveform::render_waveform;

/// Computer keys mapped to semitones above the base octave's C
const NOTE_KEYS: &[(char, i32)] = &[
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

const METERS: [TimeSignature; 6] = [
    TimeSignature::TWO_FOUR,
    TimeSignature::THREE_FOUR,
    TimeSignature::FOUR_FOUR,
    TimeSignature::SIX_EIGHT,
    TimeSignature::NINE_EIGHT,
    TimeSignature::TWELVE_EIGHT,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Interval,
    Metronome,
    Frequency,
    Waveform,
}

impl Panel {
    fn next(self) -> Self {
        match self {
            Panel::Interval => Panel::Metronome,
            Panel::Metronome => Panel::Frequency,
            Panel::Frequency => Panel::Waveform,
            Panel::Waveform => Panel::Interval,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Panel::Interval => " Intervals ",
            Panel::Metronome => " Metronome ",
            Panel::Frequency => " Frequency ",
            Panel::Waveform => " Waveforms ",
        }
    }
}

/// Every explorer, each with its own timers
pub struct Explorers {
    pub interval: IntervalExplorer,
    pub metronome: Metronome,
    pub frequency: FrequencyExplorer,
    pub waveform: WaveformExplorer,
    /// Last metronome beat heard: (beat, accent)
    pub last_beat: Option<(u8, Accent)>,
    meter: usize,
}

/// UI application state
pub struct UiApp {
    player: InstrumentPlayer,
    keyboard: Keyboard,
    explorers: Explorers,
    panel: Panel,
    /// Octave the computer keys start from
    base_octave: u8,
    last_clicked: Option<NoteId>,
    /// None when there is no audio output to play tones on
    tone_tx: Option<Producer<ToneMessage>>,
    audio_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    /// Where the keyboard was last drawn, for mouse hit testing
    keyboard_area: Rect,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        player: InstrumentPlayer,
        tone_tx: Option<Producer<ToneMessage>>,
        audio_rx: Consumer<f32>,
        sample_rate: f32,
    ) -> Self {
        let range = player.instrument().range();
        let c4 = NoteId::new(PitchClass::C, 4);
        let e4 = NoteId::new(PitchClass::E, 4);

        Self {
            keyboard: Keyboard::new(KeyboardLayout::new(range, 3.0, 2.0)),
            base_octave: range.min().max(4.min(range.max())),
            player,
            explorers: Explorers {
                interval: IntervalExplorer::new(c4, e4),
                metronome: Metronome::default(),
                frequency: FrequencyExplorer::default(),
                waveform: WaveformExplorer::default().sample_rate(sample_rate),
                last_beat: None,
                meter: 2,
            },
            panel: Panel::Interval,
            last_clicked: None,
            tone_tx,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            keyboard_area: Rect::default(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            let now = Instant::now();
            self.tick(now);
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking input, ~60fps
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code, Instant::now());
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        self.stop_everything();
        Ok(())
    }

    /// Advance the player and every explorer, then perform what is due.
    fn tick(&mut self, now: Instant) {
        self.player.poll(now);

        let mut actions = self.explorers.interval.tick(now);
        actions.extend(self.explorers.metronome.tick(now));
        actions.extend(self.explorers.frequency.tick(now));
        actions.extend(self.explorers.waveform.tick(now));
        self.perform(actions);

        self.keyboard.sync(&self.player);
        if self.explorers.interval.state() == WidgetState::Idle {
            self.keyboard.set_active([self.explorers.interval.lower(), self.explorers.interval.upper()]);
        }
    }

    fn perform(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action.perform(&mut self.player) {
                None | Some(Action::Finished) | Some(Action::Play(_)) => {}
                Some(Action::Tone(spec)) => {
                    self.send_tone(ToneMessage::Play(spec));
                }
                Some(Action::StopTones) => {
                    self.send_tone(ToneMessage::StopAll);
                }
                Some(Action::Beat { beat, accent, click }) => {
                    self.explorers.last_beat = Some((beat, accent));
                    self.send_tone(ToneMessage::Play(click));
                }
            }
        }
    }

    /// Queue a tone for the audio thread. False when nothing was queued.
    fn send_tone(&mut self, msg: ToneMessage) -> bool {
        let Some(tone_tx) = self.tone_tx.as_mut() else {
            return false;
        };
        if tone_tx.push(msg).is_err() {
            warn!("tone queue full, dropping tone");
            return false;
        }
        true
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }

        if received {
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
            self.spectrum.update(&self.audio_buffer);
        }
    }

    fn handle_key(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.panel = self.panel.next(),
            KeyCode::Left => self.switch_instrument(-1, now),
            KeyCode::Right => self.switch_instrument(1, now),
            KeyCode::Char('z') => self.shift_octave(-1),
            KeyCode::Char('x') => self.shift_octave(1),
            KeyCode::Char(' ') => self.panel_action(now),
            KeyCode::Up => self.panel_adjust(1),
            KeyCode::Down => self.panel_adjust(-1),
            KeyCode::Char('m') => self.cycle_meter(),
            KeyCode::Char('v') => {
                self.explorers.waveform.cycle_waveform();
                let waveform = self.explorers.waveform.waveform();
                self.explorers.frequency = self.explorers.frequency.clone().waveform(waveform);
            }
            KeyCode::Char('.') => self.stop_everything(),
            KeyCode::Char(c) => {
                if let Some(&(_, offset)) = NOTE_KEYS.iter().find(|(k, _)| *k == c) {
                    self.play_computer_key(offset);
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let area = self.keyboard_area;
        let inside = mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => {
                // Aim for the middle of the cell
                let x = (mouse.column - area.x) as f32 + 0.5;
                let y = (mouse.row - area.y) as f32 + 0.5;
                let clicked = &mut self.last_clicked;
                self.keyboard
                    .pointer_down(x, y, &mut self.player, |note| *clicked = Some(*note));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.keyboard.pointer_up(&mut self.player);
            }
            _ => {}
        }
    }

    fn play_computer_key(&mut self, offset: i32) {
        let base = NoteId::new(PitchClass::C, self.base_octave);
        let Ok(note) = base.transpose(offset) else {
            return;
        };
        if !self.keyboard.range().contains_note(&note) {
            debug!(%note, "key outside instrument range");
            return;
        }
        self.last_clicked = Some(note);
        if self.player.is_note_available(&note) {
            self.player.play_note(&note);
        }
    }

    fn shift_octave(&mut self, delta: i32) {
        let range = self.keyboard.range();
        let octave = (self.base_octave as i32 + delta).clamp(range.min() as i32, range.max() as i32);
        self.base_octave = octave as u8;
    }

    fn switch_instrument(&mut self, delta: isize, now: Instant) {
        let catalog = instruments();
        let current = catalog
            .iter()
            .position(|d| d.name == self.player.instrument().name)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(catalog.len() as isize) as usize;
        let name = catalog[next].name;

        self.player.load(name, now);
        if let Some(descriptor) = lookup(name) {
            let range = descriptor.range();
            self.keyboard.set_range(range);
            self.base_octave = self.base_octave.clamp(range.min(), range.max());
        }
    }

    fn panel_action(&mut self, now: Instant) {
        let actions = match self.panel {
            Panel::Interval => {
                self.explorers.interval.play(now);
                let (lower, upper) = (self.explorers.interval.lower(), self.explorers.interval.upper());
                self.keyboard.set_active([lower, upper]);
                Vec::new()
            }
            Panel::Metronome => {
                self.explorers.metronome.toggle(now);
                self.explorers.last_beat = None;
                Vec::new()
            }
            Panel::Frequency => self.explorers.frequency.play(now),
            Panel::Waveform => self.explorers.waveform.play(now),
        };
        self.perform(actions);
    }

    fn panel_adjust(&mut self, delta: i32) {
        match self.panel {
            Panel::Interval => {
                let lower = self.explorers.interval.lower();
                let upper = self.explorers.interval.upper();
                if let Ok(next) = upper.transpose(delta) {
                    if next.midi() >= lower.midi() {
                        self.explorers.interval.set_notes(lower, next);
                    }
                }
            }
            Panel::Metronome => {
                let bpm = self.explorers.metronome.bpm() + 5.0 * delta as f64;
                self.explorers.metronome.set_bpm(bpm);
            }
            Panel::Frequency => self.explorers.frequency.nudge(delta as f64),
            Panel::Waveform => {
                let f = self.explorers.waveform.frequency() * 2f32.powf(delta as f32 / 12.0);
                self.explorers.waveform.set_frequency(f);
            }
        }
    }

    fn cycle_meter(&mut self) {
        self.explorers.meter = (self.explorers.meter + 1) % METERS.len();
        self.explorers
            .metronome
            .set_time_signature(METERS[self.explorers.meter]);
    }

    fn stop_everything(&mut self) {
        self.explorers.interval.stop();
        self.explorers.metronome.stop();
        let mut actions = self.explorers.frequency.stop();
        actions.extend(self.explorers.waveform.stop());
        self.perform(actions);
        self.player.stop_all();
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(7), // Keyboard
                Constraint::Min(8),    // Explorer + visualization
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(frame, chunks[0], &self.player, self.base_octave, self.last_clicked, &stats);

        self.keyboard_area = render_keyboard(frame, chunks[1], &mut self.keyboard, &self.player);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[2]);
        render_panel(frame, body[0], self.panel, self.panel.title(), &self.explorers);

        let vis = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body[1]);
        if self.panel == Panel::Waveform {
            let window = self.explorers.waveform.render_window(WINDOW_LEN);
            let title = format!(" {} ", self.explorers.waveform.waveform());
            render_waveform(frame, vis[0], &title, &window);
        } else {
            render_waveform(frame, vis[0], " Output ", &self.audio_buffer);
        }
        render_spectrum(frame, vis[1], &self.spectrum);

        let help = Paragraph::new(
            " [Q] Quit  [Tab] Panel  [←/→] Instrument  [A-K] Play  [Z/X] Octave  [Space] Start  [↑/↓] Adjust  [M] Meter  [V] Wave  [.] Stop",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rtrb::RingBuffer;
    use tonebook::{playback::PlayerConfig, sampler::FileSampleLoader};

    use super::*;

    fn app(tone_tx: Option<Producer<ToneMessage>>) -> UiApp {
        let loader = Arc::new(FileSampleLoader::new(""));
        let player = InstrumentPlayer::new(PlayerConfig::default(), loader, None);
        let (_vis_tx, vis_rx) = RingBuffer::new(16);
        UiApp::new(player, tone_tx, vis_rx, 48_000.0)
    }

    fn beats(count: u8) -> Vec<Action> {
        let mut metronome = Metronome::default();
        let start = Instant::now();
        metronome.start(start);
        (0..count)
            .flat_map(|i| metronome.tick(start + metronome.interval() * i as u32))
            .collect()
    }

    #[test]
    fn clicks_are_dropped_without_audio_output() {
        let mut ui = app(None);
        ui.perform(beats(100));

        assert!(!ui.send_tone(ToneMessage::StopAll));
        // The beat display still follows the metronome
        assert!(ui.explorers.last_beat.is_some());
    }

    #[test]
    fn clicks_reach_the_tone_queue() {
        let (tone_tx, mut tone_rx) = RingBuffer::new(8);
        let mut ui = app(Some(tone_tx));
        ui.perform(beats(4));

        let queued = std::iter::from_fn(|| tone_rx.pop().ok()).count();
        assert_eq!(queued, 4);
        assert_eq!(ui.explorers.last_beat, Some((3, Accent::Low)));
    }
}
