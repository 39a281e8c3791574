//! TonebookApp - application builder and runner

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{error, info};

use tonebook::{
    playback::{InstrumentPlayer, PlayerConfig},
    sampler::{FileSampleLoader, PlayerMessage, SamplerEngine, ToneMessage},
    MAX_BLOCK_SIZE,
};

use super::ui::UiApp;

/// Samples kept for the oscilloscope and spectrum
pub const VIS_BUFFER_SIZE: usize = 1024;

const MAX_VOICES: usize = 24;

/// Main application builder
pub struct TonebookApp {
    instrument: String,
    samples: PathBuf,
    config: PlayerConfig,
}

impl TonebookApp {
    pub fn new() -> Self {
        Self {
            instrument: "piano".to_string(),
            samples: PathBuf::from("samples"),
            config: PlayerConfig::default(),
        }
    }

    /// Instrument loaded at startup
    pub fn instrument(mut self, name: &str) -> Self {
        self.instrument = name.to_string();
        self
    }

    /// Directory holding `<instrument>/<Stem>.mp3`
    pub fn samples(mut self, dir: impl Into<PathBuf>) -> Self {
        self.samples = dir.into();
        self
    }

    /// Run the application (takes over the terminal until quit)
    pub fn run(self) -> EyreResult<()> {
        let (player_tx, player_rx) = RingBuffer::<PlayerMessage>::new(256);
        let (tone_tx, tone_rx) = RingBuffer::<ToneMessage>::new(64);
        let (vis_tx, vis_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * 8);

        let loader = Arc::new(FileSampleLoader::new(""));
        let config = self.config.base_url(self.samples.display().to_string());
        let mut player = InstrumentPlayer::new(config, loader, Some(player_tx));

        let now = Instant::now();
        // Keep the stream alive for the lifetime of the UI
        let (stream, sample_rate) = match start_audio(player_rx, tone_rx, vis_tx) {
            Ok((stream, sample_rate)) => (Some(stream), sample_rate),
            Err(e) => {
                error!(error = %e, "audio output failed to start");
                player.report_audio_failure(&format!("{e:#}"), now);
                (None, 48_000.0)
            }
        };

        player.load(&self.instrument, now);

        // Without a stream nothing drains the tone queue
        let tone_tx = stream.is_some().then_some(tone_tx);
        let mut ui = UiApp::new(player, tone_tx, vis_rx, sample_rate);
        let mut terminal = ratatui::init();
        crossterm::execute!(std::io::stdout(), crossterm::event::EnableMouseCapture)?;
        let result = ui.run(&mut terminal);
        crossterm::execute!(std::io::stdout(), crossterm::event::DisableMouseCapture)?;
        ratatui::restore();

        info!("tonebook exiting");
        result
    }
}

impl Default for TonebookApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared audio state
struct AudioState {
    engine: SamplerEngine,
    vis_tx: Producer<f32>,
}

/// Open the default output device and start rendering the sampler into it.
fn start_audio(
    player_rx: Consumer<PlayerMessage>,
    tone_rx: Consumer<ToneMessage>,
    vis_tx: Producer<f32>,
) -> EyreResult<(cpal::Stream, f32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "audio output");

    let engine = SamplerEngine::new(sample_rate, MAX_VOICES, player_rx).with_tones(tone_rx);
    let state = Arc::new(Mutex::new(AudioState { engine, vis_tx }));

    let state_clone = Arc::clone(&state);
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let Ok(mut state) = state_clone.lock() else {
                data.fill(0.0);
                return;
            };
            let AudioState { engine, vis_tx } = &mut *state;

            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames_to_render];
                engine.render_block(block);

                // Mono to all channels
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    let s = s.clamp(-1.0, 1.0);
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                    // Visualization is best effort; drop samples when full
                    let _ = vis_tx.push(s);
                }

                frames_written += frames_to_render;
            }
        },
        |err| error!(error = %err, "audio stream error"),
        None,
    )?;

    stream.play()?;
    Ok((stream, sample_rate))
}
