//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the output, shown on log-spaced bins, plus the
//! strongest partial named as a note.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use tonebook::theory::{note_from_frequency, NoteId};

/// Number of frequency bins to display
const SPECTRUM_BINS: usize = 48;
const MIN_FREQ: f32 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT index shown at each display bin
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (frequency Hz, magnitude dB) per display bin
    spectrum: Vec<(f64, f64)>,
    /// Strongest FFT bin of the last update, in Hz
    peak: Option<f32>,
    sample_rate: f32,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the buffers passed to
    /// [`update`](Self::update).
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let buffer_len = buffer_len.max(2);
        let fft = FftPlanner::new().plan_fft_forward(buffer_len);

        let denom = (buffer_len - 1) as f32;
        let window = (0..buffer_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let half = buffer_len / 2;
        let freqs = log_spaced(MIN_FREQ, (sample_rate / 2.0).min(20_000.0), SPECTRUM_BINS);
        let bin_indices = freqs
            .iter()
            .map(|&f| ((f * buffer_len as f32 / sample_rate).round() as usize).min(half - 1))
            .collect();
        let spectrum = freqs.iter().map(|&f| (f as f64, FLOOR_DB)).collect();

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
            peak: None,
            sample_rate,
        }
    }

    /// Recompute from a new buffer; other lengths are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let power = |c: Complex<f32>| (c.re * c.re + c.im * c.im).max(1e-12);
        for ((_, db), &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            *db = 10.0 * (power(self.scratch[index]) as f64).log10();
        }

        // Skip DC when looking for the strongest partial
        let half = self.scratch.len() / 2;
        self.peak = self.scratch[1..half]
            .iter()
            .enumerate()
            .map(|(i, &c)| (i + 1, power(c)))
            .filter(|&(_, p)| p > 1e-3)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i as f32 * self.sample_rate / self.scratch.len() as f32);
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    /// Nearest note to the strongest partial, if there is any signal
    pub fn dominant_note(&self) -> Option<(f32, NoteId)> {
        let peak = self.peak?;
        note_from_frequency(peak as f64).ok().map(|note| (peak, note))
    }
}

fn log_spaced(min: f32, max: f32, count: usize) -> Vec<f32> {
    let max = max.max(min);
    let ratio = max / min;
    (0..count)
        .map(|i| {
            let t = if count > 1 { i as f32 / (count - 1) as f32 } else { 0.0 };
            min * ratio.powf(t)
        })
        .collect()
}

/// Render the spectrum analyzer widget
pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let title = match analyzer.dominant_note() {
        Some((freq, note)) => format!(" Spectrum  peak {freq:.0} Hz ≈ {note} "),
        None => " Spectrum ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let spectrum = analyzer.data();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let max_freq = spectrum.last().map_or(1.0, |(f, _)| *f).max(1.0);
    let max_db = spectrum.iter().map(|(_, db)| *db).fold(FLOOR_DB, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, max_freq])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, max_db.max(0.0) + 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
