pub mod convert; // Sample file conversion
pub mod dsp;
pub mod explorer; // Interval, metronome, frequency and waveform widgets
pub mod instrument;
pub mod keyboard;
pub mod playback; // Note triggering for widgets
pub mod sampler; // Sample playback on the audio thread
pub mod theory;

pub const MAX_BLOCK_SIZE: usize = 2048;
