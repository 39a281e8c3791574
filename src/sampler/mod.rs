// Purpose: recorded-instrument playback on the audio thread
// The playback adapter talks to this layer only through PlayerMessage.

pub mod buffer;
pub mod engine;
pub mod loader;
pub mod message;
pub mod tone;
pub mod voice;

pub use buffer::SampleBuffer;
pub use engine::{SamplerEngine, ToneMessage};
pub use loader::{load_instrument, FileSampleLoader, LoadError, SampleLoader, SampleSet};
pub use message::PlayerMessage;
pub use tone::{ToneSpec, ToneVoice};
pub use voice::{SamplerVoice, VoiceState};
