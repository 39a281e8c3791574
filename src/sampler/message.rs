use std::sync::Arc;

use super::loader::SampleSet;
use crate::theory::note::NoteId;

/// Commands sent from the playback adapter to the audio thread.
#[derive(Debug, Clone)]
pub enum PlayerMessage {
    /// Swap in a new instrument; voices of the previous one are released.
    LoadSamples(Arc<SampleSet>),
    /// Drop the current instrument entirely.
    Unload,
    NoteOn { note: NoteId, velocity: f32 },
    NoteOff { note: NoteId },
    AllNotesOff,
}
