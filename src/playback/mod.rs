//! Note playback for widgets.
//!
//! [`NotePlayer`] is the capability widgets receive; [`InstrumentPlayer`]
//! is the sample-backed implementation that owns load state and talks to
//! the audio thread.

pub mod instrument;
pub mod notice;
pub mod player;

pub use instrument::{InstrumentPlayer, LoadState, PlayerConfig, ERROR_RECOVERY};
pub use notice::{Notice, NoticeBoard, NOTICE_DURATION};
pub use player::NotePlayer;
