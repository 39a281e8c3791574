//! Instrument descriptors: playable octave ranges and recorded samples.

pub mod catalog;
pub mod range;

pub use catalog::{instruments, lookup, octave_range, resolve, sample_path, InstrumentDescriptor, SampleChoice};
pub use range::{OctaveRange, RangeError};
