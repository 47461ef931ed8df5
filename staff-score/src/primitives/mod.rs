//! Values, from which notes are constructed.
//!
//! Everything here is plain data without links to other notes:
//! lengths, pitches, key signatures and positions. Graph of notes
//! (ties, tuplets, measures) lives in `dom`.

pub mod fraction_tools;
pub mod key_signature;
pub mod length;
pub mod pitch;
pub mod position;
pub mod time_signature;

pub use fraction_tools::{decompose_length, sum_lengths};
pub use key_signature::{AccidentalMap, KeySignature};
pub use length::{Duration, TupletRatio};
pub use pitch::{midi_to_note, Accidental, Key, NoteName, Pitch, Scale};
pub use position::AbsolutePosition;
pub use time_signature::TimeSignature;

/// The shortest written note is 1/128.
pub const LIMIT_DENOMINATOR: u64 = 128;
