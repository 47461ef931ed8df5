//! Notes of a score staff: exact durations, ties, tuplets and their
//! serialization into MIDI-like events.
//!
//! ```
//! use fraction::Fraction;
//! use staff_score::{
//!     export_staff, AbsolutePosition, Accidental, Duration, ExportSettings,
//!     MidiTrack, NoteName, Pitch, Staff,
//! };
//!
//! let mut staff = Staff::default();
//! let m1 = staff.push_measure();
//! let c_sharp = Pitch::new(NoteName::C, 4, Some(Accidental::Sharp));
//! let c = Pitch::new(NoteName::C, 4, None);
//! staff.push_note(m1, Duration::half(), Some(c_sharp)).unwrap();
//! // sharp is carried till the barline
//! staff.push_note(m1, Duration::half(), Some(c)).unwrap();
//! // the measure is full, so the whole note opens the next one
//! let parts = staff.append_flowing(Duration::whole(), Some(c)).unwrap();
//! assert_eq!(staff.measures().len(), 2);
//! assert_eq!(parts.len(), 1);
//!
//! let settings = ExportSettings::default();
//! let mut track = MidiTrack::new(&settings);
//! export_staff(&staff, &mut track, AbsolutePosition::start(), &settings)
//!     .unwrap();
//! let keys: Vec<u8> = track.note_spans().iter().map(|n| n.key).collect();
//! assert_eq!(keys, vec![61, 61, 60]);
//! assert_eq!(
//!     track.note_spans()[2].duration,
//!     Fraction::new(1u64, 1u64)
//! );
//! ```

pub mod dom;
pub mod error;
pub mod midi;
pub mod primitives;
pub mod settings;

pub use dom::{
    Measure, MeasureId, NoteEntity, NoteId, NoteKind, Staff, TupletGroup,
    TupletId,
};
pub use error::{ScoreError, ScoreResult, TieRejection};
pub use midi::{
    add_to_track, export_measures, export_staff, MidiEvent, MidiEventKind,
    MidiTrack, NoteSpan,
};
pub use primitives::{
    AbsolutePosition, Accidental, AccidentalMap, Duration, KeySignature,
    NoteName, Pitch, TimeSignature, TupletRatio,
};
pub use settings::ExportSettings;
