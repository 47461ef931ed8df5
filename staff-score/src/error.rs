//! Error types of the note model.

use fraction::Fraction;

use crate::dom::{MeasureId, NoteId, TupletId};

/// Why a tie request was refused.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TieRejection {
    /// rests can not be tied
    Rest,
    SelfTie,
    PitchMismatch,
    /// target starts before the source
    Backwards,
    /// other notes stand between source and target
    NotConsecutive,
    /// target already has an incoming tie
    TargetAlreadyTied,
    /// source already has an outgoing tie to another note
    SourceAlreadyTied,
}
impl std::fmt::Display for TieRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rest => "rest can not be tied",
            Self::SelfTie => "note can not be tied to itself",
            Self::PitchMismatch => "pitches differ",
            Self::Backwards => "target precedes source",
            Self::NotConsecutive => "target does not follow source directly",
            Self::TargetAlreadyTied => "target already has an incoming tie",
            Self::SourceAlreadyTied => "source already has an outgoing tie",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("No note for handle {0:?}")]
    NoSuchNote(NoteId),
    #[error("No measure for handle {0:?}")]
    NoSuchMeasure(MeasureId),
    #[error("Measures {start}..{end} are out of {count} measures")]
    MeasureRange {
        start: usize,
        end: usize,
        count: usize,
    },
    #[error("No tuplet for handle {0:?}")]
    NoSuchTuplet(TupletId),
    #[error("Can not tie {from:?} to {to:?}: {reason}")]
    InvalidTie {
        from: NoteId,
        to: NoteId,
        reason: TieRejection,
    },
    #[error(
        "Tuplet {tuplet:?} is broken: members sum to {found}, \
        expected {expected}"
    )]
    TupletIntegrity {
        tuplet: TupletId,
        expected: Fraction,
        found: Fraction,
    },
    #[error("Can not split by non-positive duration: {0}")]
    InvalidSplit(Fraction),
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("Length {0} can not be written with notes up to 1/128")]
    UnrepresentableDuration(Fraction),
    #[error("Pitch out of MIDI range: {0}")]
    PitchOutOfRange(i32),
    #[error("Invalid key signature: {0}")]
    InvalidKeySignature(String),
    #[error("MIDI channel should be in 0..=15, got {0}")]
    InvalidChannel(u8),
    #[error("Export settings error: {0}")]
    Settings(String),
}
pub type ScoreResult<T> = Result<T, ScoreError>;
