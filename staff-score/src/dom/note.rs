//! A single note (or rest) of the staff.
//!
//! Notes never own each other: ties, tuplets and the measure are
//! referenced by handles into the [Staff](super::Staff).

use fraction::Fraction;

use crate::primitives::{Duration, Pitch};

use super::{MeasureId, TupletId};

/// Handle of a note inside [Staff](super::Staff).
///
/// Generation makes handles of deleted notes invalid, even if the slot
/// is reused.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct NoteId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// What the note is for the presentation layer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NoteKind {
    Note,
    Rest,
    TupletMember,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NoteEntity {
    pub(crate) duration: Duration,
    pub(crate) pitch: Option<Pitch>,
    pub(crate) tie_to: Option<NoteId>,
    pub(crate) tie_from: Option<NoteId>,
    pub(crate) tuplet: Option<TupletId>,
    pub(crate) measure: MeasureId,
    /// true for notes, produced by splitting.
    pub(crate) fragment: bool,
}
impl NoteEntity {
    pub(crate) fn new(
        duration: Duration,
        pitch: Option<Pitch>,
        measure: MeasureId,
    ) -> Self {
        Self {
            duration,
            pitch,
            tie_to: None,
            tie_from: None,
            tuplet: None,
            measure,
            fragment: false,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
    pub fn dotted(&self) -> bool {
        self.duration.dotted()
    }
    /// None for rests.
    pub fn pitch(&self) -> Option<&Pitch> {
        self.pitch.as_ref()
    }
    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }
    pub fn effective_duration(&self) -> Fraction {
        self.duration.effective()
    }
    pub fn tie_target(&self) -> Option<NoteId> {
        self.tie_to
    }
    pub fn tie_source(&self) -> Option<NoteId> {
        self.tie_from
    }
    pub fn tuplet(&self) -> Option<TupletId> {
        self.tuplet
    }
    /// Back reference to the owning measure.
    pub fn measure(&self) -> MeasureId {
        self.measure
    }
    pub fn is_fragment(&self) -> bool {
        self.fragment
    }
    pub fn kind(&self) -> NoteKind {
        match (self.tuplet, &self.pitch) {
            (Some(_), _) => NoteKind::TupletMember,
            (None, None) => NoteKind::Rest,
            (None, Some(_)) => NoteKind::Note,
        }
    }
}
